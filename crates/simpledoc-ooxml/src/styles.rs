//! Style definitions (word/styles.xml)
//!
//! Styles are defined once in the style collection and referenced from
//! paragraphs by id. [`StyleSheet::ensure`] resolves a [`ParagraphStyle`]
//! kind to an id, reusing an existing definition (matched by id, then by
//! display name) before inserting one from the kind's fixed template.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::document::{escape_xml, WORDPROCESSINGML_NS};
use crate::error::{OoxmlError, Result};

/// Type of style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleType {
    /// Paragraph style
    Paragraph,
    /// Character (run) style
    Character,
    /// Table style
    Table,
    /// Numbering style
    Numbering,
}

impl StyleType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Character => "character",
            Self::Table => "table",
            Self::Numbering => "numbering",
        }
    }
}

/// Theme-aware text color
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleColor {
    /// RGB hex value
    pub rgb: String,
    /// Theme color name
    pub theme_color: Option<String>,
    /// Theme shade (hex)
    pub theme_shade: Option<String>,
}

/// Character formatting carried by a style definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleRunProperties {
    /// Use the theme's major (heading) fonts
    pub major_theme_fonts: bool,
    /// Text color
    pub color: Option<StyleColor>,
    /// Font size in half-points
    pub size: Option<u32>,
}

/// A Word style definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    /// Style ID (used in document references)
    pub id: String,
    /// Display name
    pub name: String,
    /// Style type
    pub style_type: StyleType,
    /// Base style ID (for inheritance)
    pub based_on: Option<String>,
    /// Next style ID (for following paragraphs)
    pub next: Option<String>,
    /// Linked character style ID
    pub linked: Option<String>,
    /// UI priority for sorting
    pub ui_priority: Option<u32>,
    /// Shown in the quick style gallery
    pub primary: bool,
    /// Revision save id
    pub rsid: Option<String>,
    /// Character formatting
    pub run_properties: Option<StyleRunProperties>,
}

impl Style {
    /// Create a bare style with only id, name and type set
    pub fn new(id: impl Into<String>, name: impl Into<String>, style_type: StyleType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            style_type,
            based_on: None,
            next: None,
            linked: None,
            ui_priority: None,
            primary: false,
            rsid: None,
            run_properties: None,
        }
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str(&format!(
            r#"<w:style w:type="{}" w:styleId="{}">"#,
            self.style_type.as_str(),
            escape_xml(&self.id)
        ));
        out.push_str(&format!(r#"<w:name w:val="{}"/>"#, escape_xml(&self.name)));
        if let Some(based_on) = &self.based_on {
            out.push_str(&format!(r#"<w:basedOn w:val="{}"/>"#, escape_xml(based_on)));
        }
        if let Some(next) = &self.next {
            out.push_str(&format!(r#"<w:next w:val="{}"/>"#, escape_xml(next)));
        }
        if let Some(linked) = &self.linked {
            out.push_str(&format!(r#"<w:link w:val="{}"/>"#, escape_xml(linked)));
        }
        if let Some(priority) = self.ui_priority {
            out.push_str(&format!(r#"<w:uiPriority w:val="{}"/>"#, priority));
        }
        if self.primary {
            out.push_str("<w:qFormat/>");
        }
        if let Some(rsid) = &self.rsid {
            out.push_str(&format!(r#"<w:rsid w:val="{}"/>"#, escape_xml(rsid)));
        }
        if let Some(rpr) = &self.run_properties {
            out.push_str("<w:rPr>");
            if rpr.major_theme_fonts {
                out.push_str(concat!(
                    r#"<w:rFonts w:asciiTheme="majorHAnsi" w:eastAsiaTheme="majorEastAsia" "#,
                    r#"w:hAnsiTheme="majorHAnsi" w:cstheme="majorBidi"/>"#
                ));
            }
            if let Some(color) = &rpr.color {
                out.push_str(&format!(r#"<w:color w:val="{}""#, escape_xml(&color.rgb)));
                if let Some(theme) = &color.theme_color {
                    out.push_str(&format!(r#" w:themeColor="{}""#, escape_xml(theme)));
                }
                if let Some(shade) = &color.theme_shade {
                    out.push_str(&format!(r#" w:themeShade="{}""#, escape_xml(shade)));
                }
                out.push_str("/>");
            }
            if let Some(size) = rpr.size {
                out.push_str(&format!(
                    r#"<w:sz w:val="{}"/><w:szCs w:val="{}"/>"#,
                    size, size
                ));
            }
            out.push_str("</w:rPr>");
        }
        out.push_str("</w:style>");
    }
}

/// Paragraph style kinds the engine knows how to define
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum ParagraphStyle {
    /// No style; paragraphs keep the document default
    #[default]
    None,
    /// Heading 1
    Heading1,
    /// Heading 2
    Heading2,
}

impl ParagraphStyle {
    /// Canonical (id, display name) pair, or `None` for [`ParagraphStyle::None`]
    pub fn canonical(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::None => None,
            Self::Heading1 => Some(("Heading1", "heading 1")),
            Self::Heading2 => Some(("Heading2", "heading 2")),
        }
    }

    /// Fixed style definition for this kind
    pub fn template(&self) -> Option<Style> {
        let (id, name) = self.canonical()?;
        let (linked, size, primary) = match self {
            Self::None => return None,
            Self::Heading1 => ("Heading1Char", 32, true),
            Self::Heading2 => ("Heading2Char", 26, false),
        };

        Some(Style {
            based_on: Some("Normal".to_string()),
            next: Some("Normal".to_string()),
            linked: Some(linked.to_string()),
            ui_priority: Some(9),
            primary,
            rsid: Some("00445B57".to_string()),
            run_properties: Some(StyleRunProperties {
                major_theme_fonts: true,
                color: Some(StyleColor {
                    rgb: "2E74B5".to_string(),
                    theme_color: Some("accent1".to_string()),
                    theme_shade: Some("BF".to_string()),
                }),
                size: Some(size),
            }),
            ..Style::new(id, name, StyleType::Paragraph)
        })
    }
}

impl FromStr for ParagraphStyle {
    type Err = OoxmlError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Self::None),
            "heading-1" | "h1" => Ok(Self::Heading1),
            "heading-2" | "h2" => Ok(Self::Heading2),
            other => Err(OoxmlError::UnsupportedStyle(other.to_string())),
        }
    }
}

impl TryFrom<String> for ParagraphStyle {
    type Error = OoxmlError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for ParagraphStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Heading1 => "heading-1",
            Self::Heading2 => "heading-2",
        })
    }
}

/// The style collection of a document, in part order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    styles: Vec<Style>,
}

impl StyleSheet {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of style definitions
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// True when the collection holds no definitions
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Get all styles
    pub fn all(&self) -> impl Iterator<Item = &Style> {
        self.styles.iter()
    }

    /// Get a paragraph style by ID
    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles
            .iter()
            .find(|s| s.id == id && s.style_type == StyleType::Paragraph)
    }

    /// Id of the first paragraph style whose display name equals `name` exactly
    pub fn find_id_by_name(&self, name: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|s| s.name == name && s.style_type == StyleType::Paragraph)
            .map(|s| s.id.as_str())
    }

    /// Append a style definition, refusing duplicate ids of the same type
    pub fn add(&mut self, style: Style) -> Result<()> {
        if self
            .styles
            .iter()
            .any(|s| s.id == style.id && s.style_type == style.style_type)
        {
            return Err(OoxmlError::InvalidStructure(format!(
                "style id '{}' is already defined",
                style.id
            )));
        }
        self.styles.push(style);
        Ok(())
    }

    /// Resolve a style kind to a style id, defining it from its template when missing
    ///
    /// Returns `None` for [`ParagraphStyle::None`]. Repeated calls with the
    /// same kind return the same id and never add a second definition.
    pub fn ensure(&mut self, kind: ParagraphStyle) -> Option<String> {
        let (id, name) = kind.canonical()?;

        if self.get(id).is_some() {
            return Some(id.to_string());
        }
        if let Some(existing) = self.find_id_by_name(name) {
            log::debug!("Reusing style '{}' for '{}'", existing, name);
            return Some(existing.to_string());
        }

        let style = kind.template()?;
        log::debug!("Adding style '{}' ({})", style.id, style.name);
        self.styles.push(style);
        Some(id.to_string())
    }

    /// Serialize the complete word/styles.xml part
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        out.push('\n');
        out.push_str(&format!(r#"<w:styles xmlns:w="{}">"#, WORDPROCESSINGML_NS));
        for style in &self.styles {
            style.write_xml(&mut out);
        }
        out.push_str("</w:styles>");
        out
    }
}
