//! Main document content (word/document.xml)
//!
//! This module holds the in-memory body tree: paragraphs made of runs, plus
//! the trailing section properties that carry the page geometry. It also
//! provides the run/paragraph builders and the single insertion point that
//! keeps the body ordered.
//!
//! # Body ordering
//!
//! ```xml
//! <w:body>
//!   <w:p>...</w:p>          <!-- paragraphs, append-only -->
//!   <w:p>...</w:p>
//!   <w:sectPr>...</w:sectPr> <!-- always the last child when present -->
//! </w:body>
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;

use crate::error::{OoxmlError, Result};
use crate::image::Drawing;
use crate::units::page_content_width;

/// WordprocessingML main namespace
pub const WORDPROCESSINGML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Office document relationships namespace (`r:` prefix)
pub const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Kind of manual break a run can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakKind {
    /// Start a new page
    Page,
    /// Start a new column
    Column,
    /// Line break within the paragraph
    #[serde(alias = "line")]
    TextWrapping,
}

impl BreakKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Column => "column",
            Self::TextWrapping => "textWrapping",
        }
    }
}

/// Underline style for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnderlineKind {
    #[default]
    Single,
    Double,
    Thick,
    Dotted,
    Dash,
    Wave,
    Words,
    None,
}

impl UnderlineKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Thick => "thick",
            Self::Dotted => "dotted",
            Self::Dash => "dash",
            Self::Wave => "wave",
            Self::Words => "words",
            Self::None => "none",
        }
    }
}

/// Horizontal alignment of a paragraph (or of a numbering level)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Justification {
    Left,
    Center,
    Right,
    /// Justified on both edges
    #[serde(alias = "justify")]
    Both,
}

impl Justification {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Both => "both",
        }
    }
}

/// Character formatting of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunProperties {
    /// Bold text
    pub bold: bool,
    /// Underline style, if underlined
    pub underline: Option<UnderlineKind>,
}

impl RunProperties {
    fn is_empty(&self) -> bool {
        !self.bold && self.underline.is_none()
    }
}

/// What a run carries
#[derive(Debug, Clone, PartialEq)]
pub enum RunContent {
    /// Literal text
    Text(String),
    /// A manual break
    Break(BreakKind),
    /// An inline picture
    Drawing(Drawing),
}

/// An atomic piece of paragraph content with its formatting
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// Formatting holder, created on first use
    pub properties: Option<RunProperties>,
    /// Run content
    pub content: RunContent,
}

impl Run {
    /// Create a run wrapping literal text, without formatting
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            properties: None,
            content: RunContent::Text(text.into()),
        }
    }

    /// Create a run wrapping a manual break
    pub fn new_break(kind: BreakKind) -> Self {
        Self {
            properties: None,
            content: RunContent::Break(kind),
        }
    }

    /// Create a run wrapping a drawing
    pub fn drawing(drawing: Drawing) -> Self {
        Self {
            properties: None,
            content: RunContent::Drawing(drawing),
        }
    }

    /// Make the run bold (repeated calls have no further effect)
    pub fn apply_bold(&mut self) {
        self.properties.get_or_insert_with(Default::default).bold = true;
    }

    /// Underline the run, replacing any previous underline style
    pub fn apply_underline(&mut self, kind: UnderlineKind) {
        self.properties.get_or_insert_with(Default::default).underline = Some(kind);
    }

    /// Builder form of [`Run::apply_bold`]
    pub fn bold(mut self) -> Self {
        self.apply_bold();
        self
    }

    /// Builder form of [`Run::apply_underline`]
    pub fn underline(mut self, kind: UnderlineKind) -> Self {
        self.apply_underline(kind);
        self
    }

    /// The drawing carried by this run, if any
    pub fn as_drawing(&self) -> Option<&Drawing> {
        match &self.content {
            RunContent::Drawing(drawing) => Some(drawing),
            _ => None,
        }
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<w:r>");

        if let Some(props) = self.properties.as_ref().filter(|p| !p.is_empty()) {
            out.push_str("<w:rPr>");
            if props.bold {
                out.push_str("<w:b/>");
            }
            if let Some(underline) = props.underline {
                out.push_str(&format!(r#"<w:u w:val="{}"/>"#, underline.as_str()));
            }
            out.push_str("</w:rPr>");
        }

        match &self.content {
            RunContent::Text(text) => {
                if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
                    out.push_str(r#"<w:t xml:space="preserve">"#);
                } else {
                    out.push_str("<w:t>");
                }
                out.push_str(&escape_xml(text));
                out.push_str("</w:t>");
            }
            RunContent::Break(kind) => {
                out.push_str(&format!(r#"<w:br w:type="{}"/>"#, kind.as_str()));
            }
            RunContent::Drawing(drawing) => drawing.write_xml(out),
        }

        out.push_str("</w:r>");
    }
}

/// Paragraph indentation in twips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indentation {
    /// Left indent
    pub left: u32,
    /// Hanging indent of the first line
    pub hanging: u32,
}

/// Reference from a paragraph to a numbering instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingReference {
    /// Level inside the abstract definition (0-based)
    pub level: u8,
    /// Numbering instance id (`w:numId`)
    pub num_id: u32,
}

/// Paragraph-level properties (`w:pPr`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphProperties {
    /// Style id from the style collection
    pub style_id: Option<String>,
    /// List membership
    pub numbering: Option<NumberingReference>,
    /// Space after the paragraph, in twips
    pub spacing_after: Option<u32>,
    /// Indentation
    pub indentation: Option<Indentation>,
    /// Alignment
    pub justification: Option<Justification>,
    /// Font applied to the paragraph mark
    pub mark_font: Option<String>,
}

impl ParagraphProperties {
    fn write_xml(&self, out: &mut String) {
        out.push_str("<w:pPr>");

        if let Some(style_id) = &self.style_id {
            out.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, escape_xml(style_id)));
        }
        if let Some(numbering) = &self.numbering {
            out.push_str(&format!(
                r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
                numbering.level, numbering.num_id
            ));
        }
        if let Some(after) = self.spacing_after {
            out.push_str(&format!(r#"<w:spacing w:after="{}"/>"#, after));
        }
        if let Some(ind) = &self.indentation {
            out.push_str(&format!(
                r#"<w:ind w:left="{}" w:hanging="{}"/>"#,
                ind.left, ind.hanging
            ));
        }
        if let Some(jc) = self.justification {
            out.push_str(&format!(r#"<w:jc w:val="{}"/>"#, jc.as_str()));
        }
        if let Some(font) = &self.mark_font {
            let font = escape_xml(font);
            out.push_str(&format!(
                r#"<w:rPr><w:rFonts w:ascii="{}" w:hAnsi="{}"/></w:rPr>"#,
                font, font
            ));
        }

        out.push_str("</w:pPr>");
    }
}

/// A paragraph: ordered runs plus optional properties
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    /// Properties holder, created on first use
    pub properties: Option<ParagraphProperties>,
    /// Runs in document order
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Create a paragraph containing the given runs in order, no properties
    pub fn new(runs: Vec<Run>) -> Self {
        Self {
            properties: None,
            runs,
        }
    }

    /// Create a paragraph with one text run per sentence
    pub fn from_sentences<S: AsRef<str>>(sentences: &[S]) -> Self {
        Self::new(sentences.iter().map(|s| Run::text(s.as_ref())).collect())
    }

    /// Get the properties holder, creating it if missing
    pub fn properties_mut(&mut self) -> &mut ParagraphProperties {
        self.properties.get_or_insert_with(Default::default)
    }

    /// Set the alignment, replacing any previous value
    pub fn apply_justification(&mut self, justification: Justification) {
        self.properties_mut().justification = Some(justification);
    }

    /// Style id, if a style is attached
    pub fn style_id(&self) -> Option<&str> {
        self.properties.as_ref()?.style_id.as_deref()
    }

    /// Numbering reference, if the paragraph is a list item
    pub fn numbering(&self) -> Option<NumberingReference> {
        self.properties.as_ref()?.numbering
    }

    /// Drawings carried by this paragraph's runs
    pub fn drawings(&self) -> impl Iterator<Item = &Drawing> {
        self.runs.iter().filter_map(Run::as_drawing)
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<w:p>");
        if let Some(props) = &self.properties {
            props.write_xml(out);
        }
        for run in &self.runs {
            run.write_xml(out);
        }
        out.push_str("</w:p>");
    }
}

/// Page size in twips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

/// Page margins in twips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMargin {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
    pub header: u32,
    pub footer: u32,
    pub gutter: u32,
}

/// Section properties (`w:sectPr`): the page geometry of the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionProperties {
    /// Page size
    pub page_size: PageSize,
    /// Page margins
    pub page_margin: PageMargin,
    /// Space between text columns
    pub column_space: u32,
    /// Document grid line pitch
    pub line_pitch: u32,
}

impl Default for SectionProperties {
    /// US Letter portrait with one-inch margins
    fn default() -> Self {
        Self {
            page_size: PageSize {
                width: 12240,
                height: 15840,
            },
            page_margin: PageMargin {
                top: 1440,
                right: 1440,
                bottom: 1440,
                left: 1440,
                header: 720,
                footer: 720,
                gutter: 0,
            },
            column_space: 720,
            line_pitch: 360,
        }
    }
}

impl SectionProperties {
    /// Width between the left and right margins, in twips
    pub fn content_width(&self) -> i64 {
        page_content_width(
            i64::from(self.page_size.width),
            i64::from(self.page_margin.left),
            i64::from(self.page_margin.right),
        )
    }

    fn write_xml(&self, out: &mut String) {
        let size = &self.page_size;
        let margin = &self.page_margin;
        out.push_str("<w:sectPr>");
        out.push_str(&format!(
            r#"<w:pgSz w:w="{}" w:h="{}"/>"#,
            size.width, size.height
        ));
        out.push_str(&format!(
            r#"<w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="{}" w:footer="{}" w:gutter="{}"/>"#,
            margin.top,
            margin.right,
            margin.bottom,
            margin.left,
            margin.header,
            margin.footer,
            margin.gutter
        ));
        out.push_str(&format!(r#"<w:cols w:space="{}"/>"#, self.column_space));
        out.push_str(&format!(r#"<w:docGrid w:linePitch="{}"/>"#, self.line_pitch));
        out.push_str("</w:sectPr>");
    }
}

/// Block-level children of the body
#[derive(Debug, Clone, PartialEq)]
pub enum BodyNode {
    /// A paragraph
    Paragraph(Paragraph),
    /// The trailing section properties
    SectionProperties(SectionProperties),
}

/// Handle to a paragraph appended to a [`Body`]
///
/// Paragraph positions never move once appended, so the handle stays valid
/// for the lifetime of the document it came from. Handles are tied to that
/// document: another body (including the one a writer starts after
/// `reset`) rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParagraphId {
    document: u64,
    index: usize,
}

impl ParagraphId {
    /// Position of the paragraph among the body's children
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for ParagraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "paragraph #{} of document {}", self.index, self.document)
    }
}

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// The ordered block content of the main document
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    document: u64,
    nodes: Vec<BodyNode>,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            document: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
        }
    }
}

impl Body {
    /// Create an empty body
    pub fn new() -> Self {
        Self::default()
    }

    /// All children in document order
    pub fn nodes(&self) -> &[BodyNode] {
        &self.nodes
    }

    /// Iterate over paragraphs in document order
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.nodes.iter().filter_map(|node| match node {
            BodyNode::Paragraph(p) => Some(p),
            BodyNode::SectionProperties(_) => None,
        })
    }

    /// Number of paragraphs
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Whether the handle was issued by this body
    pub fn owns(&self, id: ParagraphId) -> bool {
        id.document == self.document
    }

    /// Look up a paragraph by handle
    pub fn paragraph(&self, id: ParagraphId) -> Option<&Paragraph> {
        if !self.owns(id) {
            return None;
        }
        match self.nodes.get(id.index) {
            Some(BodyNode::Paragraph(p)) => Some(p),
            _ => None,
        }
    }

    /// Look up a paragraph by handle for modification
    ///
    /// Handles from another document fail with
    /// [`OoxmlError::InvalidStructure`], even when the index is in range.
    pub fn paragraph_mut(&mut self, id: ParagraphId) -> Result<&mut Paragraph> {
        if !self.owns(id) {
            return Err(OoxmlError::InvalidStructure(format!(
                "{} belongs to another document",
                id
            )));
        }
        match self.nodes.get_mut(id.index) {
            Some(BodyNode::Paragraph(p)) => Ok(p),
            _ => Err(OoxmlError::InvalidStructure(format!(
                "{} does not exist in this document",
                id
            ))),
        }
    }

    /// The section properties, if the body has them
    pub fn section_properties(&self) -> Option<&SectionProperties> {
        self.nodes.iter().find_map(|node| match node {
            BodyNode::SectionProperties(sp) => Some(sp),
            BodyNode::Paragraph(_) => None,
        })
    }

    /// Return the section properties, appending the default page if missing
    pub fn ensure_section_properties(&mut self) -> Result<SectionProperties> {
        self.check_order()?;
        if let Some(sp) = self.section_properties() {
            return Ok(*sp);
        }

        log::debug!("Adding default Letter section properties");
        let sp = SectionProperties::default();
        self.nodes.push(BodyNode::SectionProperties(sp));
        Ok(sp)
    }

    /// Replace the page geometry, keeping the section properties last
    pub fn set_section_properties(&mut self, section: SectionProperties) -> Result<()> {
        self.check_order()?;
        match self.nodes.last_mut() {
            Some(BodyNode::SectionProperties(sp)) => *sp = section,
            _ => self.nodes.push(BodyNode::SectionProperties(section)),
        }
        Ok(())
    }

    /// Append a paragraph, keeping the section properties as the last child
    ///
    /// The paragraph lands immediately before the section properties when
    /// they exist, otherwise at the end of the body.
    pub fn append_paragraph(&mut self, paragraph: Paragraph) -> Result<ParagraphId> {
        self.check_order()?;

        let index = match self.nodes.last() {
            Some(BodyNode::SectionProperties(_)) => self.nodes.len() - 1,
            _ => self.nodes.len(),
        };
        self.nodes.insert(index, BodyNode::Paragraph(paragraph));

        debug_assert!(self.check_order().is_ok());
        Ok(ParagraphId {
            document: self.document,
            index,
        })
    }

    /// Verify that at most one section properties node exists and that it is last
    pub fn check_order(&self) -> Result<()> {
        let sections: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node, BodyNode::SectionProperties(_)))
            .map(|(i, _)| i)
            .collect();

        match sections.as_slice() {
            [] => Ok(()),
            [i] if *i + 1 == self.nodes.len() => Ok(()),
            [i] => Err(OoxmlError::InvalidStructure(format!(
                "section properties at position {} are not the last body child",
                i
            ))),
            _ => Err(OoxmlError::InvalidStructure(format!(
                "body holds {} section properties, expected at most one",
                sections.len()
            ))),
        }
    }

    /// Largest drawing-property id used anywhere in the body (0 if none)
    pub fn max_doc_property_id(&self) -> u32 {
        self.paragraphs()
            .flat_map(Paragraph::drawings)
            .map(|d| d.doc_property_id)
            .max()
            .unwrap_or(0)
    }

    /// Serialize the complete word/document.xml part
    pub fn to_document_xml(&self) -> String {
        let mut out = String::new();
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        out.push('\n');
        out.push_str(&format!(
            r#"<w:document xmlns:wp="{}" xmlns:a="{}" xmlns:pic="{}" xmlns:r="{}" xmlns:w="{}">"#,
            crate::image::WORDPROCESSING_DRAWING_NS,
            crate::image::DRAWINGML_NS,
            crate::image::PICTURE_NS,
            RELATIONSHIPS_NS,
            WORDPROCESSINGML_NS
        ));
        out.push_str("<w:body>");
        for node in &self.nodes {
            match node {
                BodyNode::Paragraph(p) => p.write_xml(&mut out),
                BodyNode::SectionProperties(sp) => sp.write_xml(&mut out),
            }
        }
        out.push_str("</w:body></w:document>");
        out
    }
}

/// Escape special XML characters in text and attribute values
///
/// Characters XML 1.0 cannot represent at all (C0 controls other than tab,
/// line feed and carriage return, and the U+FFFE/U+FFFF non-characters)
/// are dropped.
pub(crate) fn escape_xml(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return quick_xml::escape::escape(text);
    }

    let cleaned: String = text.chars().filter(|c| is_xml_char(*c)).collect();
    log::debug!(
        "Dropped {} character(s) not allowed in XML",
        text.chars().count() - cleaned.chars().count()
    );
    Cow::Owned(quick_xml::escape::escape(&cleaned).into_owned())
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}
