//! In-memory WordprocessingML package
//!
//! The package owns the body, the optional numbering and style collections,
//! the document-level relationships and the embedded media. It is turned
//! into ZIP parts only when saved.
//!
//! # Package layout
//!
//! ```text
//! [Content_Types].xml
//! _rels/.rels
//! word/document.xml
//! word/_rels/document.xml.rels
//! word/styles.xml            (once a style is used)
//! word/numbering.xml         (once a list is added)
//! word/media/imageN.<ext>    (one per picture)
//! ```

use std::collections::BTreeSet;
use std::io::{Seek, Write};

use crate::archive::OoxmlArchive;
use crate::document::Body;
use crate::error::Result;
use crate::image::RasterFormat;
use crate::numbering::Numbering;
use crate::relationships::Relationships;
use crate::styles::{ParagraphStyle, StyleSheet};

/// OOXML namespace for content types
pub const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const DOCUMENT_PART: &str = "word/document.xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
const STYLES_PART: &str = "word/styles.xml";
const NUMBERING_PART: &str = "word/numbering.xml";

const DOCUMENT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const STYLES_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
const NUMBERING_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";

/// An embedded binary part
#[derive(Debug, Clone, PartialEq, Eq)]
struct MediaPart {
    /// Path relative to `word/`
    target: String,
    format: RasterFormat,
    bytes: Vec<u8>,
}

/// The document package under construction
#[derive(Debug, Clone, Default)]
pub struct Package {
    body: Body,
    numbering: Option<Numbering>,
    styles: Option<StyleSheet>,
    relationships: Relationships,
    media: Vec<MediaPart>,
}

impl Package {
    /// Create a package with an empty body
    pub fn new() -> Self {
        Self::default()
    }

    /// Main document body
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Main document body for modification
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Numbering collection, if any list was added
    pub fn numbering(&self) -> Option<&Numbering> {
        self.numbering.as_ref()
    }

    /// Style collection, if any style was used
    pub fn styles(&self) -> Option<&StyleSheet> {
        self.styles.as_ref()
    }

    /// Document-level relationships
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Number of embedded images
    pub fn media_count(&self) -> usize {
        self.media.len()
    }

    /// Get the numbering collection, creating the part on first use
    pub fn numbering_or_create(&mut self) -> &mut Numbering {
        if self.numbering.is_none() {
            let rel_id = self
                .relationships
                .add("numbering.xml", Relationships::TYPE_NUMBERING);
            log::debug!("Created numbering part ({})", rel_id);
        }
        self.numbering.get_or_insert_with(Numbering::new)
    }

    /// Get the style collection, creating the part on first use
    pub fn styles_or_create(&mut self) -> &mut StyleSheet {
        if self.styles.is_none() {
            let rel_id = self
                .relationships
                .add("styles.xml", Relationships::TYPE_STYLES);
            log::debug!("Created styles part ({})", rel_id);
        }
        self.styles.get_or_insert_with(StyleSheet::new)
    }

    /// Resolve a style kind to a style id, defining the style if needed
    ///
    /// [`ParagraphStyle::None`] neither creates the style part nor returns an id.
    pub fn ensure_style(&mut self, kind: ParagraphStyle) -> Option<String> {
        kind.canonical()?;
        self.styles_or_create().ensure(kind)
    }

    /// Store image bytes as a new media part
    ///
    /// Returns the relationship id and the part's file name.
    pub fn add_image_part(&mut self, bytes: Vec<u8>, format: RasterFormat) -> (String, String) {
        let file_name = format!("image{}.{}", self.media.len() + 1, format.extension());
        let target = format!("media/{}", file_name);
        let rel_id = self.relationships.add(target.clone(), Relationships::TYPE_IMAGE);

        log::debug!("Added image part word/{} ({})", target, rel_id);
        self.media.push(MediaPart {
            target,
            format,
            bytes,
        });
        (rel_id, file_name)
    }

    fn content_types_xml(&self) -> String {
        let extensions: BTreeSet<&str> = self.media.iter().map(|m| m.format.extension()).collect();

        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Types xmlns="{}">"#, CONTENT_TYPES_NS));
        xml.push_str(
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        );
        xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        for ext in extensions {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                ext,
                crate::image::content_type_for_extension(ext)
            ));
        }

        let overrides = [
            (Some(DOCUMENT_PART), DOCUMENT_CONTENT_TYPE),
            (self.styles.as_ref().map(|_| STYLES_PART), STYLES_CONTENT_TYPE),
            (self.numbering.as_ref().map(|_| NUMBERING_PART), NUMBERING_CONTENT_TYPE),
        ];
        for (part, content_type) in overrides {
            if let Some(part) = part {
                xml.push_str(&format!(
                    r#"<Override PartName="/{}" ContentType="{}"/>"#,
                    part, content_type
                ));
            }
        }

        xml.push_str("</Types>");
        xml
    }

    /// Serialize every part into an archive
    pub fn to_archive(&self) -> OoxmlArchive {
        let mut archive = OoxmlArchive::new();

        let mut package_rels = Relationships::new();
        package_rels.add(DOCUMENT_PART, Relationships::TYPE_OFFICE_DOCUMENT);

        archive.set_string("[Content_Types].xml", self.content_types_xml());
        archive.set_string("_rels/.rels", package_rels.to_xml());
        archive.set_string(DOCUMENT_PART, self.body.to_document_xml());
        archive.set_string(DOCUMENT_RELS_PART, self.relationships.to_xml());

        if let Some(styles) = &self.styles {
            archive.set_string(STYLES_PART, styles.to_xml());
        }
        if let Some(numbering) = &self.numbering {
            archive.set_string(NUMBERING_PART, numbering.to_xml());
        }
        for media in &self.media {
            archive.set(format!("word/{}", media.target), media.bytes.clone());
        }

        archive
    }

    /// Write the package as a DOCX container
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        self.to_archive().write_to(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_package_parts() {
        let archive = Package::new().to_archive();
        assert_eq!(
            archive.file_list(),
            vec![
                "[Content_Types].xml",
                "_rels/.rels",
                "word/_rels/document.xml.rels",
                "word/document.xml",
            ]
        );
    }

    #[test]
    fn test_numbering_part_registered_once() {
        let mut package = Package::new();
        package.numbering_or_create();
        package.numbering_or_create();

        assert_eq!(package.relationships().len(), 1);
        let (id, rel) = package.relationships().iter().next().unwrap();
        assert_eq!(id, "rId1");
        assert_eq!(rel.rel_type, Relationships::TYPE_NUMBERING);
    }

    #[test]
    fn test_ensure_style_none_creates_nothing() {
        let mut package = Package::new();
        assert_eq!(package.ensure_style(ParagraphStyle::None), None);
        assert!(package.styles().is_none());
        assert!(package.relationships().is_empty());
    }

    #[test]
    fn test_ensure_style_creates_part() {
        let mut package = Package::new();
        let id = package.ensure_style(ParagraphStyle::Heading2);
        assert_eq!(id.as_deref(), Some("Heading2"));
        assert_eq!(package.styles().unwrap().len(), 1);

        let archive = package.to_archive();
        assert!(archive.contains("word/styles.xml"));
        let types = archive.get_string("[Content_Types].xml").unwrap().unwrap();
        assert!(types.contains(r#"PartName="/word/styles.xml""#));
        assert!(!types.contains("numbering"));
    }

    #[test]
    fn test_image_parts_and_content_types() {
        let mut package = Package::new();
        let (first, name1) = package.add_image_part(vec![1, 2, 3], RasterFormat::Jpeg);
        let (second, name2) = package.add_image_part(vec![4], RasterFormat::Png);
        package.add_image_part(vec![5], RasterFormat::Jpeg);

        assert_eq!((first.as_str(), name1.as_str()), ("rId1", "image1.jpeg"));
        assert_eq!((second.as_str(), name2.as_str()), ("rId2", "image2.png"));
        assert_eq!(package.media_count(), 3);

        let archive = package.to_archive();
        assert_eq!(archive.get("word/media/image2.png"), Some(&[4u8][..]));

        let types = archive.get_string("[Content_Types].xml").unwrap().unwrap();
        assert_eq!(types.matches(r#"Extension="jpeg""#).count(), 1);
        assert!(types.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
    }

    #[test]
    fn test_package_rels_point_at_document() {
        let archive = Package::new().to_archive();
        let rels = archive.get_string("_rels/.rels").unwrap().unwrap();
        assert!(rels.contains(r#"Target="word/document.xml""#));
        assert!(rels.contains("relationships/officeDocument"));
    }
}
