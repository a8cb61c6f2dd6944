//! Package relationships (`_rels/*.rels`)
//!
//! OOXML uses relationship files to map ids to parts. The package-level
//! `_rels/.rels` points at the main document; `word/_rels/document.xml.rels`
//! points at styles, numbering and every embedded image.
//!
//! # Example
//!
//! ```
//! use simpledoc_ooxml::relationships::Relationships;
//!
//! let mut rels = Relationships::new();
//! let id = rels.add("media/image1.jpeg", Relationships::TYPE_IMAGE);
//! assert_eq!(id, "rId1");
//! assert!(rels.to_xml().contains(r#"Target="media/image1.jpeg""#));
//! ```

use crate::document::escape_xml;

/// OOXML namespace for relationship parts
pub const PACKAGE_RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";

/// Relationship type URIs used by the writer
impl Relationships {
    /// Main document relationship type
    pub const TYPE_OFFICE_DOCUMENT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    /// Image relationship type
    pub const TYPE_IMAGE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    /// Styles relationship type
    pub const TYPE_STYLES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    /// Numbering relationship type
    pub const TYPE_NUMBERING: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
}

/// Relationships of one source part
///
/// Entries are never removed, so the id of an entry is `rId` followed by
/// its one-based position.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    targets: Vec<RelationshipTarget>,
}

/// A relationship target with its type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipTarget {
    /// Target path, relative to the source part's folder
    pub target: String,
    /// The relationship type URI
    pub rel_type: String,
}

fn relationship_id(index: usize) -> String {
    format!("rId{}", index + 1)
}

impl Relationships {
    /// Empty set; the first id is `rId1`
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target and return its id (`rId1`, `rId2`, ...)
    pub fn add(&mut self, target: impl Into<String>, rel_type: impl Into<String>) -> String {
        let id = relationship_id(self.targets.len());
        let rel = RelationshipTarget {
            target: target.into(),
            rel_type: rel_type.into(),
        };
        log::debug!("Relationship {} -> {}", id, rel.target);

        self.targets.push(rel);
        id
    }

    /// Serialize relationships to a .rels part
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<Relationships xmlns="{}">"#,
            PACKAGE_RELATIONSHIPS_NS
        ));

        for (id, rel) in self.iter() {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                id,
                escape_xml(&rel.rel_type),
                escape_xml(&rel.target)
            ));
        }

        xml.push_str("</Relationships>");
        xml
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Relationships with their ids, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (String, &RelationshipTarget)> {
        self.targets
            .iter()
            .enumerate()
            .map(|(index, rel)| (relationship_id(index), rel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_allocated_in_sequence() {
        let mut rels = Relationships::new();

        let id1 = rels.add("styles.xml", Relationships::TYPE_STYLES);
        assert_eq!(id1, "rId1");

        let id2 = rels.add("media/image1.jpeg", Relationships::TYPE_IMAGE);
        assert_eq!(id2, "rId2");
        assert_eq!(rels.len(), 2);
    }

    #[test]
    fn test_iter_pairs_ids_with_targets() {
        let mut rels = Relationships::new();
        rels.add("numbering.xml", Relationships::TYPE_NUMBERING);
        rels.add("styles.xml", Relationships::TYPE_STYLES);

        let pairs: Vec<(String, &str)> = rels
            .iter()
            .map(|(id, rel)| (id, rel.rel_type.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("rId1".to_string(), Relationships::TYPE_NUMBERING),
                ("rId2".to_string(), Relationships::TYPE_STYLES),
            ]
        );
    }

    #[test]
    fn test_package_rels_xml() {
        let mut rels = Relationships::new();
        rels.add("word/document.xml", Relationships::TYPE_OFFICE_DOCUMENT);

        let xml = rels.to_xml();
        assert!(xml.contains(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(xml.contains(&format!(r#"xmlns="{}""#, PACKAGE_RELATIONSHIPS_NS)));
        assert!(xml.contains(r#"Id="rId1""#));
        assert!(xml.contains(r#"Target="word/document.xml""#));
    }

    #[test]
    fn test_targets_are_escaped() {
        let mut rels = Relationships::new();
        rels.add("a & <b>.xml", Relationships::TYPE_STYLES);

        let xml = rels.to_xml();
        assert!(xml.contains("a &amp; &lt;b&gt;.xml"));
    }

    #[test]
    fn test_iter_follows_insertion_order() {
        let mut rels = Relationships::new();
        rels.add("first.xml", "type1");
        rels.add("second.xml", "type2");
        rels.add("third.xml", "type3");

        let targets: Vec<&str> = rels.iter().map(|(_, rel)| rel.target.as_str()).collect();
        assert_eq!(targets, vec!["first.xml", "second.xml", "third.xml"]);
    }

    #[test]
    fn test_xml_ids_match_returned_ids() {
        let mut rels = Relationships::new();
        let first = rels.add("a.xml", "type");
        let second = rels.add("b.xml", "type");

        let xml = rels.to_xml();
        assert!(xml.contains(&format!(r#"Id="{}" Type="type" Target="a.xml""#, first)));
        assert!(xml.contains(&format!(r#"Id="{}" Type="type" Target="b.xml""#, second)));
    }
}
