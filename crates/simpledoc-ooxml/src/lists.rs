//! Bulleted and numbered lists
//!
//! Every list call registers its own numbering definition (one abstract
//! definition plus one instance) and appends one paragraph per item, each
//! referencing the new instance at level 0.

use crate::document::{
    Indentation, Justification, NumberingReference, Paragraph, ParagraphId, Run,
};
use crate::error::Result;
use crate::numbering::{Level, NumberFormat, MAX_LEVELS};
use crate::package::Package;

const ITEM_INDENT_LEFT: u32 = 720;
const ITEM_INDENT_HANGING: u32 = 360;
const ITEM_MARK_FONT: &str = "Symbol";
const BULLET_GLYPH: &str = "·";

/// Kind of list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bulleted,
    Numbered,
}

impl ListKind {
    /// Level definitions registered for a list of this kind
    pub fn levels(&self) -> Vec<Level> {
        match self {
            Self::Bulleted => vec![Level {
                index: 0,
                start: None,
                format: NumberFormat::Bullet,
                text: BULLET_GLYPH.to_string(),
                justification: None,
                template_code: None,
                tentative: false,
            }],
            Self::Numbered => (0..MAX_LEVELS as u8)
                .map(|index| {
                    let (format, justification, tplc) = match index % 3 {
                        0 => (NumberFormat::Decimal, Justification::Left, "0409000F"),
                        1 => (NumberFormat::LowerLetter, Justification::Left, "04090019"),
                        _ => (NumberFormat::LowerRoman, Justification::Right, "0409001B"),
                    };
                    Level {
                        index,
                        start: Some(1),
                        format,
                        text: format!("%{}.", index + 1),
                        justification: Some(justification),
                        template_code: Some(tplc.to_string()),
                        tentative: index > 0,
                    }
                })
                .collect(),
        }
    }
}

/// One list entry
#[derive(Debug, Clone, PartialEq)]
pub enum ListItem {
    /// Plain text, one run
    Text(String),
    /// A single formatted run
    Run(Run),
    /// A caller-built paragraph; its runs and properties are kept
    Paragraph(Paragraph),
}

impl From<&str> for ListItem {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ListItem {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for ListItem {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<Run> for ListItem {
    fn from(run: Run) -> Self {
        Self::Run(run)
    }
}

impl From<Paragraph> for ListItem {
    fn from(paragraph: Paragraph) -> Self {
        Self::Paragraph(paragraph)
    }
}

impl ListItem {
    fn into_paragraph(self, num_id: u32) -> Paragraph {
        let (mut paragraph, mark_font) = match self {
            Self::Text(text) => (Paragraph::new(vec![Run::text(text)]), true),
            Self::Run(run) => (Paragraph::new(vec![run]), true),
            Self::Paragraph(paragraph) => (paragraph, false),
        };

        let props = paragraph.properties_mut();
        props.numbering = Some(NumberingReference { level: 0, num_id });
        props.spacing_after = Some(0);
        props.indentation = Some(Indentation {
            left: ITEM_INDENT_LEFT,
            hanging: ITEM_INDENT_HANGING,
        });
        if mark_font {
            props.mark_font = Some(ITEM_MARK_FONT.to_string());
        }
        paragraph
    }
}

/// Register a fresh numbering definition and append one paragraph per item
///
/// The definition is registered even for an empty list. Returns the handles
/// of the appended paragraphs in order.
pub fn add_list<I>(package: &mut Package, kind: ListKind, items: I) -> Result<Vec<ParagraphId>>
where
    I: IntoIterator,
    I::Item: Into<ListItem>,
{
    package.body().check_order()?;

    let num_id = package.numbering_or_create().add_definition(kind.levels())?;
    log::debug!("Adding {:?} list with numbering instance {}", kind, num_id);

    items
        .into_iter()
        .map(|item| {
            let paragraph = item.into().into_paragraph(num_id);
            package.body_mut().append_paragraph(paragraph)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{RunContent, UnderlineKind};
    use crate::numbering::NumberingEntry;

    #[test]
    fn test_bulleted_levels() {
        let levels = ListKind::Bulleted.levels();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].format, NumberFormat::Bullet);
        assert_eq!(levels[0].text, "·");
        assert_eq!(levels[0].start, None);
        assert_eq!(levels[0].justification, None);
    }

    #[test]
    fn test_bullet_level_has_no_counter() {
        let mut package = Package::new();
        add_list(&mut package, ListKind::Bulleted, ["Ball"]).unwrap();

        let xml = package.numbering().unwrap().to_xml();
        assert!(xml.contains(
            r#"<w:lvl w:ilvl="0"><w:numFmt w:val="bullet"/><w:lvlText w:val="·"/></w:lvl>"#
        ));
        assert!(!xml.contains("<w:start "));
        assert!(!xml.contains("<w:lvlJc "));
    }

    #[test]
    fn test_numbered_level_keeps_start_and_alignment() {
        let mut package = Package::new();
        add_list(&mut package, ListKind::Numbered, ["Apple"]).unwrap();

        let xml = package.numbering().unwrap().to_xml();
        assert!(xml.contains(
            r#"<w:lvl w:ilvl="0" w:tplc="0409000F"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/><w:lvlJc w:val="left"/></w:lvl>"#
        ));
    }

    #[test]
    fn test_numbered_levels_cycle() {
        let levels = ListKind::Numbered.levels();
        assert_eq!(levels.len(), 9);

        assert_eq!(levels[0].format, NumberFormat::Decimal);
        assert_eq!(levels[1].format, NumberFormat::LowerLetter);
        assert_eq!(levels[2].format, NumberFormat::LowerRoman);
        assert_eq!(levels[5].justification, Some(Justification::Right));
        assert_eq!(levels[8].text, "%9.");
        assert_eq!(levels[4].template_code.as_deref(), Some("04090019"));

        assert!(!levels[0].tentative);
        assert!(levels[1..].iter().all(|l| l.tentative));
    }

    #[test]
    fn test_list_items_reference_new_instance() {
        let mut package = Package::new();
        let ids = add_list(&mut package, ListKind::Numbered, ["Apple", "Banana"]).unwrap();
        assert_eq!(ids.len(), 2);

        for id in ids {
            let p = package.body().paragraph(id).unwrap();
            let props = p.properties.as_ref().unwrap();
            assert_eq!(
                props.numbering,
                Some(NumberingReference {
                    level: 0,
                    num_id: 1
                })
            );
            assert_eq!(props.spacing_after, Some(0));
            assert_eq!(props.mark_font.as_deref(), Some("Symbol"));
            assert_eq!(
                props.indentation,
                Some(Indentation {
                    left: 720,
                    hanging: 360
                })
            );
        }
    }

    #[test]
    fn test_each_list_gets_its_own_definition() {
        let mut package = Package::new();
        add_list(&mut package, ListKind::Bulleted, ["a"]).unwrap();
        add_list(&mut package, ListKind::Bulleted, ["b"]).unwrap();

        let numbering = package.numbering().unwrap();
        assert_eq!(numbering.abstracts().count(), 2);
        assert_eq!(numbering.instances().count(), 2);
        assert!(numbering.is_well_ordered());
    }

    #[test]
    fn test_empty_list_still_registers_definition() {
        let mut package = Package::new();
        let ids = add_list(&mut package, ListKind::Numbered, Vec::<String>::new()).unwrap();

        assert!(ids.is_empty());
        assert_eq!(package.body().paragraph_count(), 0);
        assert!(matches!(
            package.numbering().unwrap().entries()[0],
            NumberingEntry::Abstract(_)
        ));
    }

    #[test]
    fn test_run_and_paragraph_items() {
        let mut package = Package::new();
        let mut prebuilt = Paragraph::new(vec![Run::text("kept")]);
        prebuilt.apply_justification(Justification::Center);

        let ids = add_list(
            &mut package,
            ListKind::Bulleted,
            vec![
                ListItem::from(Run::text("bold").bold()),
                ListItem::from(prebuilt),
                ListItem::from(Run::text("u").underline(UnderlineKind::Dotted)),
            ],
        )
        .unwrap();

        let run_item = package.body().paragraph(ids[0]).unwrap();
        assert!(run_item.runs[0].properties.as_ref().unwrap().bold);

        let para_item = package.body().paragraph(ids[1]).unwrap();
        let props = para_item.properties.as_ref().unwrap();
        assert_eq!(props.justification, Some(Justification::Center));
        assert!(props.numbering.is_some());
        assert!(props.mark_font.is_none());
        assert_eq!(
            para_item.runs[0].content,
            RunContent::Text("kept".to_string())
        );
    }
}
