//! Numbering definitions (word/numbering.xml)
//!
//! The numbering part holds abstract definitions (level formats) and
//! instances that point at them. Paragraphs reference instances by id.
//! Every abstract definition must precede every instance in the part, so
//! insertions go through [`Numbering::append_abstract`] and
//! [`Numbering::append_instance`], which keep the two groups contiguous.

use crate::document::{escape_xml, Justification, WORDPROCESSINGML_NS};
use crate::error::{OoxmlError, Result};

/// Maximum levels an abstract definition may carry
pub const MAX_LEVELS: usize = 9;

/// Number format of a level (`w:numFmt`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    Bullet,
    Decimal,
    LowerLetter,
    LowerRoman,
}

impl NumberFormat {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Bullet => "bullet",
            Self::Decimal => "decimal",
            Self::LowerLetter => "lowerLetter",
            Self::LowerRoman => "lowerRoman",
        }
    }
}

/// A single level inside an abstract definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    /// Level index (0-8)
    pub index: u8,
    /// Start value; bullet levels carry none
    pub start: Option<u32>,
    /// Number format
    pub format: NumberFormat,
    /// Level text, e.g. `%1.` or a bullet glyph
    pub text: String,
    /// Alignment of the number
    pub justification: Option<Justification>,
    /// Template code (`w:tplc`), hex
    pub template_code: Option<String>,
    /// Level is only used when reached
    pub tentative: bool,
}

impl Level {
    fn write_xml(&self, out: &mut String) {
        out.push_str(&format!(r#"<w:lvl w:ilvl="{}""#, self.index));
        if let Some(tplc) = &self.template_code {
            out.push_str(&format!(r#" w:tplc="{}""#, escape_xml(tplc)));
        }
        if self.tentative {
            out.push_str(r#" w:tentative="1""#);
        }
        out.push('>');
        if let Some(start) = self.start {
            out.push_str(&format!(r#"<w:start w:val="{}"/>"#, start));
        }
        out.push_str(&format!(r#"<w:numFmt w:val="{}"/>"#, self.format.as_str()));
        out.push_str(&format!(r#"<w:lvlText w:val="{}"/>"#, escape_xml(&self.text)));
        if let Some(justification) = self.justification {
            out.push_str(&format!(r#"<w:lvlJc w:val="{}"/>"#, justification.as_str()));
        }
        out.push_str("</w:lvl>");
    }
}

/// Abstract numbering definition (`w:abstractNum`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractNumbering {
    /// `w:abstractNumId`
    pub id: u32,
    /// Levels, at most [`MAX_LEVELS`]
    pub levels: Vec<Level>,
}

/// Numbering instance (`w:num`) bound to an abstract definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingInstance {
    /// `w:numId`, referenced by paragraphs
    pub id: u32,
    /// Bound abstract definition
    pub abstract_id: u32,
}

/// Children of the numbering part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberingEntry {
    Abstract(AbstractNumbering),
    Instance(NumberingInstance),
}

/// The numbering collection of a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Numbering {
    entries: Vec<NumberingEntry>,
}

impl Numbering {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in part order
    pub fn entries(&self) -> &[NumberingEntry] {
        &self.entries
    }

    /// Iterate over abstract definitions
    pub fn abstracts(&self) -> impl Iterator<Item = &AbstractNumbering> {
        self.entries.iter().filter_map(|e| match e {
            NumberingEntry::Abstract(a) => Some(a),
            NumberingEntry::Instance(_) => None,
        })
    }

    /// Iterate over instances
    pub fn instances(&self) -> impl Iterator<Item = &NumberingInstance> {
        self.entries.iter().filter_map(|e| match e {
            NumberingEntry::Instance(i) => Some(i),
            NumberingEntry::Abstract(_) => None,
        })
    }

    /// Look up an abstract definition by id
    pub fn abstract_numbering(&self, id: u32) -> Option<&AbstractNumbering> {
        self.abstracts().find(|a| a.id == id)
    }

    /// Look up an instance by id
    pub fn instance(&self, id: u32) -> Option<&NumberingInstance> {
        self.instances().find(|i| i.id == id)
    }

    /// Id for the next abstract definition: number of existing ones plus one
    pub fn next_abstract_id(&self) -> u32 {
        self.abstracts().count() as u32 + 1
    }

    /// Id for the next instance: number of existing ones plus one
    pub fn next_instance_id(&self) -> u32 {
        self.instances().count() as u32 + 1
    }

    /// Insert an abstract definition after the last existing one
    ///
    /// With no abstract definition present it becomes the first entry, so it
    /// still precedes every instance.
    pub fn append_abstract(&mut self, abstract_numbering: AbstractNumbering) -> Result<u32> {
        if abstract_numbering.levels.len() > MAX_LEVELS {
            return Err(OoxmlError::InvalidStructure(format!(
                "abstract numbering {} has {} levels, maximum is {}",
                abstract_numbering.id,
                abstract_numbering.levels.len(),
                MAX_LEVELS
            )));
        }
        if self.abstract_numbering(abstract_numbering.id).is_some() {
            return Err(OoxmlError::InvalidStructure(format!(
                "abstract numbering id {} already exists",
                abstract_numbering.id
            )));
        }

        let index = self
            .entries
            .iter()
            .rposition(|e| matches!(e, NumberingEntry::Abstract(_)))
            .map_or(0, |i| i + 1);

        let id = abstract_numbering.id;
        self.entries
            .insert(index, NumberingEntry::Abstract(abstract_numbering));
        Ok(id)
    }

    /// Insert an instance after the last existing one (or at the end)
    pub fn append_instance(&mut self, instance: NumberingInstance) -> Result<u32> {
        if self.abstract_numbering(instance.abstract_id).is_none() {
            return Err(OoxmlError::InvalidStructure(format!(
                "numbering instance {} references missing abstract numbering {}",
                instance.id, instance.abstract_id
            )));
        }
        if self.instance(instance.id).is_some() {
            return Err(OoxmlError::InvalidStructure(format!(
                "numbering instance id {} already exists",
                instance.id
            )));
        }

        let index = self
            .entries
            .iter()
            .rposition(|e| matches!(e, NumberingEntry::Instance(_)))
            .map_or(self.entries.len(), |i| i + 1);

        self.entries.insert(index, NumberingEntry::Instance(instance));
        Ok(instance.id)
    }

    /// Allocate a fresh abstract definition with the given levels plus an instance bound to it
    ///
    /// Returns the new instance id. Nothing is inserted when validation fails.
    pub fn add_definition(&mut self, levels: Vec<Level>) -> Result<u32> {
        let abstract_id = self.next_abstract_id();
        let num_id = self.next_instance_id();

        if levels.len() > MAX_LEVELS {
            return Err(OoxmlError::InvalidStructure(format!(
                "{} numbering levels requested, maximum is {}",
                levels.len(),
                MAX_LEVELS
            )));
        }

        self.append_abstract(AbstractNumbering {
            id: abstract_id,
            levels,
        })?;
        self.append_instance(NumberingInstance {
            id: num_id,
            abstract_id,
        })?;

        log::debug!(
            "Registered numbering instance {} -> abstract {}",
            num_id,
            abstract_id
        );
        Ok(num_id)
    }

    /// True when no instance precedes an abstract definition
    pub fn is_well_ordered(&self) -> bool {
        let first_instance = self
            .entries
            .iter()
            .position(|e| matches!(e, NumberingEntry::Instance(_)));
        let last_abstract = self
            .entries
            .iter()
            .rposition(|e| matches!(e, NumberingEntry::Abstract(_)));

        match (last_abstract, first_instance) {
            (Some(a), Some(i)) => a < i,
            _ => true,
        }
    }

    /// Serialize the complete word/numbering.xml part
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        out.push('\n');
        out.push_str(&format!(r#"<w:numbering xmlns:w="{}">"#, WORDPROCESSINGML_NS));

        for entry in &self.entries {
            match entry {
                NumberingEntry::Abstract(a) => {
                    out.push_str(&format!(r#"<w:abstractNum w:abstractNumId="{}">"#, a.id));
                    for level in &a.levels {
                        level.write_xml(&mut out);
                    }
                    out.push_str("</w:abstractNum>");
                }
                NumberingEntry::Instance(i) => {
                    out.push_str(&format!(
                        r#"<w:num w:numId="{}"><w:abstractNumId w:val="{}"/></w:num>"#,
                        i.id, i.abstract_id
                    ));
                }
            }
        }

        out.push_str("</w:numbering>");
        out
    }
}
