//! Document recipes
//!
//! A recipe is an ordered list of blocks, read from TOML or JSON, that the
//! `build` command replays against a [`DocumentWriter`].
//!
//! ```toml
//! [[blocks]]
//! type = "heading"
//! text = "Quarterly report"
//! justification = "center"
//!
//! [[blocks]]
//! type = "numbered-list"
//! items = ["Apple", "Banana", "Carrot"]
//!
//! [[blocks]]
//! type = "image"
//! path = "chart.png"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use simpledoc_ooxml::{
    BreakKind, DocumentWriter, Justification, ParagraphStyle, Run, UnderlineKind,
};

/// On-disk recipe format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeFormat {
    Toml,
    Json,
}

impl RecipeFormat {
    /// Detect the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => anyhow::bail!(
                "Unrecognized recipe format: {} (expected .toml or .json)",
                path.display()
            ),
        }
    }
}

/// An ordered list of document blocks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// One step of a recipe
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Block {
    /// A styled title paragraph
    Heading {
        text: String,
        #[serde(default = "default_heading_style")]
        style: ParagraphStyle,
        #[serde(default)]
        justification: Option<Justification>,
    },

    /// A body paragraph; `sentences` wins over `text` when both are given
    Paragraph {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        sentences: Vec<String>,
        #[serde(default)]
        style: ParagraphStyle,
        #[serde(default)]
        justification: Option<Justification>,
        #[serde(default)]
        bold: bool,
        #[serde(default)]
        underline: Option<UnderlineKind>,
    },

    /// A paragraph holding a page break
    PageBreak,

    /// A paragraph holding a break of any kind
    Break { kind: BreakKind },

    BulletedList { items: Vec<String> },

    NumberedList { items: Vec<String> },

    /// A JPEG or PNG file; relative paths resolve against the recipe's directory
    Image { path: PathBuf },
}

fn default_heading_style() -> ParagraphStyle {
    ParagraphStyle::Heading1
}

/// Counts reported after a recipe has been applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub paragraphs: usize,
    pub list_items: usize,
    pub images: usize,
}

impl Recipe {
    /// Parse a TOML recipe
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid TOML recipe")
    }

    /// Parse a JSON recipe
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Invalid JSON recipe")
    }

    /// Read and parse a recipe file
    pub fn load(path: &Path) -> Result<Self> {
        let format = RecipeFormat::from_path(path)?;
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipe: {}", path.display()))?;

        let recipe = match format {
            RecipeFormat::Toml => Self::from_toml_str(&content),
            RecipeFormat::Json => Self::from_json_str(&content),
        }
        .with_context(|| format!("Failed to parse recipe: {}", path.display()))?;

        log::debug!(
            "Loaded {} block(s) from {}",
            recipe.blocks.len(),
            path.display()
        );
        Ok(recipe)
    }

    /// Replay every block against the writer, in order
    pub fn apply(&self, writer: &mut DocumentWriter, base_dir: &Path) -> Result<BuildSummary> {
        let mut summary = BuildSummary::default();

        for (index, block) in self.blocks.iter().enumerate() {
            block
                .apply(writer, base_dir, &mut summary)
                .with_context(|| format!("Block {} ({}) failed", index + 1, block.kind()))?;
        }

        Ok(summary)
    }
}

impl Block {
    /// Recipe tag of this block
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Heading { .. } => "heading",
            Self::Paragraph { .. } => "paragraph",
            Self::PageBreak => "page-break",
            Self::Break { .. } => "break",
            Self::BulletedList { .. } => "bulleted-list",
            Self::NumberedList { .. } => "numbered-list",
            Self::Image { .. } => "image",
        }
    }

    fn apply(
        &self,
        writer: &mut DocumentWriter,
        base_dir: &Path,
        summary: &mut BuildSummary,
    ) -> Result<()> {
        match self {
            Self::Heading {
                text,
                style,
                justification,
            } => {
                let id = writer.add_paragraph(text)?;
                writer.apply_style(id, *style)?;
                if let Some(justification) = justification {
                    writer.apply_justification(id, *justification)?;
                }
                summary.paragraphs += 1;
            }
            Self::Paragraph {
                text,
                sentences,
                style,
                justification,
                bold,
                underline,
            } => {
                let texts: Vec<&str> = if sentences.is_empty() {
                    text.as_deref().into_iter().collect()
                } else {
                    sentences.iter().map(String::as_str).collect()
                };

                let runs = texts
                    .into_iter()
                    .map(|t| {
                        let mut run = Run::text(t);
                        if *bold {
                            run = run.bold();
                        }
                        if let Some(kind) = underline {
                            run = run.underline(*kind);
                        }
                        run
                    })
                    .collect();

                let id = writer.add_runs(runs)?;
                writer.apply_style(id, *style)?;
                if let Some(justification) = justification {
                    writer.apply_justification(id, *justification)?;
                }
                summary.paragraphs += 1;
            }
            Self::PageBreak => {
                writer.add_page_break()?;
                summary.paragraphs += 1;
            }
            Self::Break { kind } => {
                writer.add_run(Run::new_break(*kind))?;
                summary.paragraphs += 1;
            }
            Self::BulletedList { items } => {
                let ids = writer.add_bulleted_list(items)?;
                summary.paragraphs += ids.len();
                summary.list_items += ids.len();
            }
            Self::NumberedList { items } => {
                let ids = writer.add_numbered_list(items)?;
                summary.paragraphs += ids.len();
                summary.list_items += ids.len();
            }
            Self::Image { path } => {
                let resolved = base_dir.join(path);
                let bytes = fs::read(&resolved)
                    .with_context(|| format!("Failed to read image: {}", resolved.display()))?;
                writer
                    .add_image(&bytes)
                    .with_context(|| format!("Failed to embed image: {}", resolved.display()))?;
                summary.paragraphs += 1;
                summary.images += 1;
            }
        }
        Ok(())
    }
}
