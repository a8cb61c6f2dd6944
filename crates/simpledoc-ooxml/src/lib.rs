//! # simpledoc-ooxml
//!
//! Write-only assembly of WordprocessingML (DOCX) documents.
//!
//! This crate provides functionality to:
//! - Build paragraphs from text and formatted runs
//! - Add bulleted and numbered lists backed by numbering definitions
//! - Apply heading styles defined once in the style part
//! - Embed JPEG and PNG pictures scaled to the page width
//! - Save the result as a schema-ordered DOCX package
//!
//! ## Example
//!
//! ```no_run
//! use simpledoc_ooxml::{DocumentWriter, ParagraphStyle, Run, UnderlineKind};
//!
//! let mut writer = DocumentWriter::new();
//! let heading = writer.add_paragraph("This is a good report!")?;
//! writer.apply_style(heading, ParagraphStyle::Heading1)?;
//! writer.add_runs(vec![
//!     Run::text("Important: ").bold(),
//!     Run::text("read this").underline(UnderlineKind::Single),
//! ])?;
//! writer.add_bulleted_list(["Ball", "Wallet", "Phone"])?;
//! writer.add_image(&std::fs::read("photo.jpg")?)?;
//! writer.save_to_file("report.docx")?;
//! # Ok::<(), simpledoc_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod document;
pub mod error;
pub mod image;
pub mod lists;
pub mod numbering;
pub mod package;
pub mod relationships;
pub mod styles;
pub mod units;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_utils;

pub use archive::OoxmlArchive;
pub use document::{
    Body, BodyNode, BreakKind, Justification, Paragraph, ParagraphId, ParagraphProperties, Run,
    RunContent, RunProperties, SectionProperties, UnderlineKind,
};
pub use error::{OoxmlError, Result};
pub use image::{Drawing, Extent, ImageInfo, RasterFormat};
pub use lists::{ListItem, ListKind};
pub use numbering::{Numbering, NumberingEntry};
pub use package::Package;
pub use relationships::Relationships;
pub use styles::{ParagraphStyle, Style, StyleSheet, StyleType};
pub use writer::DocumentWriter;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
