//! simpledoc CLI - Command-line interface library
//!
//! This library provides the CLI functionality for simpledoc:
//! - Build: Assemble a DOCX file from a TOML or JSON recipe
//! - Sample: Write the demo report
//!
//! # Library Usage
//!
//! ```ignore
//! use simpledoc_cli::{build_command, run_cli};
//!
//! // Run the full CLI
//! run_cli()?;
//!
//! // Or use individual commands programmatically
//! build_command(Path::new("report.toml"), None, false)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Build from a recipe
//! simpledoc build report.toml --output report.docx
//!
//! # Demo document with two pictures
//! simpledoc sample -o demo.docx --picture picture1.jpg --picture picture2.jpg
//! ```

pub mod app;
pub mod recipe;

// Re-export main entry point and types
pub use app::{build_command, run_cli, sample_command, write_sample};
pub use recipe::{Block, BuildSummary, Recipe, RecipeFormat};
