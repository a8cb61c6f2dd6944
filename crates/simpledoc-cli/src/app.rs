//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use simpledoc_ooxml::{DocumentWriter, Justification, ParagraphStyle};

use crate::recipe::Recipe;

#[derive(Parser)]
#[command(name = "simpledoc")]
#[command(author, version, about = "Assemble Word documents from plain recipes", long_about = None)]
struct Cli {
    /// Log structural changes (overrides RUST_LOG's default level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a DOCX file from a TOML or JSON recipe
    Build {
        /// Recipe file (.toml or .json)
        recipe: PathBuf,

        /// Output DOCX file (default: recipe name with .docx extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace the output file if it already exists
        #[arg(long)]
        force: bool,
    },

    /// Write the demo report with lists and optional pictures
    Sample {
        /// Output DOCX file
        #[arg(short, long, default_value = "sample.docx")]
        output: PathBuf,

        /// Picture to embed (repeatable); missing files are skipped
        #[arg(short, long = "picture")]
        pictures: Vec<PathBuf>,

        /// Replace the output file if it already exists
        #[arg(long)]
        force: bool,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build {
            recipe,
            output,
            force,
        } => {
            build_command(&recipe, output.as_deref(), force)?;
        }
        Commands::Sample {
            output,
            pictures,
            force,
        } => {
            sample_command(&output, &pictures, force)?;
        }
    }

    Ok(())
}

/// Install the logger; `RUST_LOG` wins over the default level
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    // A logger may already be installed when embedded in another binary
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

/// Execute the build command
pub fn build_command(recipe_path: &Path, output: Option<&Path>, force: bool) -> Result<()> {
    println!("simpledoc v{}", simpledoc_ooxml::VERSION);
    println!("Building: {}", recipe_path.display());

    if !recipe_path.exists() {
        anyhow::bail!("Recipe file not found: {}", recipe_path.display());
    }

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => recipe_path.with_extension("docx"),
    };

    let recipe = Recipe::load(recipe_path)?;
    let base_dir = recipe_path.parent().unwrap_or_else(|| Path::new("."));

    let mut writer = DocumentWriter::new();
    let summary = recipe.apply(&mut writer, base_dir)?;

    save_output(&mut writer, &output_path, force)?;

    println!("  Created: {}", output_path.display());
    println!();
    println!("Build complete!");
    println!(
        "  {} paragraphs ({} list items, {} images)",
        summary.paragraphs, summary.list_items, summary.images
    );

    Ok(())
}

/// Execute the sample command
pub fn sample_command(output: &Path, pictures: &[PathBuf], force: bool) -> Result<()> {
    println!("simpledoc v{}", simpledoc_ooxml::VERSION);
    println!("Writing sample: {}", output.display());

    let mut writer = DocumentWriter::new();
    let embedded = write_sample(&mut writer, pictures)?;

    save_output(&mut writer, output, force)?;

    println!("  Created: {}", output.display());
    println!("  {} of {} pictures embedded", embedded, pictures.len());

    Ok(())
}

/// Assemble the demo report, returning how many pictures were embedded
pub fn write_sample(writer: &mut DocumentWriter, pictures: &[PathBuf]) -> Result<usize> {
    let title = writer.add_paragraph("This is a good report!")?;
    writer.apply_style(title, ParagraphStyle::Heading1)?;
    writer.apply_justification(title, Justification::Center)?;

    writer.add_numbered_list(["Apple", "Banana", "Carrot"])?;
    writer.add_paragraph("This is a spacing paragraph 1.")?;

    writer.add_numbered_list(["Dog", "Cat", "Bear"])?;
    writer.add_paragraph("This is a spacing paragraph 2.")?;

    writer.add_bulleted_list(["Ball", "Wallet", "Phone"])?;

    let mut embedded = 0;
    for (index, picture) in pictures.iter().enumerate() {
        if !picture.is_file() {
            log::warn!(
                "Picture not found so it was not added: {}",
                picture.display()
            );
            continue;
        }

        let bytes = fs::read(picture)
            .with_context(|| format!("Failed to read picture: {}", picture.display()))?;
        writer
            .add_image(&bytes)
            .with_context(|| format!("Failed to embed picture: {}", picture.display()))?;
        writer.add_paragraph(&format!("This is a spacing paragraph {}.", index + 1))?;
        embedded += 1;
    }

    let done = writer.add_paragraph("Done.")?;
    writer.apply_style(done, ParagraphStyle::Heading1)?;

    Ok(embedded)
}

/// Write the finished document to `path`
///
/// An existing file is only touched with `force`, and then only replaced
/// once the new package has been written in full next to it.
fn save_output(writer: &mut DocumentWriter, path: &Path, force: bool) -> Result<()> {
    if !path.exists() {
        return writer
            .save_to_file(path)
            .with_context(|| format!("Failed to write DOCX file: {}", path.display()));
    }
    if !force {
        anyhow::bail!(
            "Output file already exists: {}\n\
             \n\
             Use --force to replace it.",
            path.display()
        );
    }

    let docx = writer.save_to_stream()?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::Builder::new()
        .prefix(".simpledoc-")
        .suffix(".docx")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

    staged
        .write_all(docx.get_ref())
        .and_then(|()| staged.as_file().sync_all())
        .with_context(|| format!("Failed to write {}", staged.path().display()))?;

    staged
        .persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace existing file: {}", path.display()))?;
    log::debug!("Replaced {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_build() {
        let args = vec!["simpledoc", "build", "report.toml", "--output", "out.docx"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Build {
                recipe,
                output,
                force,
            } => {
                assert_eq!(recipe, PathBuf::from("report.toml"));
                assert_eq!(output, Some(PathBuf::from("out.docx")));
                assert!(!force);
            }
            _ => panic!("Expected Build command"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_build_force_verbose() {
        let args = vec!["simpledoc", "build", "report.json", "--force", "-v"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Build { output, force, .. } => {
                assert_eq!(output, None);
                assert!(force);
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_parse_sample_defaults() {
        let args = vec!["simpledoc", "sample"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Sample {
                output,
                pictures,
                force,
            } => {
                assert_eq!(output, PathBuf::from("sample.docx"));
                assert!(pictures.is_empty());
                assert!(!force);
            }
            _ => panic!("Expected Sample command"),
        }
    }

    #[test]
    fn test_cli_parse_sample_multiple_pictures() {
        let args = vec![
            "simpledoc",
            "sample",
            "--picture",
            "one.jpg",
            "-p",
            "two.png",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Sample { pictures, .. } => {
                assert_eq!(
                    pictures,
                    vec![PathBuf::from("one.jpg"), PathBuf::from("two.png")]
                );
            }
            _ => panic!("Expected Sample command"),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(vec!["simpledoc"]).is_err());
    }

    #[test]
    fn test_failed_replace_keeps_existing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("kept.docx");
        fs::write(&output, b"previous").unwrap();

        let mut writer = DocumentWriter::new();
        writer.add_paragraph("unsaved").unwrap();
        writer.save_to_stream().unwrap();

        assert!(save_output(&mut writer, &output, true).is_err());
        assert_eq!(fs::read(&output).unwrap(), b"previous");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_replace_leaves_no_staging_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("report.docx");
        fs::write(&output, b"previous").unwrap();

        let mut writer = DocumentWriter::new();
        writer.add_paragraph("fresh").unwrap();
        save_output(&mut writer, &output, true).unwrap();

        assert_ne!(fs::read(&output).unwrap(), b"previous");
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("report.docx")]);
    }

    #[test]
    fn test_write_sample_skips_missing_pictures() {
        let mut writer = DocumentWriter::new();
        let embedded = write_sample(
            &mut writer,
            &[PathBuf::from("/no/such/picture1.jpg")],
        )
        .unwrap();

        assert_eq!(embedded, 0);
        // title, 3 + 3 + 3 items, two spacing paragraphs, closing heading
        assert_eq!(writer.body().unwrap().paragraph_count(), 13);
        assert_eq!(writer.numbering().unwrap().unwrap().instances().count(), 3);
    }
}
