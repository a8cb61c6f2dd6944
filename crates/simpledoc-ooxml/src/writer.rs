//! Document writer
//!
//! [`DocumentWriter`] owns one package at a time and exposes the paragraph,
//! list, style and image operations on it. Saving finalizes the package and
//! disposes the writer; [`DocumentWriter::reset`] starts a fresh document.
//!
//! # Example
//!
//! ```
//! use simpledoc_ooxml::{DocumentWriter, Justification, ParagraphStyle};
//!
//! let mut writer = DocumentWriter::new();
//! let title = writer.add_paragraph("Quarterly report")?;
//! writer.apply_style(title, ParagraphStyle::Heading1)?;
//! writer.apply_justification(title, Justification::Center)?;
//! writer.add_numbered_list(["Apple", "Banana", "Carrot"])?;
//!
//! let docx = writer.save_to_stream()?.into_inner();
//! assert!(docx.starts_with(b"PK"));
//! assert!(writer.is_disposed());
//! # Ok::<(), simpledoc_ooxml::OoxmlError>(())
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Cursor, Read};
use std::path::Path;

use crate::document::{Body, BreakKind, Justification, Paragraph, ParagraphId, Run};
use crate::error::{OoxmlError, Result};
use crate::image;
use crate::lists::{self, ListItem, ListKind};
use crate::numbering::Numbering;
use crate::package::Package;
use crate::styles::{ParagraphStyle, StyleSheet};

/// Builds one WordprocessingML document
#[derive(Debug)]
pub struct DocumentWriter {
    /// Open package, `None` once disposed
    package: Option<Package>,
}

impl Default for DocumentWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentWriter {
    /// Create a writer with a new, empty document
    pub fn new() -> Self {
        Self {
            package: Some(Package::new()),
        }
    }

    /// Discard the current document (if any) and start a new one
    pub fn reset(&mut self) {
        log::debug!("Resetting document writer");
        self.package = Some(Package::new());
    }

    /// Release the current document; later operations fail with `WriterDisposed`
    pub fn dispose(&mut self) {
        if self.package.take().is_some() {
            log::debug!("Document writer disposed");
        }
    }

    /// True once the writer was disposed or saved and not yet reset
    pub fn is_disposed(&self) -> bool {
        self.package.is_none()
    }

    fn package(&self) -> Result<&Package> {
        self.package.as_ref().ok_or(OoxmlError::WriterDisposed)
    }

    fn package_mut(&mut self) -> Result<&mut Package> {
        self.package.as_mut().ok_or(OoxmlError::WriterDisposed)
    }

    /// Current body
    pub fn body(&self) -> Result<&Body> {
        Ok(self.package()?.body())
    }

    /// Current numbering collection, if a list was added
    pub fn numbering(&self) -> Result<Option<&Numbering>> {
        Ok(self.package()?.numbering())
    }

    /// Current style collection, if a style was applied
    pub fn styles(&self) -> Result<Option<&StyleSheet>> {
        Ok(self.package()?.styles())
    }

    /// Mutable access to an appended paragraph, e.g. to format its runs
    pub fn paragraph_mut(&mut self, id: ParagraphId) -> Result<&mut Paragraph> {
        self.package_mut()?.body_mut().paragraph_mut(id)
    }

    /// Append a paragraph as-is
    pub fn append_paragraph(&mut self, paragraph: Paragraph) -> Result<ParagraphId> {
        self.package_mut()?.body_mut().append_paragraph(paragraph)
    }

    /// Append a paragraph with a single text run
    pub fn add_paragraph(&mut self, text: &str) -> Result<ParagraphId> {
        self.append_paragraph(Paragraph::new(vec![Run::text(text)]))
    }

    /// Append one paragraph with a text run per sentence
    pub fn add_sentences<S: AsRef<str>>(&mut self, sentences: &[S]) -> Result<ParagraphId> {
        self.append_paragraph(Paragraph::from_sentences(sentences))
    }

    /// Append a paragraph holding one run
    pub fn add_run(&mut self, run: Run) -> Result<ParagraphId> {
        self.append_paragraph(Paragraph::new(vec![run]))
    }

    /// Append a paragraph holding the given runs in order
    pub fn add_runs(&mut self, runs: Vec<Run>) -> Result<ParagraphId> {
        self.append_paragraph(Paragraph::new(runs))
    }

    /// Append a paragraph holding a page break
    pub fn add_page_break(&mut self) -> Result<ParagraphId> {
        self.add_run(Run::new_break(BreakKind::Page))
    }

    /// Attach a paragraph style, defining it in the style part when needed
    ///
    /// [`ParagraphStyle::None`] leaves the paragraph untouched.
    pub fn apply_style(&mut self, id: ParagraphId, kind: ParagraphStyle) -> Result<()> {
        let package = self.package_mut()?;
        package.body_mut().paragraph_mut(id)?;

        if let Some(style_id) = package.ensure_style(kind) {
            package.body_mut().paragraph_mut(id)?.properties_mut().style_id = Some(style_id);
        }
        Ok(())
    }

    /// Set a paragraph's alignment
    pub fn apply_justification(
        &mut self,
        id: ParagraphId,
        justification: Justification,
    ) -> Result<()> {
        self.paragraph_mut(id)?.apply_justification(justification);
        Ok(())
    }

    /// Append a bulleted list, one paragraph per item
    pub fn add_bulleted_list<I>(&mut self, items: I) -> Result<Vec<ParagraphId>>
    where
        I: IntoIterator,
        I::Item: Into<ListItem>,
    {
        lists::add_list(self.package_mut()?, ListKind::Bulleted, items)
    }

    /// Append a numbered list, one paragraph per item
    pub fn add_numbered_list<I>(&mut self, items: I) -> Result<Vec<ParagraphId>>
    where
        I: IntoIterator,
        I::Item: Into<ListItem>,
    {
        lists::add_list(self.package_mut()?, ListKind::Numbered, items)
    }

    /// Embed an encoded JPEG or PNG image in its own paragraph
    pub fn add_image(&mut self, bytes: &[u8]) -> Result<ParagraphId> {
        image::add_image(self.package_mut()?, bytes)
    }

    /// Read an encoded image from a stream and embed it
    pub fn add_image_from_reader<R: Read>(&mut self, mut reader: R) -> Result<ParagraphId> {
        self.package()?;
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| OoxmlError::ImageReadError(e.to_string()))?;
        self.add_image(&bytes)
    }

    /// Finalize the document into an in-memory DOCX, rewound to the start
    ///
    /// The writer is disposed afterwards.
    pub fn save_to_stream(&mut self) -> Result<Cursor<Vec<u8>>> {
        let package = self.package.take().ok_or(OoxmlError::WriterDisposed)?;

        let mut cursor = Cursor::new(Vec::new());
        package.write_to(&mut cursor)?;
        cursor.set_position(0);

        log::debug!("Saved document ({} bytes)", cursor.get_ref().len());
        Ok(cursor)
    }

    /// Finalize the document into a new file
    ///
    /// Existing files are never overwritten. The writer is disposed once the
    /// file has been created, whether or not writing succeeds.
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.package()?;

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => OoxmlError::FileAlreadyExists(path.to_path_buf()),
                _ => OoxmlError::Io(e),
            })?;

        let package = self.package.take().ok_or(OoxmlError::WriterDisposed)?;
        if let Err(e) = package.write_to(file) {
            if let Err(cleanup) = fs::remove_file(path) {
                log::warn!("Could not remove partial {}: {}", path.display(), cleanup);
            }
            return Err(e);
        }

        log::debug!("Saved document to {}", path.display());
        Ok(())
    }
}
