//! ZIP container handling for DOCX packages
//!
//! A DOCX file is a ZIP archive of XML parts and media. The writer builds
//! every part in memory, then flushes them through [`OoxmlArchive::write_to`].
//! Parts are kept in path order, so the same document always produces the
//! same entry sequence.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::error::{OoxmlError, Result};

/// In-memory set of package parts, keyed by path
#[derive(Debug, Default)]
pub struct OoxmlArchive {
    parts: BTreeMap<String, Vec<u8>>,
}

impl OoxmlArchive {
    /// Create an empty archive
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and unpack a DOCX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;
        let mut parts = BTreeMap::new();

        for index in 0..zip.len() {
            let mut entry = zip.by_index(index)?;
            if entry.is_dir() {
                continue;
            }

            let mut contents = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut contents)?;
            parts.insert(entry.name().to_string(), contents);
        }

        log::debug!("Read {} part(s) from archive", parts.len());
        Ok(Self { parts })
    }

    /// Raw bytes of a part
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.parts.get(path).map(Vec::as_slice)
    }

    /// A part decoded as UTF-8 text
    ///
    /// Fails with [`OoxmlError::InvalidStructure`] when the part exists but
    /// is not valid UTF-8.
    pub fn get_string(&self, path: &str) -> Result<Option<String>> {
        self.parts
            .get(path)
            .map(|bytes| {
                String::from_utf8(bytes.clone()).map_err(|e| {
                    OoxmlError::InvalidStructure(format!("{} is not UTF-8: {}", path, e))
                })
            })
            .transpose()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.parts.contains_key(path)
    }

    /// Part paths in archive order
    pub fn file_list(&self) -> Vec<&str> {
        self.parts.keys().map(String::as_str).collect()
    }

    /// Insert or replace a part
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.parts.insert(path.into(), contents);
    }

    /// Insert or replace a text part
    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.set(path, contents.into().into_bytes());
    }

    /// Write every part as a deflated ZIP entry
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (path, contents) in &self.parts {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(contents)?;
        }

        zip.finish()?;
        Ok(())
    }
}
