//! Error types for document assembly

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or saving a document
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// The image stream is not a raster format the engine can embed
    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    /// The image stream is empty, truncated, or could not be read
    #[error("Image read error: {0}")]
    ImageReadError(String),

    /// The image reports a resolution that cannot be converted to a size
    #[error("Invalid image metadata: {0}")]
    InvalidImageMetadata(String),

    /// A paragraph style name outside the supported set
    #[error("Unsupported style: {0}")]
    UnsupportedStyle(String),

    /// The writer was disposed (or saved) and has not been reset
    #[error("Document writer has been disposed")]
    WriterDisposed,

    /// Refused to overwrite an existing output file
    #[error("File already exists: {}", .0.display())]
    FileAlreadyExists(PathBuf),

    /// An insertion would break a part's ordering or reference rules
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// Error writing the ZIP container
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for document operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
