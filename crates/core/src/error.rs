//! Error types for presentation translation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, translating, or saving a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read, or write a file.
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// Failed to make sense of the PPTX package structure.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// A rewritten slide no longer lines up with its source runs.
    #[error("Slide structure mismatch: {0}")]
    SlideStructure(String),

    /// A slide task panicked before finishing.
    #[error("Slide task panicked: {0}")]
    TaskPanicked(String),

    /// The worker pool size must be at least 1.
    #[error("Invalid worker count: {0} (must be at least 1)")]
    InvalidWorkerCount(usize),

    /// The worker pool could not be started.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}
