//! Error types for roverpdf.
//!
//! Errors are grouped by the stage of assembly that produced them:
//!
//! - **Admission**: a file entry was refused when it was added.
//! - **Render**: an entry could not be turned into PDF bytes.
//! - **Import**: rendered bytes could not be opened as a page source.
//! - **Overlay**: stamping page numbers failed.
//! - **Output**: the assembled document could not be written.
//!
//! Admission, render and import errors only ever skip a single entry.
//! Everything else aborts the save.

use std::io;
use std::path::PathBuf;

/// Result type alias for roverpdf operations.
pub type Result<T> = std::result::Result<T, RoverError>;

/// Stage of the assembly pipeline an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Entry refused at `add` time.
    Admission,
    /// Entry could not be rendered to PDF bytes.
    Render,
    /// Rendered bytes were not a usable page source.
    Import,
    /// Page-number stamping failed.
    Overlay,
    /// Writing the output failed.
    Output,
    /// Invalid configuration.
    Config,
    /// Anything else.
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Admission => "admission",
            Self::Render => "render",
            Self::Import => "import",
            Self::Overlay => "overlay",
            Self::Output => "output",
            Self::Config => "config",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Main error type for roverpdf operations.
#[derive(Debug, thiserror::Error)]
pub enum RoverError {
    /// Referenced file does not exist.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Referenced path exists but is not a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Offending path.
        path: PathBuf,
    },

    /// Declared MIME type is outside the allow-list.
    #[error(
        "Invalid mimetype {mime} for document {}\n  Allowed: application/pdf, image/bmp, image/jpeg, image/png",
        path.display()
    )]
    UnsupportedMimeType {
        /// Path of the refused document.
        path: PathBuf,
        /// Declared MIME type.
        mime: String,
    },

    /// Source file could not be read at render time.
    #[error("Failed to read source: {}\n  Reason: {source}", path.display())]
    FailedToReadSource {
        /// Path of the source file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Image could not be decoded.
    #[error("Failed to decode image: {}\n  Reason: {reason}", path.display())]
    ImageDecode {
        /// Path of the image.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// Image could not be encoded into a PDF page.
    #[error("Failed to convert image to PDF: {}\n  Reason: {reason}", path.display())]
    ImageEncode {
        /// Path of the image.
        path: PathBuf,
        /// Encoder message.
        reason: String,
    },

    /// Rendered bytes are not a readable PDF.
    #[error("Failed to load PDF: {origin}\n  Reason: {reason}")]
    FailedToLoadPdf {
        /// Human readable origin of the bytes (a path or "inline bytes").
        origin: String,
        /// Parser message.
        reason: String,
    },

    /// Stamping the page number onto a page failed.
    #[error("Failed to add page number to page {page}: {reason}")]
    PageNumberFailed {
        /// 1-based page number.
        page: usize,
        /// What went wrong.
        reason: String,
    },

    /// Output file could not be created.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Output could not be written.
    #[error("Failed to write output: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Output path, or `-` for a stream.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Error raised by the PDF object model.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl RoverError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create an UnsupportedMimeType error.
    pub fn unsupported_mime_type(path: PathBuf, mime: impl Into<String>) -> Self {
        Self::UnsupportedMimeType {
            path,
            mime: mime.into(),
        }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// Create a PageNumberFailed error.
    pub fn page_number_failed(page: usize, reason: impl Into<String>) -> Self {
        Self::PageNumberFailed {
            page,
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Pipeline stage this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound { .. }
            | Self::NotAFile { .. }
            | Self::UnsupportedMimeType { .. } => ErrorKind::Admission,
            Self::FailedToReadSource { .. }
            | Self::ImageDecode { .. }
            | Self::ImageEncode { .. } => ErrorKind::Render,
            Self::FailedToLoadPdf { .. } => ErrorKind::Import,
            Self::PageNumberFailed { .. } => ErrorKind::Overlay,
            Self::FailedToCreateOutput { .. } | Self::FailedToWrite { .. } => ErrorKind::Output,
            Self::InvalidConfig { .. } => ErrorKind::Config,
            Self::Io { .. } | Self::Pdf(_) | Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Check if this error only skips one entry.
    ///
    /// Recoverable errors are reported through the diagnostic sink and the
    /// assembly carries on with the next entry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Admission | ErrorKind::Render | ErrorKind::Import
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::UnsupportedMimeType { .. } => 1,
            Self::FailedToReadSource { .. } => 3,
            Self::ImageDecode { .. } => 3,
            Self::ImageEncode { .. } => 3,
            Self::FailedToLoadPdf { .. } => 3,
            Self::PageNumberFailed { .. } => 6,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::InvalidConfig { .. } => 1,
            Self::Io { .. } => 5,
            Self::Pdf(_) => 6,
            Self::Other { .. } => 1,
        }
    }
}
