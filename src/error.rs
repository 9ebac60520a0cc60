//! Error types for PDF Annotator

use std::path::Path;
use thiserror::Error;

/// Result type alias for PDF Annotator
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`], used to pick exit codes and messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input caught before any document was touched
    Validation,
    /// A file could not be read or written because of its permissions or a lock
    AccessDenied,
    /// Anything that went wrong while processing a document or writing output
    Processing,
}

/// Error types for PDF Annotator
#[derive(Error, Debug)]
pub enum Error {
    /// Input path is neither a file nor a directory
    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    /// Search term does not compile as a regular expression
    #[error("Invalid search pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Invalid page range
    #[error("Invalid page range: {range}")]
    InvalidPageRange { range: String },

    /// Color name not present in the color table
    #[error("Unknown color: {name}")]
    UnknownColor { name: String },

    /// Context window outside the accepted range
    #[error("Invalid context size: {size} (expected {min}-{max})")]
    InvalidContextSize { size: usize, min: usize, max: usize },

    /// Argument combination that makes no sense for this input
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// File is locked or not readable/writable by this user
    #[error("Access denied: {path}")]
    AccessDenied {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// PDF is password protected
    #[error("PDF is password protected")]
    PasswordRequired,

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Report writing error
    #[error("Report error: {0}")]
    Report(#[from] csv::Error),
}

impl Error {
    /// Map an I/O error on `path`, separating permission problems from the rest.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            Error::AccessDenied {
                path: path.display().to_string(),
                source: err,
            }
        } else {
            Error::Io(err)
        }
    }

    /// Which of the three error classes this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidPath { .. }
            | Error::InvalidPattern { .. }
            | Error::InvalidPageRange { .. }
            | Error::UnknownColor { .. }
            | Error::InvalidContextSize { .. }
            | Error::InvalidArgument { .. } => ErrorKind::Validation,
            Error::AccessDenied { .. } => ErrorKind::AccessDenied,
            Error::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                ErrorKind::AccessDenied
            }
            Error::InvalidPdf { .. }
            | Error::PasswordRequired
            | Error::Pdfium { .. }
            | Error::Io(_)
            | Error::Report(_) => ErrorKind::Processing,
        }
    }

    /// Return the message shown to the person running the tool.
    /// Library details are logged via tracing, not repeated here.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::AccessDenied => {
                "Permission denied: please close the PDF file(s) you are trying to edit."
                    .to_string()
            }
            _ => self.to_string(),
        }
    }
}
