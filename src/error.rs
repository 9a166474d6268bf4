//! Error types for tabmark library.

use std::io;
use thiserror::Error;

/// Result type alias for tabmark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unterminated or malformed table markup.
    #[error("Malformed table markup at byte {offset}: {message}")]
    Structural {
        /// Byte offset of the offending `<table>` opener
        offset: usize,
        /// Description of the problem
        message: String,
    },

    /// Error writing the spreadsheet workbook.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    /// Error serializing a conversion result.
    #[error("Rendering error: {0}")]
    Render(String),

    /// The input was rejected before conversion started.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a structural error for a table block starting at `offset`.
    pub fn structural(offset: usize, message: impl Into<String>) -> Self {
        Error::Structural {
            offset,
            message: message.into(),
        }
    }

    /// Check if this error was caused by malformed markup.
    pub fn is_structural(&self) -> bool {
        matches!(self, Error::Structural { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::structural(42, "missing </table>");
        assert_eq!(
            err.to_string(),
            "Malformed table markup at byte 42: missing </table>"
        );
        assert!(err.is_structural());

        let err = Error::InvalidInput("expected .md".to_string());
        assert_eq!(err.to_string(), "Invalid input: expected .md");
        assert!(!err.is_structural());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
