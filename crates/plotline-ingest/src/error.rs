//! Error types for spreadsheet ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a spreadsheet export.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Spreadsheet file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the configured size limit.
    #[error("file {path} is {size} bytes, larger than the {max_size} byte limit")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// File uses an encoding we cannot read.
    #[error("unsupported encoding {encoding} in {path}")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    /// File extension is not a supported export format.
    #[error("unsupported spreadsheet format '{extension}' for {path}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    // === Parsing Errors ===
    /// Failed to parse CSV.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Failed to parse a JSON row export.
    #[error("failed to parse JSON {path}: {message}")]
    JsonParse { path: PathBuf, message: String },

    /// JSON parsed but is not an array of row objects.
    #[error("unexpected JSON shape in {path}: {reason}")]
    JsonShape { path: PathBuf, reason: String },

    /// Failed to open or read a workbook.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// The sheet has no header row.
    #[error("sheet is empty: {path}")]
    EmptySheet { path: PathBuf },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

pub(crate) fn open_error(path: &std::path::Path, err: std::io::Error) -> IngestError {
    if err.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/path/to/projects.csv"),
        };
        assert_eq!(err.to_string(), "file not found: /path/to/projects.csv");
    }

    #[test]
    fn test_open_error_maps_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = open_error(std::path::Path::new("x.csv"), io);
        assert!(matches!(err, IngestError::FileNotFound { .. }));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err = open_error(std::path::Path::new("x.csv"), io);
        assert!(matches!(err, IngestError::FileRead { .. }));
    }
}
