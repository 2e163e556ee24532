//! First-sheet loading for spreadsheet exports.

mod delimited;
mod json;
mod workbook;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{IngestError, Result, open_error};
use crate::row::RawRow;

pub use delimited::{read_csv_from_reader, read_csv_sheet};
pub use json::{read_json_from_str, read_json_sheet};
pub use workbook::read_workbook_sheet;

/// Maximum file size for a spreadsheet export (100 MB default).
pub const MAX_SHEET_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// The first sheet of an export: header labels plus data rows.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    /// Column labels from the header row, whitespace-collapsed.
    pub headers: Vec<String>,
    /// Data rows; fully blank rows are dropped at load time.
    pub rows: Vec<RawRow>,
}

impl Sheet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reads the first sheet of an export, dispatching on the file extension.
///
/// `.csv`/`.txt` are read as comma-separated text, `.json` as an array of
/// row objects, and workbook formats through their first worksheet.
pub fn read_sheet(path: &Path) -> Result<Sheet> {
    check_file_size(path)?;
    validate_encoding(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let sheet = match extension.as_str() {
        "csv" | "txt" => read_csv_sheet(path)?,
        "json" => read_json_sheet(path)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook_sheet(path)?,
        _ => {
            return Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            });
        }
    };
    tracing::debug!(
        path = %path.display(),
        columns = sheet.headers.len(),
        rows = sheet.rows.len(),
        "sheet loaded"
    );
    Ok(sheet)
}

/// Check file size before loading.
pub fn check_file_size(path: &Path) -> Result<()> {
    check_file_size_with_limit(path, MAX_SHEET_FILE_SIZE)
}

/// Check file size against a custom limit.
pub fn check_file_size_with_limit(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| open_error(path, e))?;
    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }
    Ok(())
}

/// Rejects UTF-16 exports (UTF-8 with or without BOM is fine).
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| open_error(path, e))?;
    let mut buffer = [0u8; 2];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    if bytes_read == 2 {
        if buffer == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }
    Ok(())
}

/// Trims, strips a BOM, and collapses inner whitespace of a header label.
pub(crate) fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
