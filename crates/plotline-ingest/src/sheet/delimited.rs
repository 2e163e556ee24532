//! Comma-separated exports.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use super::{Sheet, normalize_header};
use crate::error::{IngestError, Result, open_error};
use crate::row::{Cell, RawRow};

/// Reads a CSV export. The first record is the header row.
pub fn read_csv_sheet(path: &Path) -> Result<Sheet> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    read_csv_from_reader(file, path)
}

/// Reads CSV from any reader; `source` is only used in errors and logs.
///
/// Short records are padded with [`Cell::Null`] so a trailing missing field
/// is distinguishable from an empty one.
pub fn read_csv_from_reader<R: Read>(reader: R, source: &Path) -> Result<Sheet> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let parse_error = |err: csv::Error| IngestError::CsvParse {
        path: source.to_path_buf(),
        message: err.to_string(),
    };

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(parse_error)?
            .iter()
            .map(normalize_header)
            .collect(),
        None => {
            return Err(IngestError::EmptySheet {
                path: source.to_path_buf(),
            });
        }
    };
    if headers.iter().all(String::is_empty) {
        return Err(IngestError::EmptySheet {
            path: source.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    let mut skipped_blank = 0usize;
    for record in records {
        let record = record.map_err(parse_error)?;
        let line = record
            .position()
            .map_or(0, |pos| usize::try_from(pos.line()).unwrap_or(usize::MAX));
        let cells = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let cell = record
                    .get(idx)
                    .map_or(Cell::Null, |value| Cell::Text(value.to_string()));
                (header.clone(), cell)
            })
            .collect();
        let row = RawRow::new(line, cells);
        if row.is_blank() {
            skipped_blank += 1;
            continue;
        }
        rows.push(row);
    }
    if skipped_blank > 0 {
        tracing::debug!(source = %source.display(), skipped_blank, "skipped blank rows");
    }
    Ok(Sheet { headers, rows })
}
