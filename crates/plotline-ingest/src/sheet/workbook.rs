//! Workbook exports (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`).

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use super::{Sheet, normalize_header};
use crate::error::{IngestError, Result};
use crate::row::{Cell, RawRow};

/// Reads the first worksheet of a workbook. Its first used row is the
/// header row; later worksheets are ignored.
///
/// Empty workbook cells become [`Cell::Null`]: the file has no value
/// there at all, unlike an empty CSV field.
pub fn read_workbook_sheet(path: &Path) -> Result<Sheet> {
    let workbook_error = |message: String| IngestError::Workbook {
        path: path.to_path_buf(),
        message,
    };
    let mut workbook = open_workbook_auto(path).map_err(|err| workbook_error(err.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| workbook_error("workbook has no worksheets".to_string()))?
        .map_err(|err| workbook_error(err.to_string()))?;

    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row
            .iter()
            .map(|data| normalize_header(&cell_from(data).as_text().unwrap_or_default()))
            .collect(),
        None => Vec::new(),
    };
    if headers.iter().all(String::is_empty) {
        return Err(IngestError::EmptySheet {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    let mut skipped_blank = 0usize;
    for (offset, data) in rows_iter.enumerate() {
        // 1-based sheet line: header is `first_row + 1`.
        let line = first_row + offset + 2;
        let cells = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| (header.clone(), data.get(idx).map_or(Cell::Null, cell_from)))
            .collect();
        let row = RawRow::new(line, cells);
        if row.is_blank() {
            skipped_blank += 1;
            continue;
        }
        rows.push(row);
    }
    if skipped_blank > 0 {
        tracing::debug!(source = %path.display(), skipped_blank, "skipped blank rows");
    }
    Ok(Sheet { headers, rows })
}

fn cell_from(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Null,
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            Cell::Text(text.clone())
        }
        Data::Float(value) => Cell::Number(*value),
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Bool(flag) => Cell::Bool(*flag),
        // Rendered as `YYYY-MM-DD HH:MM:SS`, which timestamp parsing accepts.
        Data::DateTime(stamp) => stamp
            .as_datetime()
            .map_or_else(|| Cell::Number(stamp.as_f64()), |dt| Cell::Text(dt.to_string())),
    }
}
