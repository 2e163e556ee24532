//! Spreadsheet ingestion for the reconciliation engine.
//!
//! This crate turns a spreadsheet export into schema-less rows and resolves
//! logical fields out of them without agreeing on a fixed header schema.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use plotline_ingest::{RowLookup, read_sheet};
//!
//! let sheet = read_sheet(Path::new("exports/march.csv"))?;
//! for row in &sheet.rows {
//!     let lookup = RowLookup::new(row);
//!     let plot = lookup.resolve(&["plotNumber", "plot"]);
//! }
//! ```

mod error;
mod resolve;
mod row;
mod sheet;

// === Error Types ===
pub use error::{IngestError, Result};

// === Rows ===
pub use row::{Cell, RawRow};

// === Field Resolution ===
pub use resolve::{RowLookup, normalize_label, resolve};

// === Sheet Loading ===
pub use sheet::{
    MAX_SHEET_FILE_SIZE, Sheet, check_file_size, check_file_size_with_limit,
    read_csv_from_reader, read_csv_sheet, read_json_from_str, read_json_sheet, read_sheet,
    read_workbook_sheet, validate_encoding,
};
