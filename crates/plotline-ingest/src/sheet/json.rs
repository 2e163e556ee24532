//! JSON row exports (an array of objects, one per row).

use std::path::Path;

use serde_json::Value;

use super::{Sheet, normalize_header};
use crate::error::{IngestError, Result, open_error};
use crate::row::{Cell, RawRow};

pub fn read_json_sheet(path: &Path) -> Result<Sheet> {
    let text = std::fs::read_to_string(path).map_err(|e| open_error(path, e))?;
    read_json_from_str(&text, path)
}

/// Parses a JSON array of row objects.
///
/// Headers are the union of object keys in order of first appearance.
/// Nested arrays/objects are kept as their JSON text.
pub fn read_json_from_str(text: &str, source: &Path) -> Result<Sheet> {
    let value: Value = serde_json::from_str(text).map_err(|err| IngestError::JsonParse {
        path: source.to_path_buf(),
        message: err.to_string(),
    })?;
    let Value::Array(items) = value else {
        return Err(IngestError::JsonShape {
            path: source.to_path_buf(),
            reason: "expected a top-level array of row objects".to_string(),
        });
    };

    let mut headers: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        let Value::Object(object) = item else {
            return Err(IngestError::JsonShape {
                path: source.to_path_buf(),
                reason: format!("row {} is not an object", idx + 1),
            });
        };
        let mut row = RawRow::new(idx + 1, Vec::with_capacity(object.len()));
        for (key, value) in object {
            let label = normalize_header(&key);
            if !headers.contains(&label) {
                headers.push(label.clone());
            }
            row.push(label, json_cell(value));
        }
        if !row.is_blank() {
            rows.push(row);
        }
    }
    Ok(Sheet { headers, rows })
}

fn json_cell(value: Value) -> Cell {
    match value {
        Value::Null => Cell::Null,
        Value::Bool(flag) => Cell::Bool(flag),
        Value::Number(number) => number
            .as_f64()
            .map_or_else(|| Cell::Text(number.to_string()), Cell::Number),
        Value::String(text) => Cell::Text(text),
        nested @ (Value::Array(_) | Value::Object(_)) => Cell::Text(nested.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve;

    #[test]
    fn reads_rows_with_typed_cells() {
        let sheet = read_json_from_str(
            r#"[{"plot_number": 1042, "owner": null, "Owner Name": "K. Phiri"}]"#,
            Path::new("inline.json"),
        )
        .expect("read json");
        assert_eq!(sheet.rows.len(), 1);
        let row = &sheet.rows[0];
        assert_eq!(resolve(row, &["plotNumber"]), "1042");
        assert_eq!(resolve(row, &["owner", "ownerName"]), "K. Phiri");
    }

    #[test]
    fn rejects_non_array() {
        let err = read_json_from_str(r#"{"rows": []}"#, Path::new("x.json")).unwrap_err();
        assert!(matches!(err, IngestError::JsonShape { .. }));
    }

    #[test]
    fn rejects_scalar_rows() {
        let err = read_json_from_str("[1, 2]", Path::new("x.json")).unwrap_err();
        assert!(matches!(err, IngestError::JsonShape { .. }));
    }
}
