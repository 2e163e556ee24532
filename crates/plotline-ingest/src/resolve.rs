//! Tolerant column resolution.
//!
//! Exports from different source systems (and different years of the same
//! system) spell headers differently: `Plot No.`, `plot_number`, `PlotNumber`.
//! Labels are compared in a compact form so any of those match the logical
//! field `plotNumber`.
//!
//! Resolution rules:
//! - candidates are tried in order, most preferred first;
//! - a column whose cell is [`Cell::Null`] is skipped, as is an absent column;
//! - a present cell holding empty text is a found value: resolution stops and
//!   returns `""`;
//! - when two source columns compact to the same key, the left-most wins.

use std::collections::HashMap;

use crate::row::{Cell, RawRow};

/// Compacts a label: ASCII letters and digits only, lower-cased.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

/// Index of one row's columns keyed by compacted label.
///
/// Build once per row when resolving several fields.
#[derive(Debug)]
pub struct RowLookup<'a> {
    by_key: HashMap<String, &'a Cell>,
}

impl<'a> RowLookup<'a> {
    pub fn new(row: &'a RawRow) -> Self {
        let mut by_key = HashMap::with_capacity(row.len());
        for (label, cell) in row.iter() {
            let key = normalize_label(label);
            if key.is_empty() {
                continue;
            }
            by_key.entry(key).or_insert(cell);
        }
        Self { by_key }
    }

    /// Trimmed value of the first candidate present with a non-null cell.
    pub fn resolve(&self, candidates: &[&str]) -> String {
        self.find(candidates).unwrap_or_default()
    }

    /// Like [`RowLookup::resolve`] but distinguishes "no column matched".
    pub fn find(&self, candidates: &[&str]) -> Option<String> {
        candidates.iter().find_map(|candidate| {
            let cell = self.by_key.get(&normalize_label(candidate))?;
            cell.as_text().map(|text| text.trim().to_string())
        })
    }
}

/// Resolves one logical field from a row.
pub fn resolve(row: &RawRow, candidates: &[&str]) -> String {
    RowLookup::new(row).resolve(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Plot No."), "plotno");
        assert_eq!(normalize_label("plot_number"), "plotnumber");
        assert_eq!(normalize_label("  Reference-Number "), "referencenumber");
        assert_eq!(normalize_label("Zoné"), "zon");
    }

    #[test]
    fn header_spelling_is_tolerated() {
        let row = RawRow::from_pairs([("Plot Number ", " 123A ")]);
        assert_eq!(resolve(&row, &["plotNumber"]), "123A");
        assert_eq!(resolve(&row, &["plot_number"]), "123A");
    }

    #[test]
    fn candidates_are_tried_in_order() {
        let row = RawRow::from_pairs([("Plot", "P-1"), ("Plot Number", "P-2")]);
        assert_eq!(resolve(&row, &["plotNumber", "plot"]), "P-2");
        assert_eq!(resolve(&row, &["plot", "plotNumber"]), "P-1");
    }

    #[test]
    fn empty_text_stops_resolution() {
        let row = RawRow::from_pairs([("Plot Number", ""), ("Plot", "P-1")]);
        assert_eq!(resolve(&row, &["plotNumber", "plot"]), "");
        assert_eq!(
            RowLookup::new(&row).find(&["plotNumber", "plot"]),
            Some(String::new())
        );
    }

    #[test]
    fn null_cell_falls_through() {
        let mut row = RawRow::default();
        row.push("Plot Number", Cell::Null);
        row.push("Plot", Cell::from("P-1"));
        assert_eq!(resolve(&row, &["plotNumber", "plot"]), "P-1");
    }

    #[test]
    fn absent_column_falls_through() {
        let row = RawRow::from_pairs([("Plot", "P-1")]);
        assert_eq!(resolve(&row, &["plotNumber", "plot"]), "P-1");
        assert_eq!(RowLookup::new(&row).find(&["zone"]), None);
        assert_eq!(resolve(&row, &["zone"]), "");
    }

    #[test]
    fn first_colliding_column_wins() {
        let row = RawRow::from_pairs([("Plot-No", "first"), ("plot no", "second")]);
        assert_eq!(resolve(&row, &["plotNo"]), "first");
    }

    #[test]
    fn numbers_are_stringified() {
        let row = RawRow::from_pairs([("Account", Cell::Number(99812.0))]);
        assert_eq!(resolve(&row, &["account"]), "99812");
    }
}
