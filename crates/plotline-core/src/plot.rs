//! Plot identifier normalization.
//!
//! The canonical form is the trimmed text, case preserved. Exact lookups
//! (import dedup, fee resolution) compare canonical forms case-sensitively;
//! only the free-text ledger search compares case-insensitively, and it does
//! so inside the store.

use plotline_ingest::Cell;

/// Canonical join key for a plot identifier.
pub fn normalize_plot(value: &str) -> String {
    value.trim().to_string()
}

/// Canonical key for any scalar cell; null becomes empty.
pub fn normalize_plot_cell(cell: &Cell) -> String {
    cell.as_text()
        .map(|text| normalize_plot(&text))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_but_keeps_case() {
        assert_eq!(normalize_plot("  55b "), "55b");
        assert_eq!(normalize_plot("55B"), "55B");
    }

    #[test]
    fn cells_of_any_kind() {
        assert_eq!(normalize_plot_cell(&Cell::Null), "");
        assert_eq!(normalize_plot_cell(&Cell::Number(1042.0)), "1042");
        assert_eq!(normalize_plot_cell(&Cell::from(" 7/A ")), "7/A");
    }
}
