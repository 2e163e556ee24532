//! Schema-less spreadsheet rows.

use std::fmt;

/// A single scalar cell as exported by the source system.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// No value at all: a missing trailing CSV field or a JSON `null`.
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// String form of the cell, or `None` for [`Cell::Null`].
    ///
    /// Integral numbers render without a fractional part so that a plot
    /// exported as `1042` and one exported as `1042.0` compare equal.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Text(value) => Some(value.clone()),
            Cell::Number(value) => Some(format_number(*value)),
            Cell::Bool(value) => Some(value.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => f.write_str(&text),
            None => Ok(()),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// One data row: source column labels paired with their cells, in sheet order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    /// 1-based line in the source file, 0 when unknown.
    pub line: usize,
    cells: Vec<(String, Cell)>,
}

impl RawRow {
    pub fn new(line: usize, cells: Vec<(String, Cell)>) -> Self {
        Self { line, cells }
    }

    /// Builds a row from label/value pairs, mostly for tests and fixtures.
    pub fn from_pairs<L, V>(pairs: impl IntoIterator<Item = (L, V)>) -> Self
    where
        L: Into<String>,
        V: Into<Cell>,
    {
        Self {
            line: 0,
            cells: pairs
                .into_iter()
                .map(|(label, value)| (label.into(), value.into()))
                .collect(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, cell: Cell) {
        self.cells.push((label.into(), cell));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(label, cell)| (label.as_str(), cell))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns true if every cell is null or blank text.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, cell)| match cell {
            Cell::Null => true,
            Cell::Text(text) => text.trim().is_empty(),
            Cell::Number(_) | Cell::Bool(_) => false,
        })
    }
}
