use serde::Serialize;

/// A raw cell value, as given by the source file.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The numeric value, if this cell already holds a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// The text value, if this cell holds text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Best-effort numeric coercion. Anything that does not parse as a
    /// number becomes `0.0`; this never fails.
    pub fn coerce_number(&self) -> f64 {
        match self {
            Cell::Empty => 0.0,
            Cell::Number(value) => *value,
            Cell::Text(value) => value.trim().parse().unwrap_or(0.0),
            Cell::Bool(value) => {
                if *value {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// String form of the cell used as a grouping key. Blank cells key on
    /// the empty string; whole numbers drop the trailing `.0`.
    pub fn group_key(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    format!("{}", *value as i64)
                } else {
                    value.to_string()
                }
            }
            Cell::Text(value) => value.clone(),
            Cell::Bool(value) => value.to_string(),
        }
    }
}

/// An ordered table: header row plus data rows.
///
/// Header names are trimmed and lower-cased on construction, so every later
/// stage sees one canonical spelling. Tables are plain values; each pipeline
/// stage returns a new one instead of mutating its input.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers: headers
                .into_iter()
                .map(|header| header.trim().to_lowercase())
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of data rows (the header row is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by its canonical (trimmed, lower-cased) name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }
}
