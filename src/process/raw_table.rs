use std::fmt;

/// One field of a parsed feed. Delimited text only ever yields `Text`;
/// workbooks keep native numbers as `Number`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Text(String::new())
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl PartialEq<&str> for Cell {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Cell::Text(s) if s == other)
    }
}

/// Text form; integral numbers print without a fractional part.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

/// A parsed feed before any normalization: header names plus every data row,
/// in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Column names from the first row of the sheet / CSV.
    pub headers: Vec<String>,
    /// Data rows, each padded to `headers.len()` fields.
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Build a table, padding short rows with empty text.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                if r.len() < width {
                    r.resize(width, Cell::default());
                }
                r
            })
            .collect();
        RawTable { headers, rows }
    }

    /// Position of the column named exactly `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}
