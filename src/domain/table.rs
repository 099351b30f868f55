// ============================================================
// Layer 3 — Table Domain Type
// ============================================================
// A small in-memory table: a header plus rows of typed cells.
// The same type flows through every step of the `process`
// command (CSV → join → expand → SQLite) and comes back out of
// the SQLite store for the `train` command.
//
// Cells are deliberately few-typed. The datasets only carry
// integer ids/labels and free text, and SQLite stores both
// natively.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One table cell.
///
/// The derived ordering (`Null < Integer < Text`, then by content)
/// is what the outer join sorts keys by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

impl Value {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view of the cell. Integers are rendered, null has no text.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null       => None,
            Value::Integer(v) => Some(v.to_string()),
            Value::Text(s)    => Some(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null       => f.write_str("NULL"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Text(s)    => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// A header plus rows. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows:    Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of one column, top to bottom.
    #[cfg(test)]
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value> + 'a> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_ordering_puts_null_first() {
        let mut keys = vec![Value::from("b"), Value::from(2), Value::Null, Value::from(1)];
        keys.sort();
        assert_eq!(keys, vec![Value::Null, Value::from(1), Value::from(2), Value::from("b")]);
    }

    #[test]
    fn test_column_lookup() {
        let table = Table::new(
            vec!["id".into(), "message".into()],
            vec![
                vec![Value::from(1), Value::from("flood")],
                vec![Value::from(2), Value::Null],
            ],
        );
        let idx = table.column_index("message").unwrap();
        let messages: Vec<_> = table.rows().iter().map(|row| row[idx].clone()).collect();
        assert_eq!(messages, vec![Value::from("flood"), Value::Null]);
        assert!(table.column_index("missing").is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_to_text_renders_integers() {
        assert_eq!(Value::from(7).to_text().as_deref(), Some("7"));
        assert_eq!(Value::Null.to_text(), None);
    }
}
