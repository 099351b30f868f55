// ============================================================
// Layer 3 — Label Schema and Label Matrix
// ============================================================
// LabelSchema is the ordered list of category names. It is
// derived once from the first packed label string and every
// later row is checked against it, so a row with a different
// layout is rejected instead of silently shifting columns.
//
// LabelMatrix holds one small class id per (row, label). After
// cleaning the values are 0/1, but the type does not assume it.

use serde::{Deserialize, Serialize};

/// Ordered category names shared by every row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSchema {
    names: Vec<String>,
}

impl LabelSchema {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Index of the first name that appears more than once.
    pub fn first_duplicate(&self) -> Option<usize> {
        self.names
            .iter()
            .enumerate()
            .find(|(i, name)| self.names[..*i].contains(name))
            .map(|(i, _)| i)
    }
}

/// Row-major `n_samples × n_labels` matrix of class ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMatrix {
    names: Vec<String>,
    rows:  Vec<Vec<u8>>,
}

impl LabelMatrix {
    pub fn new(names: Vec<String>, rows: Vec<Vec<u8>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == names.len()));
        Self { names, rows }
    }

    /// Build from per-label columns (each `n_samples` long).
    #[cfg(test)]
    pub fn from_columns(names: Vec<String>, columns: Vec<Vec<u8>>) -> Self {
        let n_samples = columns.first().map_or(0, Vec::len);
        let rows = (0..n_samples)
            .map(|i| columns.iter().map(|col| col[i]).collect())
            .collect();
        Self::new(names, rows)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    pub fn n_samples(&self) -> usize {
        self.rows.len()
    }

    pub fn n_labels(&self) -> usize {
        self.names.len()
    }

    pub fn column(&self, label: usize) -> Vec<u8> {
        self.rows.iter().map(|row| row[label]).collect()
    }

    /// Rows picked by index, in the given order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            rows:  indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Names of the labels set (non-zero) in one row.
    pub fn active_labels(&self, row: usize) -> Vec<&str> {
        self.names
            .iter()
            .zip(&self.rows[row])
            .filter(|(_, &v)| v != 0)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
