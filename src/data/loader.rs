// ============================================================
// Layer 4 — Table Loader
// ============================================================
// Reads the two raw CSV sources and outer-joins them on `id`.
//
//   messages.csv    id,message,original,genre
//   categories.csv  id,categories
//           │
//           ▼
//   one wide table  id,message,original,genre,categories
//
// Column typing:
//   A CSV column becomes Integer when every non-empty cell in it
//   parses as an i64; otherwise it stays Text. Empty cells are
//   Null either way. This keeps `id` numeric so the join and the
//   SQLite store see the same key type on both sides.
//
// Join semantics (outer):
//   - rows are emitted in key order
//   - a key on both sides pairs every left row with every right row
//   - a key on one side fills the other side's columns with Null
//   - non-key columns present on both sides get `_x` / `_y`
//
// Reference: csv crate documentation
//            Rust Book §8 (Collections), §9 (Error Handling)

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::domain::error::{PipelineError, Result, Stage};
use crate::domain::table::{Table, Value};
use crate::domain::traits::TableSource;

/// Name of the key column shared by both sources.
pub const KEY_COLUMN: &str = "id";

/// A CSV file with a header row.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSource for CsvSource {
    fn load(&self) -> Result<Table> {
        let table = read_csv(&self.path)?;
        tracing::debug!(
            "Read {} rows × {} columns from '{}'",
            table.len(),
            table.columns().len(),
            self.path.display()
        );
        Ok(table)
    }
}

/// Load both sources and outer-join them on `id`.
pub fn load_merged(messages: &Path, categories: &Path) -> Result<Table> {
    let left  = CsvSource::new(messages).load()?;
    let right = CsvSource::new(categories).load()?;
    outer_join(&left, &right, KEY_COLUMN)
}

fn read_csv(path: &Path) -> Result<Table> {
    let io_err = |e: csv::Error| PipelineError::io(Stage::Load, path.display().to_string(), e);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(io_err)?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(io_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut raw: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(io_err)?;
        raw.push(record.iter().map(str::to_string).collect());
    }

    // A column is numeric only if all of its non-empty cells are
    let integer_columns: Vec<bool> = (0..columns.len())
        .map(|c| {
            raw.iter()
                .map(|row| row[c].as_str())
                .filter(|cell| !cell.is_empty())
                .all(|cell| cell.parse::<i64>().is_ok())
        })
        .collect();

    let rows = raw
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&integer_columns)
                .map(|(cell, &numeric)| typed_cell(cell, numeric))
                .collect()
        })
        .collect();

    Ok(Table::new(columns, rows))
}

fn typed_cell(cell: String, numeric: bool) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if numeric {
        if let Ok(v) = cell.parse::<i64>() {
            return Value::Integer(v);
        }
    }
    Value::Text(cell)
}

/// Outer join of two tables on a shared key column.
pub fn outer_join(left: &Table, right: &Table, key: &str) -> Result<Table> {
    let missing = |side: &str| {
        PipelineError::schema(
            Stage::Load,
            format!("{side} source has no '{key}' column"),
        )
    };
    let lk = left.column_index(key).ok_or_else(|| missing("left"))?;
    let rk = right.column_index(key).ok_or_else(|| missing("right"))?;

    // ── Output header ─────────────────────────────────────────────────────────
    let right_keep: Vec<usize> = (0..right.columns().len()).filter(|&i| i != rk).collect();
    let right_names: HashSet<&str> = right_keep
        .iter()
        .map(|&i| right.columns()[i].as_str())
        .collect();
    let shared: HashSet<&str> = left
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, name)| *i != lk && right_names.contains(name.as_str()))
        .map(|(_, name)| name.as_str())
        .collect();

    let mut columns: Vec<String> = left
        .columns()
        .iter()
        .map(|name| suffixed(name, &shared, "_x"))
        .collect();
    columns.extend(right_keep.iter().map(|&i| suffixed(&right.columns()[i], &shared, "_y")));

    // ── Group row indices by key ──────────────────────────────────────────────
    let mut left_groups:  BTreeMap<&Value, Vec<usize>> = BTreeMap::new();
    let mut right_groups: BTreeMap<&Value, Vec<usize>> = BTreeMap::new();
    for (i, row) in left.rows().iter().enumerate() {
        left_groups.entry(&row[lk]).or_default().push(i);
    }
    for (i, row) in right.rows().iter().enumerate() {
        right_groups.entry(&row[rk]).or_default().push(i);
    }
    let keys: BTreeSet<&Value> = left_groups.keys().chain(right_groups.keys()).copied().collect();

    // ── Emit rows in key order ────────────────────────────────────────────────
    let left_width = left.columns().len();
    let right_part = |r: Option<usize>| -> Vec<Value> {
        match r {
            Some(r) => right_keep.iter().map(|&i| right.rows()[r][i].clone()).collect(),
            None    => vec![Value::Null; right_keep.len()],
        }
    };

    let mut rows = Vec::with_capacity(left.len().max(right.len()));
    let mut matched = 0usize;
    for key_value in keys {
        match (left_groups.get(key_value), right_groups.get(key_value)) {
            (Some(ls), Some(rs)) => {
                matched += 1;
                for &l in ls {
                    for &r in rs {
                        let mut row = left.rows()[l].clone();
                        row.extend(right_part(Some(r)));
                        rows.push(row);
                    }
                }
            }
            (Some(ls), None) => {
                for &l in ls {
                    let mut row = left.rows()[l].clone();
                    row.extend(right_part(None));
                    rows.push(row);
                }
            }
            (None, Some(rs)) => {
                for &r in rs {
                    let mut row = vec![Value::Null; left_width];
                    row[lk] = key_value.clone();
                    row.extend(right_part(Some(r)));
                    rows.push(row);
                }
            }
            (None, None) => unreachable!("key came from one of the groups"),
        }
    }

    tracing::debug!("Outer join on '{}': {} matched keys, {} rows", key, matched, rows.len());
    Ok(Table::new(columns, rows))
}

fn suffixed(name: &str, shared: &HashSet<&str>, suffix: &str) -> String {
    if shared.contains(name) {
        format!("{name}{suffix}")
    } else {
        name.to_string()
    }
}
