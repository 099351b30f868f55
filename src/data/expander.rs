// ============================================================
// Layer 4 — Label Expander
// ============================================================
// Turns the packed `categories` column into one integer column
// per category, then cleans the rows.
//
//   categories = "related-1;request-0;offer-0"
//           │
//           ▼
//   related = 1, request = 0, offer = 0
//
// Steps (applied in order):
//   1. Split every packed string on ';'
//   2. Derive the LabelSchema from row 0 (token minus "-<digit>")
//   3. Check every row against the schema, parse the digit
//   4. Drop `categories`, append the label columns
//   5. Drop exact-duplicate rows (first occurrence wins)
//   6. Drop rows where `related == 2`
//
// A row whose tokens do not line up with row 0 is rejected with
// a Format error instead of being read into the wrong columns.

use std::collections::HashSet;

use crate::domain::error::{PipelineError, Result, Stage};
use crate::domain::labels::LabelSchema;
use crate::domain::table::{Table, Value};

pub const CATEGORIES_COLUMN: &str = "categories";
pub const RELATED_COLUMN:    &str = "related";

const SEPARATOR: char = ';';

/// Value of `related` that marks a row as unusable.
const AMBIGUOUS_RELATED: i64 = 2;

pub struct LabelExpander;

impl LabelExpander {
    pub fn new() -> Self {
        Self
    }

    /// Run all six steps and return the cleaned table with its schema.
    pub fn clean(&self, table: Table) -> Result<(Table, LabelSchema)> {
        let before = table.len();
        let (expanded, schema) = self.expand(table)?;
        let deduped = drop_duplicates(expanded);
        let dupes   = before - deduped.len();
        let cleaned = drop_ambiguous_related(deduped)?;

        tracing::info!(
            "Expanded {} categories; dropped {} duplicate and {} ambiguous rows ({} remain)",
            schema.len(),
            dupes,
            before - dupes - cleaned.len(),
            cleaned.len()
        );
        Ok((cleaned, schema))
    }

    /// Steps 1–4: replace the packed column with integer label columns.
    pub fn expand(&self, table: Table) -> Result<(Table, LabelSchema)> {
        let packed_idx = table.column_index(CATEGORIES_COLUMN).ok_or_else(|| {
            PipelineError::schema(Stage::Expand, format!("table has no '{CATEGORIES_COLUMN}' column"))
        })?;

        let first = table.rows().first().ok_or_else(|| {
            PipelineError::format(Stage::Expand, "cannot derive category names from an empty table", "")
        })?;
        let schema = derive_schema(packed_text(&first[packed_idx], 0)?)?;

        let (columns, rows) = table.into_parts();

        let mut out_columns: Vec<String> = columns
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != packed_idx)
            .map(|(_, c)| c)
            .collect();
        if let Some(clash) = schema.names().iter().find(|n| out_columns.contains(n)) {
            return Err(PipelineError::format(
                Stage::Expand,
                "category name collides with an existing column",
                clash.clone(),
            ));
        }
        out_columns.extend(schema.names().iter().cloned());

        let mut out_rows = Vec::with_capacity(rows.len());
        for (row_idx, mut row) in rows.into_iter().enumerate() {
            let packed = row.remove(packed_idx);
            let values = parse_row(&schema, packed_text(&packed, row_idx)?, row_idx)?;
            row.extend(values.into_iter().map(Value::Integer));
            out_rows.push(row);
        }

        Ok((Table::new(out_columns, out_rows), schema))
    }
}

impl Default for LabelExpander {
    fn default() -> Self {
        Self::new()
    }
}

fn packed_text(cell: &Value, row_idx: usize) -> Result<&str> {
    match cell {
        Value::Text(s) => Ok(s),
        other => Err(PipelineError::format(
            Stage::Expand,
            format!("row {row_idx} has no packed category string"),
            other.to_string(),
        )),
    }
}

/// Split off the trailing "-<digit>" of one token.
fn split_token(token: &str) -> Option<(&str, char)> {
    let mut tail = token.char_indices().rev();
    let (digit_at, digit) = tail.next()?;
    let (dash_at, _) = tail.next()?;
    debug_assert!(dash_at < digit_at);
    Some((&token[..dash_at], digit))
}

/// Category names from the first packed string.
pub fn derive_schema(packed: &str) -> Result<LabelSchema> {
    let names = packed
        .split(SEPARATOR)
        .map(|token| {
            split_token(token)
                .map(|(name, _)| name.to_string())
                .ok_or_else(|| PipelineError::format(Stage::Expand, "category token is too short", token))
        })
        .collect::<Result<Vec<_>>>()?;

    let schema = LabelSchema::new(names);
    if let Some(dup) = schema.first_duplicate() {
        return Err(PipelineError::format(
            Stage::Expand,
            "category name appears twice",
            schema.names()[dup].clone(),
        ));
    }
    Ok(schema)
}

/// Parse one packed string, checking it against the schema.
pub fn parse_row(schema: &LabelSchema, packed: &str, row_idx: usize) -> Result<Vec<i64>> {
    let tokens: Vec<&str> = packed.split(SEPARATOR).collect();
    if tokens.len() != schema.len() {
        return Err(PipelineError::format(
            Stage::Expand,
            format!("row {row_idx} has {} categories, expected {}", tokens.len(), schema.len()),
            packed,
        ));
    }

    tokens
        .iter()
        .zip(schema.names())
        .map(|(token, expected)| {
            let (name, digit) = split_token(token).ok_or_else(|| {
                PipelineError::format(Stage::Expand, format!("row {row_idx}: category token is too short"), *token)
            })?;
            if name != expected {
                return Err(PipelineError::format(
                    Stage::Expand,
                    format!("row {row_idx}: expected category '{expected}'"),
                    *token,
                ));
            }
            digit.to_digit(10).map(i64::from).ok_or_else(|| {
                PipelineError::format(Stage::Expand, format!("row {row_idx}: category value is not numeric"), *token)
            })
        })
        .collect()
}

/// Keep the first occurrence of every exact-duplicate row.
pub fn drop_duplicates(table: Table) -> Table {
    let (columns, rows) = table.into_parts();
    let mut seen = HashSet::with_capacity(rows.len());
    let rows = rows.into_iter().filter(|row| seen.insert(row.clone())).collect();
    Table::new(columns, rows)
}

/// Remove rows whose `related` label is 2.
pub fn drop_ambiguous_related(table: Table) -> Result<Table> {
    let idx = table.column_index(RELATED_COLUMN).ok_or_else(|| {
        PipelineError::schema(Stage::Expand, format!("table has no '{RELATED_COLUMN}' column"))
    })?;
    let (columns, rows) = table.into_parts();
    let rows = rows
        .into_iter()
        .filter(|row| row[idx].as_integer() != Some(AMBIGUOUS_RELATED))
        .collect();
    Ok(Table::new(columns, rows))
}
