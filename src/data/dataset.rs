// ============================================================
// Layer 4 — Training Dataset
// ============================================================
// Splits the cleaned table into what the classifier consumes:
//
//   documents: the `message` column as text
//   labels   : every other column except id/original/genre
//
// Label cells must be small non-negative integers; anything
// else means the table was not produced by the expander.

use crate::domain::error::{PipelineError, Result, Stage};
use crate::domain::labels::LabelMatrix;
use crate::domain::table::{Table, Value};

pub const MESSAGE_COLUMN: &str = "message";

/// Columns that are never labels.
const NON_LABEL_COLUMNS: &[&str] = &["id", MESSAGE_COLUMN, "original", "genre"];

#[derive(Debug, Clone)]
pub struct CategorizedMessages {
    pub documents: Vec<String>,
    pub labels:    LabelMatrix,
}

impl CategorizedMessages {
    pub fn new(documents: Vec<String>, labels: LabelMatrix) -> Self {
        debug_assert_eq!(documents.len(), labels.n_samples());
        Self { documents, labels }
    }

    pub fn from_table(table: &Table) -> Result<Self> {
        let msg_idx = table.column_index(MESSAGE_COLUMN).ok_or_else(|| {
            PipelineError::schema(Stage::Dataset, format!("table has no '{MESSAGE_COLUMN}' column"))
        })?;

        let label_idx: Vec<usize> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, name)| !NON_LABEL_COLUMNS.contains(&name.as_str()))
            .map(|(i, _)| i)
            .collect();
        let names: Vec<String> = label_idx.iter().map(|&i| table.columns()[i].clone()).collect();

        let mut documents = Vec::with_capacity(table.len());
        let mut rows      = Vec::with_capacity(table.len());
        for (row_idx, row) in table.rows().iter().enumerate() {
            let text = row[msg_idx].to_text().ok_or_else(|| {
                PipelineError::format(Stage::Dataset, format!("row {row_idx} has no message"), "NULL")
            })?;
            documents.push(text);

            let labels = label_idx
                .iter()
                .map(|&i| label_value(&row[i], &table.columns()[i], row_idx))
                .collect::<Result<Vec<u8>>>()?;
            rows.push(labels);
        }

        tracing::debug!("Dataset: {} messages, {} labels", documents.len(), names.len());
        Ok(Self::new(documents, LabelMatrix::new(names, rows)))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Rows picked by index, in the given order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            documents: indices.iter().map(|&i| self.documents[i].clone()).collect(),
            labels:    self.labels.select(indices),
        }
    }
}

fn label_value(cell: &Value, column: &str, row_idx: usize) -> Result<u8> {
    cell.as_integer()
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| {
            PipelineError::format(
                Stage::Dataset,
                format!("row {row_idx}: label '{column}' is not a small integer"),
                cell.to_string(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;

    fn cleaned() -> Table {
        Table::new(
            ["id", "message", "original", "genre", "related", "request"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            vec![
                vec![1.into(), "flood in city".into(), Value::Null, "direct".into(), 1.into(), 0.into()],
                vec![2.into(), "all quiet".into(), Value::Null, "news".into(), 0.into(), 0.into()],
            ],
        )
    }

    #[test]
    fn test_splits_messages_from_labels() {
        let data = CategorizedMessages::from_table(&cleaned()).unwrap();
        assert_eq!(data.documents, vec!["flood in city", "all quiet"]);
        assert_eq!(data.labels.names(), &["related", "request"]);
        assert_eq!(data.labels.rows(), &[vec![1, 0], vec![0, 0]]);
    }

    #[test]
    fn test_select_keeps_rows_aligned() {
        let data = CategorizedMessages::from_table(&cleaned()).unwrap().select(&[1]);
        assert_eq!(data.documents, vec!["all quiet"]);
        assert_eq!(data.labels.rows(), &[vec![0, 0]]);
    }

    #[test]
    fn test_text_label_is_format_error() {
        let table = Table::new(
            vec!["message".into(), "related".into()],
            vec![vec!["hi".into(), "yes".into()]],
        );
        let err = CategorizedMessages::from_table(&table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_missing_message_is_schema_error() {
        let table = Table::new(vec!["related".into()], vec![vec![1.into()]]);
        let err = CategorizedMessages::from_table(&table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }
}
