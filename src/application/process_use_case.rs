// ============================================================
// Layer 2 — ProcessUseCase
// ============================================================
// Builds the cleaned dataset from the two raw CSV files:
//
//   Step 1: Load and outer-join the CSVs   (Layer 4 - data)
//   Step 2: Expand and clean the labels    (Layer 4 - data)
//   Step 3: Replace the SQLite relation    (Layer 6 - infra)

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{expander::LabelExpander, loader::load_merged};
use crate::infra::table_store::{TableStore, RELATION};

// ─── Process Configuration ───────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    pub messages:   PathBuf,
    pub categories: PathBuf,
    pub database:   PathBuf,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            messages:   PathBuf::from("data/disaster_messages.csv"),
            categories: PathBuf::from("data/disaster_categories.csv"),
            database:   PathBuf::from("data/DisasterResponse.db"),
        }
    }
}

/// What the CLI reports after a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSummary {
    pub rows:   usize,
    pub labels: Vec<String>,
}

pub struct ProcessUseCase {
    config: ProcessConfig,
}

impl ProcessUseCase {
    pub fn new(config: ProcessConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<ProcessSummary> {
        let cfg = &self.config;

        // ── Step 1: Load and merge ────────────────────────────────────────────
        tracing::info!(
            "Loading messages '{}' and categories '{}'",
            cfg.messages.display(),
            cfg.categories.display()
        );
        let merged = load_merged(&cfg.messages, &cfg.categories).context("loading source data")?;

        // ── Step 2: Expand and clean ──────────────────────────────────────────
        let (cleaned, schema) = LabelExpander::new().clean(merged).context("cleaning data")?;

        // ── Step 3: Save ──────────────────────────────────────────────────────
        TableStore::new(&cfg.database)
            .save(&cleaned, RELATION)
            .context("saving cleaned data")?;

        Ok(ProcessSummary { rows: cleaned.len(), labels: schema.names().to_vec() })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::error::{ErrorKind, PipelineError};
    use std::path::Path;

    /// Ten messages, two of them duplicated and one with related=2.
    pub(crate) fn write_sources(dir: &Path) -> ProcessConfig {
        let messages = dir.join("messages.csv");
        let categories = dir.join("categories.csv");

        let texts = [
            "flood in city",
            "we need water and food",
            "houses were flooded by the river",
            "the weather is nice",
            "please send help to the children",
            "nothing happening today",
            "earthquake destroyed the hospital",
            "a quiet market day",
            "people are trapped after the storm",
            "enjoying the sunshine",
        ];
        let mut m = String::from("id,message,original,genre\n");
        let mut c = String::from("id,categories\n");
        for (i, text) in texts.iter().enumerate() {
            let id = i + 1;
            let related = u8::from(i % 2 == 0 || i == 1);
            let request = u8::from(i == 1 || i == 4);
            m.push_str(&format!("{id},{text},,direct\n"));
            c.push_str(&format!("{id},related-{related};request-{request};offer-0\n"));
        }
        // exact duplicate of id 1 and an ambiguous row
        m.push_str("1,flood in city,,direct\n");
        m.push_str("11,unclear message,,news\n");
        c.push_str("11,related-2;request-0;offer-0\n");

        std::fs::write(&messages, m).unwrap();
        std::fs::write(&categories, c).unwrap();

        ProcessConfig { messages, categories, database: dir.join("db.sqlite") }
    }

    #[test]
    fn test_process_writes_cleaned_relation() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = write_sources(dir.path());

        let summary = ProcessUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(summary.labels, vec!["related", "request", "offer"]);
        assert_eq!(summary.rows, 10);

        let table = TableStore::new(&cfg.database).load(RELATION).unwrap();
        assert_eq!(table.len(), 10);
        assert_eq!(table.columns().last().map(String::as_str), Some("offer"));
        assert!(table.column_index("categories").is_none());
    }

    #[test]
    fn test_missing_source_keeps_pipeline_error_kind() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ProcessConfig {
            messages:   dir.path().join("none.csv"),
            categories: dir.path().join("none.csv"),
            database:   dir.path().join("db.sqlite"),
        };
        let err = ProcessUseCase::new(cfg).execute().unwrap_err();
        let kind = err.downcast_ref::<PipelineError>().map(PipelineError::kind);
        assert_eq!(kind, Some(ErrorKind::Io));
    }
}
