// ============================================================
// Layer 6 — Metrics Report Writer
// ============================================================
// Records the outcome of a training run as one JSON file next
// to the model, so a run can be inspected without reloading
// the model.
//
// What gets recorded:
//   - config:       the run's configuration, serialised as the
//                   caller's own type (the report is generic
//                   over it so this layer never names it)
//   - n_train/test: size of each side of the split
//   - best_n_trees: the tree count the grid search picked
//   - search:       per-candidate fold scores, mean and std
//   - evaluation:   per-label classification reports on the
//                   held-out rows
//
// File naming convention:
//   models/
//     classifier.bin               ← the model blob
//     classifier.bin.report.json   ← this report
//
// Reference: Rust Book §12 (I/O and File Handling)
//            serde_json documentation

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, Result, Stage};
use crate::ml::evaluator::EvaluationReport;
use crate::ml::search::CandidateScore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport<C> {
    pub config:       C,
    pub n_train:      usize,
    pub n_test:       usize,
    pub best_n_trees: usize,
    pub search:       Vec<CandidateScore>,
    pub evaluation:   EvaluationReport,
}

/// `<model>.report.json`
pub fn report_path_for(model: &Path) -> PathBuf {
    let mut name = model.as_os_str().to_owned();
    name.push(".report.json");
    PathBuf::from(name)
}

pub struct MetricsWriter {
    path: PathBuf,
}

impl MetricsWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_err(&self, e: impl Into<crate::domain::error::BoxError>) -> PipelineError {
        PipelineError::io(Stage::Report, self.path.display().to_string(), e)
    }

    /// Overwrite the report file with `report`.
    pub fn write<C: Serialize>(&self, report: &TrainingReport<C>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        // to_string_pretty keeps the file readable in a diff
        let json = serde_json::to_string_pretty(report).map_err(|e| self.io_err(e))?;
        fs::write(&self.path, json).map_err(|e| self.io_err(e))?;

        tracing::info!("Wrote training report to '{}'", self.path.display());
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::evaluator::{ClassificationReport, LabelReport};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct RunSettings {
        test_size: f64,
        seed:      u64,
    }

    fn report() -> TrainingReport<RunSettings> {
        TrainingReport {
            config:       RunSettings { test_size: 0.2, seed: 42 },
            n_train:      8,
            n_test:       2,
            best_n_trees: 20,
            search: vec![CandidateScore { n_trees: 20, fold_scores: vec![0.5, 1.0], mean: 0.75, std: 0.25 }],
            evaluation: EvaluationReport {
                n_samples: 2,
                labels: vec![LabelReport {
                    label:  "related".into(),
                    report: ClassificationReport::compute(&[1, 0], &[1, 0]),
                }],
            },
        }
    }

    #[test]
    fn test_report_path_appends_suffix() {
        assert_eq!(
            report_path_for(Path::new("models/classifier.bin")),
            PathBuf::from("models/classifier.bin.report.json")
        );
    }

    #[test]
    fn test_write_creates_parent_and_round_trips_any_config() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("r").join("report.json");
        MetricsWriter::new(&path).write(&report()).unwrap();

        let json = fs::read_to_string(&path).unwrap();
        let back: TrainingReport<RunSettings> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.config, RunSettings { test_size: 0.2, seed: 42 });
        assert_eq!(back.best_n_trees, 20);
        assert_eq!(back.search, report().search);
        assert_eq!(back.evaluation, report().evaluation);
    }

    #[test]
    fn test_json_names_fields() {
        let json = serde_json::to_string(&report()).unwrap();
        assert!(json.contains("\"best_n_trees\":20"));
        assert!(json.contains("\"weighted_avg\""));
        assert!(json.contains("\"test_size\":0.2"));
    }

    #[test]
    fn test_config_may_be_untyped_json() {
        let untyped = TrainingReport {
            config:       serde_json::json!({ "folds": 5 }),
            n_train:      8,
            n_test:       2,
            best_n_trees: 5,
            search:       Vec::new(),
            evaluation:   EvaluationReport { n_samples: 0, labels: Vec::new() },
        };
        let json = serde_json::to_string(&untyped).unwrap();
        assert!(json.starts_with("{\"config\":{\"folds\":5}"));
    }
}
