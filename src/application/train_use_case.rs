// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the cleaned relation      (Layer 6 - infra)
//   Step 2: Extract documents + labels     (Layer 4 - data)
//   Step 3: Seeded train/test split        (Layer 4 - data)
//   Step 4: Grid search over tree counts   (Layer 5 - ml)
//   Step 5: Evaluate on the held-out rows  (Layer 5 - ml)
//   Step 6: Save the model                 (Layer 6 - infra)
//   Step 7: Write the JSON report          (Layer 6 - infra)
//
// Reference: Rust Book §13 (Iterators and Closures)

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{dataset::CategorizedMessages, splitter::split_train_test};
use crate::infra::{
    metrics::{report_path_for, MetricsWriter, TrainingReport},
    model_store::ModelStore,
    table_store::{TableStore, RELATION},
};
use crate::ml::{
    evaluator::evaluate,
    forest::ForestConfig,
    multi_output::ConstantLabelPolicy,
    pipeline::PipelineParams,
    search::GridSearch,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a training run depends on. Serialisable so it is
// written into the report next to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub database:               PathBuf,
    pub model:                  PathBuf,
    pub test_size:              f64,
    pub seed:                   u64,
    pub folds:                  usize,
    pub n_trees:                Vec<usize>,
    pub max_depth:              Option<usize>,
    pub reject_constant_labels: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            database:               PathBuf::from("data/DisasterResponse.db"),
            model:                  PathBuf::from("models/classifier.bin"),
            test_size:              0.2,
            seed:                   42,
            folds:                  5,
            n_trees:                vec![5, 20],
            max_depth:              None,
            reject_constant_labels: false,
        }
    }
}

impl TrainConfig {
    fn pipeline_params(&self) -> PipelineParams {
        PipelineParams {
            forest: ForestConfig { max_depth: self.max_depth, ..ForestConfig::default() },
            constant_labels: if self.reject_constant_labels {
                ConstantLabelPolicy::Reject
            } else {
                ConstantLabelPolicy::Predict
            },
            seed: self.seed,
            ..PipelineParams::default()
        }
    }
}

/// Where the artifacts of a run ended up, plus the report itself.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub model_path:  PathBuf,
    pub report_path: PathBuf,
    pub report:      TrainingReport<TrainConfig>,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainOutcome> {
        let cfg = &self.config;

        // ── Step 1: Load the cleaned table ────────────────────────────────────
        tracing::info!("Loading '{}' from '{}'", RELATION, cfg.database.display());
        let table = TableStore::new(&cfg.database)
            .load(RELATION)
            .context("loading cleaned data")?;

        // ── Step 2: Documents + label matrix ──────────────────────────────────
        let data = CategorizedMessages::from_table(&table).context("extracting training data")?;

        // ── Step 3: Train / test split ────────────────────────────────────────
        let (train_idx, test_idx) = split_train_test(data.len(), cfg.test_size, cfg.seed);
        let train = data.select(&train_idx);
        let test  = data.select(&test_idx);
        tracing::info!("Split: {} train, {} test", train.len(), test.len());

        // ── Step 4: Grid search ───────────────────────────────────────────────
        let search  = GridSearch::new(cfg.n_trees.clone(), cfg.folds);
        let outcome = search
            .fit(&cfg.pipeline_params(), &train)
            .context("training model")?;

        // ── Step 5: Evaluate ──────────────────────────────────────────────────
        let evaluation = evaluate(&outcome.best, &test.documents, &test.labels)
            .context("evaluating model")?;

        // ── Step 6: Save the model ────────────────────────────────────────────
        ModelStore::new(&cfg.model).save(&outcome.best).context("saving model")?;

        // ── Step 7: Write the report ──────────────────────────────────────────
        let report = TrainingReport {
            config:       cfg.clone(),
            n_train:      train.len(),
            n_test:       test.len(),
            best_n_trees: outcome.best_n_trees,
            search:       outcome.candidates,
            evaluation,
        };
        let report_path = report_path_for(&cfg.model);
        MetricsWriter::new(&report_path).write(&report).context("writing report")?;

        Ok(TrainOutcome { model_path: cfg.model.clone(), report_path, report })
    }
}
