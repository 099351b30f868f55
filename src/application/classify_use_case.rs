// ============================================================
// Layer 2 — Classify Use Case
// ============================================================
// Loads a saved model and returns the categories it assigns to
// one message.
//
//   Step 1: Load the model blob         (Layer 6 - infra)
//   Step 2: Predict the label row       (Layer 5 - ml)
//   Step 3: Wrap the one-row matrix so callers can list either
//           the set categories or every label with its 0/1

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::labels::LabelMatrix;
use crate::domain::traits::MultiLabelPredictor;
use crate::infra::model_store::ModelStore;
use crate::ml::pipeline::ClassifierPipeline;

/// One label and its predicted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub label: String,
    pub value: u8,
}

/// The model's answer for a single message.
#[derive(Debug, Clone)]
pub struct Classification {
    row: LabelMatrix,
}

impl Classification {
    /// Labels predicted as set, in column order.
    pub fn categories(&self) -> Vec<&str> {
        self.row.active_labels(0)
    }

    /// Every label with its predicted value, in column order.
    pub fn predictions(&self) -> Vec<Prediction> {
        let values = self.row.rows().first().cloned().unwrap_or_default();
        self.row
            .names()
            .iter()
            .zip(values)
            .map(|(label, value)| Prediction { label: label.clone(), value })
            .collect()
    }
}

pub struct ClassifyUseCase {
    model: ClassifierPipeline,
}

impl ClassifyUseCase {
    pub fn new(model_path: PathBuf) -> Result<Self> {
        let model = ModelStore::new(&model_path)
            .load()
            .with_context(|| format!("Cannot load model '{}'. Have you run 'train' first?", model_path.display()))?;
        Ok(Self { model })
    }

    pub fn classify(&self, message: &str) -> Result<Classification> {
        let row = self
            .model
            .predict(&[message.to_string()])
            .context("classifying message")?;
        Ok(Classification { row })
    }
}
