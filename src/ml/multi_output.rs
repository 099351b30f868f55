// ============================================================
// Layer 5 — Multi-Output Classifier
// ============================================================
// One independent random forest per label column, all trained
// on the same feature rows. Labels share nothing: no parameter
// sharing and no label-correlation modelling.
//
// A label column with a single class across the training rows
// cannot teach a forest anything. ConstantLabelPolicy decides
// what happens then:
//   Predict: train it anyway; the forest always predicts that
//             class (the real dataset has such columns)
//   Reject : fail with a Training error naming the column

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, Result, Stage};
use crate::domain::labels::LabelMatrix;
use crate::ml::features::SparseVector;
use crate::ml::forest::{ForestConfig, RandomForest};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstantLabelPolicy {
    #[default]
    Predict,
    Reject,
}

/// Spreads per-label seeds apart (64-bit golden ratio).
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiOutputClassifier {
    label_names: Vec<String>,
    estimators:  Vec<RandomForest>,
}

/// Names of label columns holding fewer than two distinct classes.
pub fn constant_labels(labels: &LabelMatrix) -> Vec<&str> {
    (0..labels.n_labels())
        .filter(|&j| {
            let mut column = labels.column(j);
            column.sort_unstable();
            column.dedup();
            column.len() < 2
        })
        .map(|j| labels.names()[j].as_str())
        .collect()
}

/// Apply `policy` to the label columns of a training split.
pub fn check_constant_labels(policy: ConstantLabelPolicy, labels: &LabelMatrix) -> Result<()> {
    let constant = constant_labels(labels);
    if constant.is_empty() {
        return Ok(());
    }
    match policy {
        ConstantLabelPolicy::Predict => {
            tracing::debug!("Constant label columns (trained as-is): {}", constant.join(", "));
            Ok(())
        }
        ConstantLabelPolicy::Reject => Err(PipelineError::training(
            Stage::Train,
            format!("label columns with a single class: {}", constant.join(", ")),
        )),
    }
}

impl MultiOutputClassifier {
    pub fn fit(
        config:     &ForestConfig,
        policy:     ConstantLabelPolicy,
        x:          &[SparseVector],
        n_features: usize,
        labels:     &LabelMatrix,
        seed:       u64,
    ) -> Result<Self> {
        if x.len() != labels.n_samples() {
            return Err(PipelineError::training(
                Stage::Train,
                format!("{} feature rows but {} label rows", x.len(), labels.n_samples()),
            ));
        }
        check_constant_labels(policy, labels)?;

        let estimators = (0..labels.n_labels())
            .into_par_iter()
            .map(|j| {
                let label_seed = seed ^ SEED_STRIDE.wrapping_mul(j as u64 + 1);
                RandomForest::fit(config, x, n_features, &labels.column(j), label_seed)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { label_names: labels.names().to_vec(), estimators })
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    #[cfg(test)]
    pub fn estimators(&self) -> &[RandomForest] {
        &self.estimators
    }

    /// `rows.len() × n_labels` predictions.
    pub fn predict(&self, rows: &[SparseVector]) -> LabelMatrix {
        let columns: Vec<Vec<u8>> = self
            .estimators
            .iter()
            .map(|forest| forest.predict_batch(rows))
            .collect();
        let matrix = (0..rows.len())
            .map(|i| columns.iter().map(|col| col[i]).collect())
            .collect();
        LabelMatrix::new(self.label_names.clone(), matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;

    fn rows() -> Vec<SparseVector> {
        (0..10)
            .map(|i| {
                if i < 5 {
                    SparseVector::from_sorted(2, vec![(0, 1.0)])
                } else {
                    SparseVector::from_sorted(2, vec![(1, 1.0)])
                }
            })
            .collect()
    }

    fn labels() -> LabelMatrix {
        let related: Vec<u8> = (0..10).map(|i| u8::from(i < 5)).collect();
        let offer = vec![0u8; 10];
        LabelMatrix::from_columns(vec!["related".into(), "offer".into()], vec![related, offer])
    }

    fn config() -> ForestConfig {
        ForestConfig { n_trees: 5, ..ForestConfig::default() }
    }

    #[test]
    fn test_one_forest_per_label() {
        let clf = MultiOutputClassifier::fit(&config(), ConstantLabelPolicy::Predict, &rows(), 2, &labels(), 42)
            .unwrap();
        assert_eq!(clf.estimators().len(), 2);

        let predicted = clf.predict(&rows());
        assert_eq!(predicted.names(), &["related", "offer"]);
        assert_eq!(predicted.n_samples(), 10);
        assert_eq!(predicted.column(0), labels().column(0));
        assert!(predicted.column(1).iter().all(|&v| v == 0));
    }

    #[test]
    fn test_reject_policy_names_constant_column() {
        let err = MultiOutputClassifier::fit(&config(), ConstantLabelPolicy::Reject, &rows(), 2, &labels(), 42)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Training);
        assert!(err.to_string().contains("offer"));
    }

    #[test]
    fn test_constant_labels_detection() {
        assert_eq!(constant_labels(&labels()), vec!["offer"]);
    }

    #[test]
    fn test_row_mismatch_is_training_error() {
        let err = MultiOutputClassifier::fit(&config(), ConstantLabelPolicy::Predict, &rows()[..3], 2, &labels(), 1)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Training);
    }
}
