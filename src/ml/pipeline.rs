// ============================================================
// Layer 5 — Classifier Pipeline
// ============================================================
// The trained artifact: feature pipeline + one forest per label.
//
//   documents ──▶ FeaturePipeline ──▶ MultiOutputClassifier ──▶ LabelMatrix
//
// This is the unit the grid search fits per fold, the unit the
// evaluator scores, and the unit the model store persists.

use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, Result, Stage};
use crate::domain::labels::LabelMatrix;
use crate::domain::traits::MultiLabelPredictor;
use crate::ml::features::{FeatureConfig, FeaturePipeline};
use crate::ml::forest::ForestConfig;
use crate::ml::multi_output::{ConstantLabelPolicy, MultiOutputClassifier};

/// Everything needed to fit one pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    pub features:        FeatureConfig,
    pub forest:          ForestConfig,
    pub constant_labels: ConstantLabelPolicy,
    pub seed:            u64,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            features:        FeatureConfig::default(),
            forest:          ForestConfig::default(),
            constant_labels: ConstantLabelPolicy::default(),
            seed:            42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierPipeline {
    features:   FeaturePipeline,
    classifier: MultiOutputClassifier,
}

impl ClassifierPipeline {
    pub fn fit(params: &PipelineParams, documents: &[String], labels: &LabelMatrix) -> Result<Self> {
        if documents.is_empty() {
            return Err(PipelineError::training(Stage::Train, "training split is empty"));
        }
        if documents.len() != labels.n_samples() {
            return Err(PipelineError::training(
                Stage::Train,
                format!("{} documents but {} label rows", documents.len(), labels.n_samples()),
            ));
        }

        let mut features = FeaturePipeline::new(&params.features);
        let x = features.fit_transform(documents)?;
        let classifier = MultiOutputClassifier::fit(
            &params.forest,
            params.constant_labels,
            &x,
            features.n_features(),
            labels,
            params.seed,
        )?;

        Ok(Self { features, classifier })
    }

    #[cfg(test)]
    pub fn classifier(&self) -> &MultiOutputClassifier {
        &self.classifier
    }

    /// Subset accuracy: share of rows whose every label is right.
    pub fn score(&self, documents: &[String], labels: &LabelMatrix) -> Result<f64> {
        let predicted = self.predict(documents)?;
        Ok(subset_accuracy(labels, &predicted))
    }
}

impl MultiLabelPredictor for ClassifierPipeline {
    fn label_names(&self) -> &[String] {
        self.classifier.label_names()
    }

    fn predict(&self, documents: &[String]) -> Result<LabelMatrix> {
        let x = self.features.transform(documents)?;
        Ok(self.classifier.predict(&x))
    }
}

pub fn subset_accuracy(truth: &LabelMatrix, predicted: &LabelMatrix) -> f64 {
    if truth.n_samples() == 0 {
        return 0.0;
    }
    let exact = truth
        .rows()
        .iter()
        .zip(predicted.rows())
        .filter(|(t, p)| t == p)
        .count();
    exact as f64 / truth.n_samples() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> (Vec<String>, LabelMatrix) {
        let docs: Vec<String> = [
            "flood water rising in the city",
            "we need food and water",
            "the weather is calm today",
            "storm and flood damage houses",
            "nothing to report here",
            "sunny day at the market",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let related = vec![1, 1, 0, 1, 0, 0];
        let request = vec![0, 1, 0, 0, 0, 0];
        let labels = LabelMatrix::from_columns(vec!["related".into(), "request".into()], vec![related, request]);
        (docs, labels)
    }

    fn params() -> PipelineParams {
        PipelineParams {
            forest: ForestConfig { n_trees: 10, ..ForestConfig::default() },
            ..PipelineParams::default()
        }
    }

    #[test]
    fn test_predicts_binary_matrix_with_one_column_per_label() {
        let (docs, labels) = corpus();
        let model = ClassifierPipeline::fit(&params(), &docs, &labels).unwrap();
        let predicted = model.predict(&docs).unwrap();

        assert_eq!(predicted.names(), labels.names());
        assert_eq!(predicted.n_samples(), docs.len());
        assert!(predicted.rows().iter().flatten().all(|&v| v <= 1));
    }

    #[test]
    fn test_score_is_a_fraction() {
        let (docs, labels) = corpus();
        let model = ClassifierPipeline::fit(&params(), &docs, &labels).unwrap();
        let score = model.score(&docs, &labels).unwrap();
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_subset_accuracy_needs_every_label() {
        let names = vec!["a".to_string(), "b".to_string()];
        let truth = LabelMatrix::new(names.clone(), vec![vec![1, 0], vec![1, 1]]);
        let pred  = LabelMatrix::new(names, vec![vec![1, 0], vec![1, 0]]);
        assert_eq!(subset_accuracy(&truth, &pred), 0.5);
    }

    #[test]
    fn test_empty_training_split_is_rejected() {
        let labels = LabelMatrix::new(vec!["related".into()], vec![]);
        assert!(ClassifierPipeline::fit(&params(), &[], &labels).is_err());
    }
}
