// ============================================================
// Layer 5 — Cross-Validated Grid Search
// ============================================================
// Picks the forest size by k-fold cross-validation:
//
//   for each candidate tree count:
//     for each fold:
//       fit the whole pipeline (features + forests) on the
//       fold's training rows, score subset accuracy on the
//       held-out rows
//     mean / std of the fold scores
//   best mean wins (first candidate on ties)
//   refit the winner on all rows
//
// Folds come from data::splitter::k_fold (contiguous, no
// shuffle). The constant-label policy is applied once to the
// full training split; inside a fold a column may be constant
// by chance, so folds always train it as-is.
//
// Reference: Kohavi (1995) A Study of Cross-Validation and Bootstrap

use serde::{Deserialize, Serialize};

use crate::data::dataset::CategorizedMessages;
use crate::data::splitter::k_fold;
use crate::domain::error::{PipelineError, Result, Stage};
use crate::ml::forest::ForestConfig;
use crate::ml::multi_output::{check_constant_labels, ConstantLabelPolicy};
use crate::ml::pipeline::{ClassifierPipeline, PipelineParams};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSearch {
    /// Tree counts to try, in order.
    pub candidates: Vec<usize>,
    pub folds:      usize,
}

impl Default for GridSearch {
    fn default() -> Self {
        Self { candidates: vec![5, 20], folds: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub n_trees:     usize,
    pub fold_scores: Vec<f64>,
    pub mean:        f64,
    pub std:         f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Winner refit on every training row.
    pub best:         ClassifierPipeline,
    pub best_n_trees: usize,
    pub candidates:   Vec<CandidateScore>,
}

impl GridSearch {
    pub fn new(candidates: Vec<usize>, folds: usize) -> Self {
        Self { candidates, folds }
    }

    pub fn fit(&self, base: &PipelineParams, data: &CategorizedMessages) -> Result<SearchOutcome> {
        if self.candidates.is_empty() {
            return Err(PipelineError::training(Stage::Train, "grid search has no candidate tree counts"));
        }
        if let Some(zero) = self.candidates.iter().find(|&&n| n == 0) {
            return Err(PipelineError::training(
                Stage::Train,
                format!("candidate tree count {zero} is not allowed"),
            ));
        }
        if data.len() < 2 {
            return Err(PipelineError::training(
                Stage::Train,
                format!("cross-validation needs at least 2 rows, got {}", data.len()),
            ));
        }
        check_constant_labels(base.constant_labels, &data.labels)?;

        let folds = k_fold(data.len(), self.folds.max(2));
        tracing::info!(
            "Grid search: {} candidates × {} folds on {} rows",
            self.candidates.len(),
            folds.len(),
            data.len()
        );

        // ── Score every candidate ─────────────────────────────────────────────
        let mut scores = Vec::with_capacity(self.candidates.len());
        for &n_trees in &self.candidates {
            let params = PipelineParams {
                forest:          ForestConfig { n_trees, ..base.forest },
                constant_labels: ConstantLabelPolicy::Predict,
                ..*base
            };

            let mut fold_scores = Vec::with_capacity(folds.len());
            for (f, fold) in folds.iter().enumerate() {
                let train = data.select(&fold.train);
                let test  = data.select(&fold.test);
                let model = ClassifierPipeline::fit(&params, &train.documents, &train.labels)?;
                let score = model.score(&test.documents, &test.labels)?;
                tracing::debug!("n_trees={} fold {}: {:.4}", n_trees, f + 1, score);
                fold_scores.push(score);
            }

            let (mean, std) = mean_std(&fold_scores);
            tracing::info!("n_trees={:<4} mean={:.4} std={:.4}", n_trees, mean, std);
            scores.push(CandidateScore { n_trees, fold_scores, mean, std });
        }

        // ── Pick and refit the winner ─────────────────────────────────────────
        let mut winner = &scores[0];
        for candidate in &scores[1..] {
            if candidate.mean > winner.mean {
                winner = candidate;
            }
        }
        let best_n_trees = winner.n_trees;
        tracing::info!("Best n_trees={} (mean subset accuracy {:.4})", best_n_trees, winner.mean);

        let params = PipelineParams {
            forest: ForestConfig { n_trees: best_n_trees, ..base.forest },
            ..*base
        };
        let best = ClassifierPipeline::fit(&params, &data.documents, &data.labels)?;

        Ok(SearchOutcome { best, best_n_trees, candidates: scores })
    }
}

/// Mean and population standard deviation.
fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n    = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var  = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use crate::domain::labels::LabelMatrix;
    use crate::domain::traits::MultiLabelPredictor;

    fn data() -> CategorizedMessages {
        let texts = [
            "flood in city",
            "water everywhere after the flood",
            "need food now",
            "sunny and calm",
            "people need water and food",
            "the market is open",
            "flood warning for the river",
            "a quiet evening",
        ];
        let related = vec![1, 1, 1, 0, 1, 0, 1, 0];
        let offer   = vec![0; 8];
        CategorizedMessages::new(
            texts.iter().map(|s| s.to_string()).collect(),
            LabelMatrix::from_columns(vec!["related".into(), "offer".into()], vec![related, offer]),
        )
    }

    #[test]
    fn test_reports_every_candidate_and_refits_best() {
        let search  = GridSearch::new(vec![2, 4], 3);
        let outcome = search.fit(&PipelineParams::default(), &data()).unwrap();

        assert_eq!(outcome.candidates.len(), 2);
        assert!(outcome.candidates.iter().all(|c| c.fold_scores.len() == 3));
        assert!([2, 4].contains(&outcome.best_n_trees));
        assert_eq!(outcome.best.label_names(), &["related", "offer"]);
        assert!(outcome
            .best
            .classifier()
            .estimators()
            .iter()
            .all(|f| f.n_trees() == outcome.best_n_trees));
    }

    #[test]
    fn test_folds_clamped_to_row_count() {
        let small   = data().select(&[0, 3, 4]);
        let outcome = GridSearch::new(vec![2], 10).fit(&PipelineParams::default(), &small).unwrap();
        assert_eq!(outcome.candidates[0].fold_scores.len(), 3);
    }

    #[test]
    fn test_too_few_rows_is_training_error() {
        let one = data().select(&[0]);
        let err = GridSearch::default().fit(&PipelineParams::default(), &one).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Training);
    }

    #[test]
    fn test_empty_candidates_is_training_error() {
        let err = GridSearch::new(vec![], 3).fit(&PipelineParams::default(), &data()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Training);
    }

    #[test]
    fn test_reject_policy_checked_on_full_split() {
        let params = PipelineParams { constant_labels: ConstantLabelPolicy::Reject, ..PipelineParams::default() };
        let err = GridSearch::new(vec![2], 2).fit(&params, &data()).unwrap_err();
        assert!(err.to_string().contains("offer"));
    }

    #[test]
    fn test_mean_std() {
        let (m, s) = mean_std(&[1.0, 0.0]);
        assert_eq!(m, 0.5);
        assert_eq!(s, 0.5);
    }
}
