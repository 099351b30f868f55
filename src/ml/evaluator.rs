// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Scores a trained multi-label predictor on held-out rows, one
// classification report per label:
//
//   per class   precision = TP / (TP + FP)
//               recall    = TP / (TP + FN)
//               f1        = 2·P·R / (P + R)
//               support   = number of true rows of that class
//   accuracy    correct / total
//   micro avg   pooled over classes (equals accuracy here)
//   macro avg   unweighted mean over classes
//   weighted    mean weighted by support
//
// Any zero denominator yields 0.0. Classes 0 and 1 are always
// listed; other values only when they occur.
//
// The report is plain data (serde) so the infra layer can write
// it as JSON. Display renders the text table the CLI prints.
//
// Reference: scikit-learn classification_report

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, Result, Stage};
use crate::domain::labels::LabelMatrix;
use crate::domain::traits::MultiLabelPredictor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub class:     u8,
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub support:   usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub support:   usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes:      Vec<ClassMetrics>,
    pub accuracy:     f64,
    pub micro_avg:    AverageMetrics,
    pub macro_avg:    AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 { 0.0 } else { 2.0 * precision * recall / (precision + recall) }
}

impl ClassificationReport {
    /// `truth` and `predicted` must have equal length.
    pub fn compute(truth: &[u8], predicted: &[u8]) -> Self {
        let mut labels: BTreeSet<u8> = [0u8, 1].into_iter().collect();
        labels.extend(truth.iter().copied());
        labels.extend(predicted.iter().copied());

        let total   = truth.len();
        let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();

        let classes: Vec<ClassMetrics> = labels
            .into_iter()
            .map(|class| {
                let mut tp = 0;
                let mut fp = 0;
                let mut fn_ = 0;
                for (&t, &p) in truth.iter().zip(predicted) {
                    match (t == class, p == class) {
                        (true, true)  => tp += 1,
                        (false, true) => fp += 1,
                        (true, false) => fn_ += 1,
                        _ => {}
                    }
                }
                let precision = ratio(tp, tp + fp);
                let recall    = ratio(tp, tp + fn_);
                ClassMetrics { class, precision, recall, f1: f1(precision, recall), support: tp + fn_ }
            })
            .collect();

        // Every row is exactly one TP or one FP+FN pair, so pooled
        // precision and recall both reduce to accuracy.
        let accuracy  = ratio(correct, total);
        let micro_avg = AverageMetrics { precision: accuracy, recall: accuracy, f1: accuracy, support: total };

        let k = classes.len() as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / k,
            recall:    classes.iter().map(|c| c.recall).sum::<f64>() / k,
            f1:        classes.iter().map(|c| c.f1).sum::<f64>() / k,
            support:   total,
        };

        let weight = |c: &ClassMetrics| if total == 0 { 0.0 } else { c.support as f64 / total as f64 };
        let weighted_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision * weight(c)).sum(),
            recall:    classes.iter().map(|c| c.recall * weight(c)).sum(),
            f1:        classes.iter().map(|c| c.f1 * weight(c)).sum(),
            support:   total,
        };

        Self { classes, accuracy, micro_avg, macro_avg, weighted_avg }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.class, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        let total = self.micro_avg.support;
        writeln!(f, "{:>14} {:>9} {:>9} {:>9.2} {:>9}", "accuracy", "", "", self.accuracy, total)?;
        for (name, avg) in [
            ("micro avg", &self.micro_avg),
            ("macro avg", &self.macro_avg),
            ("weighted avg", &self.weighted_avg),
        ] {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, avg.support
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelReport {
    pub label:  String,
    pub report: ClassificationReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub n_samples: usize,
    pub labels:    Vec<LabelReport>,
}

impl EvaluationReport {
    /// Unweighted mean of the per-label accuracies.
    pub fn mean_accuracy(&self) -> f64 {
        if self.labels.is_empty() {
            return 0.0;
        }
        self.labels.iter().map(|l| l.report.accuracy).sum::<f64>() / self.labels.len() as f64
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for l in &self.labels {
            writeln!(f, "Category: {}", l.label)?;
            writeln!(f, "{}", l.report)?;
        }
        Ok(())
    }
}

/// Predict `documents` and compare each label column against `truth`.
pub fn evaluate(
    model:     &dyn MultiLabelPredictor,
    documents: &[String],
    truth:     &LabelMatrix,
) -> Result<EvaluationReport> {
    if model.label_names() != truth.names() {
        return Err(PipelineError::schema(
            Stage::Evaluate,
            format!(
                "model labels [{}] differ from test labels [{}]",
                model.label_names().join(", "),
                truth.names().join(", ")
            ),
        ));
    }
    if documents.len() != truth.n_samples() {
        return Err(PipelineError::schema(
            Stage::Evaluate,
            format!("{} documents but {} label rows", documents.len(), truth.n_samples()),
        ));
    }

    let predicted = model.predict(documents)?;
    let labels = truth
        .names()
        .iter()
        .enumerate()
        .map(|(j, name)| LabelReport {
            label:  name.clone(),
            report: ClassificationReport::compute(&truth.column(j), &predicted.column(j)),
        })
        .collect();

    let report = EvaluationReport { n_samples: documents.len(), labels };
    tracing::info!(
        "Evaluated {} labels on {} rows (mean accuracy {:.4})",
        report.labels.len(),
        report.n_samples,
        report.mean_accuracy()
    );
    Ok(report)
}
