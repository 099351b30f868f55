// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams between layers:
//
//   TableSource       : something that yields a Table
//                        (CSV files today)
//   Stage             : one fit/transform step of the
//                        feature pipeline
//   MultiLabelPredictor: anything that turns raw documents
//                        into a label matrix (the trained
//                        pipeline, before or after a round
//                        trip through the model store)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use crate::domain::error::Result;
use crate::domain::labels::LabelMatrix;
use crate::domain::table::Table;

// ─── TableSource ──────────────────────────────────────────────────────────────
/// Any component that can produce a whole table in memory.
pub trait TableSource {
    /// Read the full table.
    fn load(&self) -> Result<Table>;
}

// ─── Stage ────────────────────────────────────────────────────────────────────
/// One named step of a fit/transform pipeline.
///
/// `fit` learns state from a training batch and replaces whatever
/// was learned before. `transform` is pure once fitted: it takes
/// `&self` and never changes the learned state.
pub trait Stage {
    type Input;
    type Output;

    /// Stable name used in logs and the stage list.
    fn name(&self) -> &'static str;

    fn fit(&mut self, data: &[Self::Input]) -> Result<()>;

    fn transform(&self, data: &[Self::Input]) -> Result<Vec<Self::Output>>;
}

// ─── MultiLabelPredictor ──────────────────────────────────────────────────────
/// Predicts every label for every document in a batch.
pub trait MultiLabelPredictor {
    fn label_names(&self) -> &[String];

    /// Returns an `documents.len() × label_names().len()` matrix.
    fn predict(&self, documents: &[String]) -> Result<LabelMatrix>;
}
