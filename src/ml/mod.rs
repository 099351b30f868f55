// ============================================================
// Layer 5 — ML Layer
// ============================================================
// Everything that learns or scores. No file I/O here; the
// infra layer persists what this layer produces.
//
//   features.rs    : sparse vectors, term counts, TF-IDF, and
//                     the ordered stage list that runs them
//   tree.rs        : one CART tree (Gini, sparse rows)
//   forest.rs      : bootstrap ensemble of trees, grown with rayon
//   multi_output.rs: one forest per label column
//   pipeline.rs    : features + classifiers as one fitted unit
//   search.rs      : k-fold grid search over the forest size
//   evaluator.rs   : per-label precision/recall/F1 reports
//
// Training flow:
//
//   documents ─▶ FeaturePipeline ─▶ SparseVector rows
//                                        │
//   LabelMatrix ──────────────────▶ MultiOutputClassifier
//                                        │
//                     GridSearch picks n_trees, refits
//                                        │
//                             Evaluator on held-out rows
//
// Reference: Breiman (2001) Random Forests
//            Salton & Buckley (1988) Term-weighting approaches

/// Sparse vectors, vectorizer, TF-IDF and the feature pipeline
pub mod features;

/// CART decision tree
pub mod tree;

/// Random forest ensemble
pub mod forest;

/// One independent forest per label
pub mod multi_output;

/// The fitted features + classifiers artifact
pub mod pipeline;

/// Cross-validated search over tree counts
pub mod search;

/// Classification reports
pub mod evaluator;
