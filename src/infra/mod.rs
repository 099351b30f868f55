// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches a file format on disk:
//
//   table_store.rs: the cleaned table as a SQLite relation
//                    (rusqlite), replaced wholesale on save
//
//   model_store.rs: the trained ClassifierPipeline as one
//                    bincode blob
//
//   metrics.rs    : the training report (config, grid search
//                    scores, per-label evaluation) as JSON
//                    next to the model
//
// Stores report failures as PipelineError so the CLI can map
// them to exit codes like any other core failure.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling)

/// SQLite persistence of the cleaned table
pub mod table_store;

/// Model blob saving and loading
pub mod model_store;

/// JSON training report
pub mod metrics;
