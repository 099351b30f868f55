// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the raw CSV files and the inputs of the
// classifier.
//
// The `process` command flows:
//
//   messages.csv + categories.csv
//       │
//       ▼
//   loader        → outer join on `id`
//       │
//       ▼
//   expander      → packed categories → label columns, cleaned
//       │
//       ▼
//   (infra::table_store writes the SQLite table)
//
// The `train` command flows:
//
//   (infra::table_store reads the SQLite table)
//       │
//       ▼
//   dataset       → documents + label matrix
//       │
//       ▼
//   splitter      → seeded train/test split, k folds
//       │
//       ▼
//   tokenizer     → lemmatized tokens (used by ml::features)
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Reads CSV sources and outer-joins them
pub mod loader;

/// Expands the packed category column and cleans the rows
pub mod expander;

/// WordNet-style lemmatizer over bundled lexical resources
pub mod lemmatizer;

/// Normalises and splits message text into tokens
pub mod tokenizer;

/// Documents + label matrix extracted from the cleaned table
pub mod dataset;

/// Seeded train/test split and k-fold partitioning
pub mod splitter;
