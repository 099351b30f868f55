// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that describe the data
// the pipeline moves around:
//
//   table.rs  : an in-memory table of typed cells (CSV rows,
//                SQLite rows, the cleaned dataset)
//   labels.rs : the label schema and the binary label matrix
//   error.rs  : the error taxonomy every core stage reports
//   traits.rs : the seams other layers implement
//
// Rules for this layer:
//   - NO file I/O, NO SQL, NO model code
//   - Only data definitions and small pure helpers
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

pub mod error;
pub mod labels;
pub mod table;
pub mod traits;
