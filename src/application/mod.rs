// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// command each (process, train or classify).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - No direct database/file access (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Core errors arrive as PipelineError and leave wrapped in
// anyhow with context; the CLI downcasts them for exit codes.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// CSV → cleaned SQLite relation
pub mod process_use_case;

// SQLite relation → model + report
pub mod train_use_case;

// Model + message → predicted categories
pub mod classify_use_case;
