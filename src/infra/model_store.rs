// ============================================================
// Layer 6 — Model Store
// ============================================================
// Saves and restores the trained ClassifierPipeline as a
// single bincode blob.
//
// What the blob holds:
//   1. Feature pipeline state (vocabulary + IDF weights)
//   2. One fitted random forest per label
//   3. The label names, in column order
//
// The format is only guaranteed to round-trip with the same
// build; there is no versioning.
//
// Reference: bincode documentation (serialize_into / deserialize_from)

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use crate::domain::error::{PipelineError, Result, Stage};
use crate::ml::pipeline::ClassifierPipeline;

pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_err(&self, e: impl Into<crate::domain::error::BoxError>) -> PipelineError {
        PipelineError::io(Stage::ModelStore, self.path.display().to_string(), e)
    }

    pub fn save(&self, model: &ClassifierPipeline) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        let file = File::create(&self.path).map_err(|e| self.io_err(e))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, model).map_err(|e| self.io_err(e))?;
        writer.flush().map_err(|e| self.io_err(e))?;

        tracing::info!("Saved model to '{}'", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<ClassifierPipeline> {
        let file = File::open(&self.path).map_err(|e| self.io_err(e))?;
        let model: ClassifierPipeline =
            bincode::deserialize_from(BufReader::new(file)).map_err(|e| self.io_err(e))?;

        tracing::info!("Loaded model from '{}'", self.path.display());
        Ok(model)
    }
}
