// ============================================================
// Layer 3 — Pipeline Error Taxonomy
// ============================================================
// Every core stage reports failures through PipelineError.
// There are exactly four kinds:
//
//   Io      : a source or destination could not be read/written
//   Schema  : an expected column, key or relation is missing
//   Format  : a value could not be decomposed as expected
//   Training: a fit was degenerate or impossible
//
// Each variant carries the Stage it came from plus the
// offending value, so the CLI can map kinds to exit codes and
// still print a useful message.

use std::fmt;

use thiserror::Error;

/// Boxed source error kept inside `PipelineError::Io`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shorthand used by every core module.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The pipeline step that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Expand,
    TableStore,
    Dataset,
    Features,
    Train,
    Evaluate,
    ModelStore,
    Report,
    Lexicon,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load       => "load",
            Stage::Expand     => "expand",
            Stage::TableStore => "table store",
            Stage::Dataset    => "dataset",
            Stage::Features   => "features",
            Stage::Train      => "train",
            Stage::Evaluate   => "evaluate",
            Stage::ModelStore => "model store",
            Stage::Report     => "report",
            Stage::Lexicon    => "lexicon",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a `PipelineError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Schema,
    Format,
    Training,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage}: cannot access '{target}': {source}")]
    Io {
        stage:  Stage,
        target: String,
        #[source]
        source: BoxError,
    },

    #[error("{stage}: {message}")]
    Schema { stage: Stage, message: String },

    #[error("{stage}: {message} (offending value: {value:?})")]
    Format {
        stage:   Stage,
        message: String,
        value:   String,
    },

    #[error("{stage}: {message}")]
    Training { stage: Stage, message: String },
}

impl PipelineError {
    pub fn io(stage: Stage, target: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Io { stage, target: target.into(), source: source.into() }
    }

    pub fn schema(stage: Stage, message: impl Into<String>) -> Self {
        Self::Schema { stage, message: message.into() }
    }

    pub fn format(stage: Stage, message: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Format { stage, message: message.into(), value: value.into() }
    }

    pub fn training(stage: Stage, message: impl Into<String>) -> Self {
        Self::Training { stage, message: message.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. }       => ErrorKind::Io,
            Self::Schema { .. }   => ErrorKind::Schema,
            Self::Format { .. }   => ErrorKind::Format,
            Self::Training { .. } => ErrorKind::Training,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::Io { stage, .. }
            | Self::Schema { stage, .. }
            | Self::Format { stage, .. }
            | Self::Training { stage, .. } => *stage,
        }
    }
}

impl ErrorKind {
    /// Process exit status for this kind (sysexits.h values).
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Io       => 74,
            ErrorKind::Schema   => 65,
            ErrorKind::Format   => 66,
            ErrorKind::Training => 70,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_have_distinct_exit_codes() {
        let codes = [
            ErrorKind::Io.exit_code(),
            ErrorKind::Schema.exit_code(),
            ErrorKind::Format.exit_code(),
            ErrorKind::Training.exit_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_message_names_stage_and_value() {
        let err = PipelineError::format(Stage::Expand, "token has no digit suffix", "related-x");
        let text = err.to_string();
        assert!(text.starts_with("expand:"));
        assert!(text.contains("related-x"));
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(err.stage(), Stage::Expand);
    }

    #[test]
    fn test_io_error_keeps_source() {
        let io  = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = PipelineError::io(Stage::Load, "messages.csv", io);
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
