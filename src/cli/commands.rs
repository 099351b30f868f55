// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `process`, `train` and
// `classify`, and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::application::process_use_case::ProcessConfig;
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge and clean the raw CSV files into a SQLite table
    Process(ProcessArgs),

    /// Train and evaluate the classifier on the cleaned table
    Train(TrainArgs),

    /// Print the categories a saved model assigns to a message
    Classify(ClassifyArgs),
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// CSV file with id, message, original, genre columns
    #[arg(long)]
    pub messages: PathBuf,

    /// CSV file with id and packed categories columns
    #[arg(long)]
    pub categories: PathBuf,

    /// SQLite file the cleaned table is written to
    #[arg(long)]
    pub database: PathBuf,
}

impl From<ProcessArgs> for ProcessConfig {
    fn from(a: ProcessArgs) -> Self {
        ProcessConfig {
            messages:   a.messages,
            categories: a.categories,
            database:   a.database,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// SQLite file written by `process`
    #[arg(long)]
    pub database: PathBuf,

    /// Where to save the trained model
    #[arg(long)]
    pub model: PathBuf,

    /// Share of rows held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    pub test_size: f64,

    /// Seed for the split and the forests
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Cross-validation folds for the grid search
    #[arg(long, default_value_t = 5)]
    pub folds: usize,

    /// Candidate tree counts, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = vec![5usize, 20])]
    pub n_trees: Vec<usize>,

    /// Maximum tree depth (unlimited when omitted)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Fail instead of training label columns with a single class
    #[arg(long)]
    pub reject_constant_labels: bool,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            database:               a.database,
            model:                  a.model,
            test_size:              a.test_size,
            seed:                   a.seed,
            folds:                  a.folds,
            n_trees:                a.n_trees,
            max_depth:              a.max_depth,
            reject_constant_labels: a.reject_constant_labels,
        }
    }
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Model file written by `train`
    #[arg(long)]
    pub model: PathBuf,

    /// The message to classify
    #[arg(long)]
    pub message: String,
}
