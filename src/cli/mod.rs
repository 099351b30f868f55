// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `process` : CSV sources → cleaned SQLite table
//   2. `train`   : SQLite table → model + evaluation report
//   3. `classify`: model + message → predicted categories
//
// Only this layer prints.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use commands::{ClassifyArgs, Commands, ProcessArgs, TrainArgs};

use crate::data::lemmatizer;

#[derive(Parser, Debug)]
#[command(
    name = "disaster-response",
    version,
    about = "Clean disaster-response messages, then train and evaluate a multi-label classifier."
)]
pub struct Cli {
    /// WordNet dict/ directory (index.noun, noun.exc, index.verb,
    /// verb.exc) to use instead of the bundled lexical resources
    #[arg(long, global = true, env = "DISASTER_RESPONSE_LEXICON")]
    pub lexicon_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        if let Some(dir) = &self.lexicon_dir {
            lemmatizer::install_from_dir(dir)?;
        }

        match self.command {
            Commands::Process(args)  => run_process(args),
            Commands::Train(args)    => run_train(args),
            Commands::Classify(args) => run_classify(args),
        }
    }
}

fn run_process(args: ProcessArgs) -> Result<()> {
    use crate::application::process_use_case::ProcessUseCase;

    println!("Loading data...\n    MESSAGES: {}\n    CATEGORIES: {}", args.messages.display(), args.categories.display());
    let database = args.database.clone();
    let summary  = ProcessUseCase::new(args.into()).execute()?;

    println!("Cleaned {} rows with {} categories.", summary.rows, summary.labels.len());
    println!("Saved data to database: {}", database.display());
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    println!("Loading data...\n    DATABASE: {}", args.database.display());
    let outcome = TrainUseCase::new(args.into()).execute()?;
    let report  = &outcome.report;

    println!("Best n_trees: {}", report.best_n_trees);
    for candidate in &report.search {
        println!("    n_trees={:<4} mean={:.4} std={:.4}", candidate.n_trees, candidate.mean, candidate.std);
    }
    println!("\nEvaluating model on {} held-out messages...\n", report.n_test);
    print!("{}", report.evaluation);

    println!("Saved model: {}", outcome.model_path.display());
    println!("Saved report: {}", outcome.report_path.display());
    println!("Trained model saved!");
    Ok(())
}

fn run_classify(args: ClassifyArgs) -> Result<()> {
    use crate::application::classify_use_case::ClassifyUseCase;

    let use_case = ClassifyUseCase::new(args.model)?;
    let result   = use_case.classify(&args.message)?;

    println!("Message: {}", args.message);
    let categories = result.categories();
    if categories.is_empty() {
        println!("Categories: (none)");
    } else {
        println!("Categories: {}", categories.join(", "));
    }
    for prediction in result.predictions() {
        println!("    {:<24} {}", prediction.label, prediction.value);
    }
    Ok(())
}
