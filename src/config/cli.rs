//! CLI argument parsing and overrides
//!
//! # Usage
//!
//! ```bash
//! comprender train bidaf runs/bidaf-1
//! comprender train bidaf runs/bidaf-1 --epochs 6 --lr 0.0005 --dry-run
//! comprender validate static-attention
//! comprender info bidaf --format yaml
//! comprender list
//! ```

use crate::data::BatchingPolicy;
use crate::run::RunSpec;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Comprender: span-extraction QA run assembly
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "comprender")]
#[command(version)]
#[command(about = "Assemble and launch training runs for span-extraction QA models")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Assemble a recipe and launch training into an output directory
    Train(TrainArgs),

    /// Validate a recipe without launching anything
    Validate(ValidateArgs),

    /// Display a recipe's assembled configuration
    Info(InfoArgs),

    /// List available recipes
    List,
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Recipe name
    #[arg(value_name = "RECIPE")]
    pub recipe: String,

    /// Output directory for the run
    #[arg(value_name = "OUT_DIR")]
    pub out_dir: PathBuf,

    /// Override number of epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Override learning rate
    #[arg(short, long)]
    pub lr: Option<f32>,

    /// Override batch size for both training and evaluation
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Random seed for run-scoped shuffling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Free-form notes persisted with the run
    #[arg(long)]
    pub notes: Option<String>,

    /// Continue a run already present in the output directory
    #[arg(short, long)]
    pub resume: bool,

    /// Assemble and validate, but don't launch or write anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Recipe name
    #[arg(value_name = "RECIPE")]
    pub recipe: String,

    /// Show the assembled configuration after validating
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Recipe name
    #[arg(value_name = "RECIPE")]
    pub recipe: String,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Output format for the info command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Apply command-line overrides to an assembled run.
pub fn apply_overrides(spec: &mut RunSpec, args: &TrainArgs) {
    if let Some(epochs) = args.epochs {
        spec.train_params.num_epochs = epochs;
    }
    if let Some(lr) = args.lr {
        spec.train_params.optimizer.lr = lr;
    }
    if let Some(batch_size) = args.batch_size {
        set_batch_size(&mut spec.data.train_batching, batch_size);
        set_batch_size(&mut spec.data.eval_batching, batch_size);
    }
    if args.seed.is_some() {
        spec.seed = args.seed;
    }
    if args.notes.is_some() {
        spec.notes = args.notes.clone();
    }
}

fn set_batch_size(policy: &mut BatchingPolicy, size: usize) {
    match policy {
        BatchingPolicy::Shuffled { batch_size }
        | BatchingPolicy::Clustered { batch_size, .. } => *batch_size = size,
    }
}
