//! Comprender CLI
//!
//! Assembles named run recipes and hands them to the training backend.
//!
//! # Usage
//!
//! ```bash
//! # Launch a run
//! comprender train bidaf runs/bidaf-1
//!
//! # Launch with overrides
//! comprender train bidaf runs/bidaf-2 --epochs 6 --lr 0.0005
//!
//! # Validate a recipe
//! comprender validate static-attention
//!
//! # Show the assembled configuration
//! comprender info bidaf --format yaml
//! ```

use clap::Parser;
use comprender::config::{
    apply_overrides, Cli, Command, InfoArgs, OutputFormat, TrainArgs, ValidateArgs,
};
use comprender::recipes;
use comprender::run::{launch, DryRunBackend};
use comprender::train::ModelDir;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        LogLevel::Quiet
    } else if cli.verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Normal
    };

    let result = match cli.command {
        Command::Train(args) => run_train(args, log_level),
        Command::Validate(args) => run_validate(args, log_level),
        Command::Info(args) => run_info(args, log_level),
        Command::List => run_list(log_level),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum LogLevel {
    Quiet,
    Normal,
    Verbose,
}

fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level != LogLevel::Quiet && (level == required || required == LogLevel::Normal) {
        println!("{msg}");
    }
}

fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Comprender: assembling recipe {}", args.recipe),
    );

    let mut spec = recipes::recipe(&args.recipe).map_err(|e| format!("Recipe error: {e}"))?;
    apply_overrides(&mut spec, &args);
    spec.validate().map_err(|e| format!("Config error: {e}"))?;

    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  Optimizer: {} (lr={})",
            spec.train_params.optimizer.kind, spec.train_params.optimizer.lr
        ),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!("  Epochs: {}", spec.train_params.num_epochs),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!("  Batch size: {}", spec.data.train_batching.batch_size()),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!("  Model nodes: {}", spec.model.node_count()),
    );

    if args.dry_run {
        log(
            level,
            LogLevel::Normal,
            "Dry run - run assembled and validated successfully",
        );
        return Ok(());
    }

    let dir = ModelDir::create(&args.out_dir).map_err(|e| format!("Run directory error: {e}"))?;
    let mut backend = DryRunBackend::new();
    launch(spec, &dir, args.resume, &mut backend).map_err(|e| format!("Launch error: {e}"))?;

    if let Some(summary) = backend.last_summary {
        log(level, LogLevel::Normal, &format!("Would train: {summary}"));
    }
    log(
        level,
        LogLevel::Normal,
        &format!("Run persisted to {}", args.out_dir.display()),
    );
    Ok(())
}

fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Validating recipe: {}", args.recipe),
    );

    let spec = recipes::recipe(&args.recipe).map_err(|e| format!("Recipe error: {e}"))?;
    spec.validate().map_err(|e| format!("Validation failed: {e}"))?;

    log(level, LogLevel::Normal, "Configuration is valid");

    if args.detailed {
        println!();
        println!("Configuration Summary:");
        println!("  Corpus: {}", spec.data.corpus.name);
        println!(
            "  Optimizer: {} (lr={})",
            spec.train_params.optimizer.kind, spec.train_params.optimizer.lr
        );
        println!("  Epochs: {}", spec.train_params.num_epochs);
        if let Some(ema) = spec.train_params.ema {
            println!("  EMA decay: {ema}");
        }
        println!(
            "  Periods: log={} eval={} save={}",
            spec.train_params.log_period,
            spec.train_params.eval_period,
            spec.train_params.save_period
        );
        println!("  Train batching: {:?}", spec.data.train_batching);
        println!("  Eval batching: {:?}", spec.data.eval_batching);
        println!("  Model nodes: {}", spec.model.node_count());
        println!("  Evaluators: {}", spec.evaluators.len());
    }

    Ok(())
}

fn run_info(args: InfoArgs, level: LogLevel) -> Result<(), String> {
    let spec = recipes::recipe(&args.recipe).map_err(|e| format!("Recipe error: {e}"))?;

    match args.format {
        OutputFormat::Text => {
            log(level, LogLevel::Normal, "Recipe Info:");
            println!();
            println!("Recipe: {}", args.recipe);
            println!("Corpus: {}", spec.data.corpus.name);
            println!(
                "Optimizer: {} (lr={})",
                spec.train_params.optimizer.kind, spec.train_params.optimizer.lr
            );
            println!("Epochs: {}", spec.train_params.num_epochs);
            println!("Model nodes: {}", spec.model.node_count());
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&spec)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = spec
                .to_yaml()
                .map_err(|e| format!("YAML serialization error: {e}"))?;
            println!("{yaml}");
        }
    }

    Ok(())
}

fn run_list(level: LogLevel) -> Result<(), String> {
    log(level, LogLevel::Normal, "Available recipes:");
    for name in recipes::RECIPES {
        println!("  {name}");
    }
    Ok(())
}
