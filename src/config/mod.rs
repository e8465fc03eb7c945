//! Command-line interface
//!
//! Argument types and override handling for the `comprender` binary.

mod cli;

pub use cli::{
    apply_overrides, Cli, Command, InfoArgs, OutputFormat, TrainArgs, ValidateArgs,
};
