//! # Comprender: Span-Extraction QA Run Assembly
//!
//! Comprender assembles training runs for neural span-extraction
//! question-answering models (SQuAD/TriviaQA-style). It contributes the
//! configuration side of a run; the actual gradient computation and
//! optimization are delegated to an external training backend behind the
//! [`run::TrainingBackend`] seam.
//!
//! ## Architecture
//!
//! - **model**: declarative layer-descriptor tree (embedders, sequence
//!   mappers, attention, span predictors)
//! - **train**: hyperparameter records, evaluator specs, model directories
//! - **data**: batching policies and corpus handles
//! - **run**: run assembly and the `start_training` entry point
//! - **recipes**: complete, named run configurations

pub mod config;
pub mod data;
pub mod model;
pub mod recipes;
pub mod run;
pub mod train;

pub mod error;

// Re-export commonly used types
pub use error::{Error, Result};
pub use run::{start_training, RunSpec};
