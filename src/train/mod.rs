//! Training-side run configuration
//!
//! Hyperparameter records, evaluator specifications, and the model output
//! directory. The optimization loop itself lives behind the
//! [`crate::run::TrainingBackend`] seam.

mod evaluator;
mod model_dir;
mod params;

pub use evaluator::{
    build_evaluators, BatchOutput, BoundedSpanEvaluator, Evaluation, Evaluator, EvaluatorSpec,
    LossEvaluator, SentenceSpanEvaluator, SpanEvaluator, SpanLabel, SpanPrediction,
};
pub use model_dir::{ModelDir, RunRecord};
pub use params::{OptimizerKind, OptimizerSpec, TrainParams};
