//! Data-side run configuration
//!
//! Batching policies decide how examples are grouped into mini-batches;
//! the corpus handle names the dataset a run trains on. Actual corpus
//! loading and tokenization are owned by the external data pipeline.

mod batching;
mod corpus;

pub use batching::{BatchingPolicy, LengthKey};
pub use corpus::{CorpusHandle, TrainingData};
