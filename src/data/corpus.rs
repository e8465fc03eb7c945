//! Corpus handle and assembled training data

use super::BatchingPolicy;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Opaque reference to a dataset.
///
/// The crate only names the corpus and its splits; loading, tokenization,
/// and lifecycle belong to the external data pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusHandle {
    pub name: String,

    #[serde(default = "default_splits")]
    pub splits: Vec<String>,
}

fn default_splits() -> Vec<String> {
    vec!["train".to_string(), "dev".to_string()]
}

impl CorpusHandle {
    /// Corpus with the conventional `train`/`dev` splits.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            splits: default_splits(),
        }
    }

    pub fn has_split(&self, split: &str) -> bool {
        self.splits.iter().any(|s| s == split)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Config("corpus needs a name".to_string()));
        }
        if self.splits.is_empty() {
            return Err(Error::Config(format!(
                "corpus {} needs at least one split",
                self.name
            )));
        }
        Ok(())
    }
}

/// The data input bundle handed to `start_training`: a corpus plus the
/// batching policies used for training and evaluation passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingData {
    pub corpus: CorpusHandle,
    pub train_batching: BatchingPolicy,
    pub eval_batching: BatchingPolicy,

    /// Optional cap on loaded examples (smoke runs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_limit: Option<usize>,
}

impl TrainingData {
    pub fn new(
        corpus: CorpusHandle,
        train_batching: BatchingPolicy,
        eval_batching: BatchingPolicy,
    ) -> Self {
        Self {
            corpus,
            train_batching,
            eval_batching,
            sample_limit: None,
        }
    }

    pub fn with_sample_limit(mut self, limit: usize) -> Self {
        self.sample_limit = Some(limit);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.corpus.validate()?;
        self.train_batching.validate()?;
        self.eval_batching.validate()?;
        if self.sample_limit == Some(0) {
            return Err(Error::InvalidParameter(
                "sample limit must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}
