//! Input and answer encoding descriptors
//!
//! These nodes tell the external data pipeline how to encode passages,
//! questions, and answer labels into batch tensors.

use serde::{Deserialize, Serialize};

/// How answer labels are encoded for the loss function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerEncoder {
    /// One gold span per example (start and end indices)
    SingleSpan,

    /// Dense 0/1 vectors marking every token inside any gold span
    DenseMultiSpan,
}

/// Batch encoding for a document/question pair plus its answer labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAndQuestionEncoder {
    pub answer_encoder: AnswerEncoder,
}

impl DocumentAndQuestionEncoder {
    pub fn new(answer_encoder: AnswerEncoder) -> Self {
        Self { answer_encoder }
    }
}
