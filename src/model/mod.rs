//! Declarative layer-descriptor tree
//!
//! A model architecture is described before execution as an immutable tree
//! of typed descriptor nodes: embedders, sequence mappers, attention
//! mechanisms, and span predictors. No computation happens at construction
//! time; constructors only check that scalar parameters are in range and
//! that enumerated choices are known. The external training backend walks
//! the tree to build the executable graph.
//!
//! # Example
//!
//! ```
//! use comprender::model::{Activation, SequenceMapper, RecurrentCell};
//!
//! let mapper = SequenceMapper::seq(vec![
//!     SequenceMapper::highway(Activation::Relu),
//!     SequenceMapper::bi_recurrent(RecurrentCell::lstm(100, 0.8).unwrap()),
//! ]);
//! assert_eq!(mapper.node_count(), 3);
//! ```

mod activation;
mod attention;
mod embedder;
mod encoder;
mod layers;
mod prediction;
mod recurrent;

#[cfg(test)]
mod property_tests;

pub use activation::Activation;
pub use attention::{Attention, AttentionEncoder, AttentionMerge, Similarity};
pub use embedder::{CharEmbedder, CharWordEmbedder, WordEmbedder};
pub use encoder::{AnswerEncoder, DocumentAndQuestionEncoder};
pub use layers::{BiMapper, ReduceOp, SequenceMapper};
pub use prediction::{Aggregate, SpanPredictor};
pub use recurrent::{RecurrentCell, RecurrentEncoder};

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Top-level model descriptor: how raw tokens become a predicted answer span.
///
/// Mirrors the stages of an attention-based reading comprehension model:
/// embed words and characters, map the embedded sequences, attend between
/// context and question, encode the match, and predict span bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaModel {
    /// Input/label encoding for the external data pipeline
    pub encoder: DocumentAndQuestionEncoder,

    /// Fixed pretrained word embeddings
    pub word_embed: WordEmbedder,

    /// Optional learned character-level embeddings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_embed: Option<CharWordEmbedder>,

    /// Mapper applied to both embedded sequences
    pub embed_mapper: SequenceMapper,

    /// Extra mapper applied to the question only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_mapper: Option<SequenceMapper>,

    /// Extra mapper applied to the context only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_mapper: Option<SequenceMapper>,

    /// Paired context/question mapping before attention
    pub memory_builder: BiMapper,

    /// Context-question attention mechanism
    pub attention: Attention,

    /// Mapper over the attended (matched) context
    pub match_encoder: SequenceMapper,

    /// Span prediction head
    pub predictor: SpanPredictor,
}

impl QaModel {
    /// Validate every node of the descriptor tree.
    pub fn validate(&self) -> Result<()> {
        self.word_embed.validate()?;
        if let Some(char_embed) = &self.char_embed {
            char_embed.validate()?;
        }
        self.embed_mapper.validate()?;
        if let Some(mapper) = &self.question_mapper {
            mapper.validate()?;
        }
        if let Some(mapper) = &self.context_mapper {
            mapper.validate()?;
        }
        self.memory_builder.validate()?;
        self.attention.validate()?;
        self.match_encoder.validate()?;
        self.predictor.validate()
    }

    /// Total number of descriptor nodes in the tree.
    ///
    /// Scalar parameters (keep-probabilities, hidden sizes) do not affect
    /// this count; only the tree's topology does.
    pub fn node_count(&self) -> usize {
        let mut count = 1; // word_embed
        if let Some(char_embed) = &self.char_embed {
            count += char_embed.node_count();
        }
        count += self.embed_mapper.node_count();
        if let Some(mapper) = &self.question_mapper {
            count += mapper.node_count();
        }
        if let Some(mapper) = &self.context_mapper {
            count += mapper.node_count();
        }
        count += self.memory_builder.node_count();
        count += 1; // attention
        count += self.match_encoder.node_count();
        count += self.predictor.node_count();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_model() -> QaModel {
        QaModel {
            encoder: DocumentAndQuestionEncoder::new(AnswerEncoder::SingleSpan),
            word_embed: WordEmbedder::fixed("glove.6B.100d"),
            char_embed: None,
            embed_mapper: SequenceMapper::Null,
            question_mapper: None,
            context_mapper: None,
            memory_builder: BiMapper::Null,
            attention: Attention::bi_attention(Similarity::tri_linear(true), true),
            match_encoder: SequenceMapper::Null,
            predictor: SpanPredictor::chain_concat(SequenceMapper::Null, SequenceMapper::Null),
        }
    }

    #[test]
    fn test_minimal_model_validates() {
        assert!(minimal_model().validate().is_ok());
    }

    #[test]
    fn test_node_count_stable_under_scalar_change() {
        let mut model = minimal_model();
        model.embed_mapper = SequenceMapper::dropout(0.8).unwrap();
        let before = model.node_count();

        model.embed_mapper = SequenceMapper::dropout(0.5).unwrap();
        assert_eq!(model.node_count(), before);
    }

    #[test]
    fn test_invalid_subtree_fails_validation() {
        let mut model = minimal_model();
        model.embed_mapper = SequenceMapper::Dropout { keep_prob: 1.5 };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_model_yaml_round_trip() {
        let model = minimal_model();
        let yaml = serde_yaml::to_string(&model).unwrap();
        let restored: QaModel = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(restored, model);
    }
}
