//! Attention mechanism descriptors

use super::layers::SequenceMapper;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Similarity function between context and question positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "similarity", rename_all = "snake_case")]
pub enum Similarity {
    /// Trilinear similarity `w · [c; q; c ∘ q]`
    TriLinear { bias: bool },

    /// Plain dot product
    Dot,
}

impl Similarity {
    pub fn tri_linear(bias: bool) -> Self {
        Similarity::TriLinear { bias }
    }
}

/// How attended vectors are combined with the original sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "merge", rename_all = "snake_case")]
pub enum AttentionMerge {
    /// Concatenate input and attended vectors
    Concat,

    /// Concatenate input, attended vectors, and their elementwise product
    ConcatWithProduct,

    /// Project before taking the product; optionally tile the pooled
    /// vector across time before merging
    WithProjectedProduct { include_tiled: bool },
}

/// Context-question attention mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attention", rename_all = "snake_case")]
pub enum Attention {
    /// Bidirectional attention flow: context-to-question plus optional
    /// question-to-context attention, merged by concatenation/product
    BiAttention {
        similarity: Similarity,
        query_to_context: bool,
    },

    /// One-directional attention with an explicit merge rule
    Static {
        similarity: Similarity,
        merge: AttentionMerge,
    },
}

impl Attention {
    pub fn bi_attention(similarity: Similarity, query_to_context: bool) -> Self {
        Attention::BiAttention {
            similarity,
            query_to_context,
        }
    }

    pub fn static_attention(similarity: Similarity, merge: AttentionMerge) -> Self {
        Attention::Static { similarity, merge }
    }

    pub fn validate(&self) -> Result<()> {
        // All variants are fully described by enumerated choices.
        Ok(())
    }
}

/// Attention pooled to a single vector, with an optional post-process
/// mapper applied to the pooled result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionEncoder {
    pub post_process: SequenceMapper,
}

impl AttentionEncoder {
    pub fn new(post_process: SequenceMapper) -> Self {
        Self { post_process }
    }

    pub fn validate(&self) -> Result<()> {
        self.post_process.validate()
    }

    pub fn node_count(&self) -> usize {
        1 + self.post_process.node_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attention_yaml_round_trip() {
        let attention = Attention::static_attention(
            Similarity::tri_linear(true),
            AttentionMerge::ConcatWithProduct,
        );
        let yaml = serde_yaml::to_string(&attention).unwrap();
        let restored: Attention = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(restored, attention);
    }

    #[test]
    fn test_attention_encoder_count() {
        let encoder = AttentionEncoder::new(SequenceMapper::seq(vec![SequenceMapper::Null]));
        assert_eq!(encoder.node_count(), 3);
    }
}
