//! Span predictor descriptors

use super::attention::{AttentionEncoder, AttentionMerge};
use super::layers::{BiMapper, SequenceMapper};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// How multi-occurrence answer scores are combined into one span score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    Sum,
    Max,
}

/// Prediction head mapping the matched context to span start/end scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "predictor", rename_all = "snake_case")]
pub enum SpanPredictor {
    /// Score span starts from `start`, then score ends from the start
    /// layer's output concatenated with the input
    ChainConcat {
        start: Box<SequenceMapper>,
        end: Box<SequenceMapper>,
    },

    /// Pool a fixed-size context encoding, merge it back into the
    /// sequence, and score both bounds with a chained bi-mapper
    WithFixedContext {
        context_mapper: Box<SequenceMapper>,
        context_encoder: AttentionEncoder,
        merge: AttentionMerge,
        bounds: BiMapper,
        aggregate: Aggregate,
    },
}

impl SpanPredictor {
    pub fn chain_concat(start: SequenceMapper, end: SequenceMapper) -> Self {
        SpanPredictor::ChainConcat {
            start: Box::new(start),
            end: Box::new(end),
        }
    }

    pub fn with_fixed_context(
        context_mapper: SequenceMapper,
        context_encoder: AttentionEncoder,
        merge: AttentionMerge,
        bounds: BiMapper,
        aggregate: Aggregate,
    ) -> Self {
        SpanPredictor::WithFixedContext {
            context_mapper: Box::new(context_mapper),
            context_encoder,
            merge,
            bounds,
            aggregate,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            SpanPredictor::ChainConcat { start, end } => {
                start.validate()?;
                end.validate()
            }
            SpanPredictor::WithFixedContext {
                context_mapper,
                context_encoder,
                bounds,
                ..
            } => {
                context_mapper.validate()?;
                context_encoder.validate()?;
                bounds.validate()
            }
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            SpanPredictor::ChainConcat { start, end } => {
                1 + start.node_count() + end.node_count()
            }
            SpanPredictor::WithFixedContext {
                context_mapper,
                context_encoder,
                bounds,
                ..
            } => 1 + context_mapper.node_count() + context_encoder.node_count() + bounds.node_count(),
        }
    }
}
