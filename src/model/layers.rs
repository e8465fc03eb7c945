//! Sequence mapper descriptors
//!
//! A [`SequenceMapper`] transforms a batched token sequence into another
//! sequence of the same length. Mappers nest freely: `Seq` chains them,
//! `Residual` wraps one with a skip connection, and `Reduce` pools an inner
//! mapper's output over time.

use super::attention::{AttentionMerge, Similarity};
use super::recurrent::{RecurrentCell, RecurrentEncoder};
use super::Activation;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Check a dropout keep-probability is in `[0, 1]`.
pub(crate) fn check_keep_prob(keep_prob: f32, what: &str) -> Result<()> {
    if !(0.0..=1.0).contains(&keep_prob) {
        return Err(Error::InvalidParameter(format!(
            "{what} keep-probability {keep_prob} out of range [0, 1]"
        )));
    }
    Ok(())
}

/// Pooling operation used by [`SequenceMapper::Reduce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReduceOp {
    Max,
    Mean,
    Sum,
}

/// A sequence-to-sequence layer descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layer", rename_all = "snake_case")]
pub enum SequenceMapper {
    /// Identity mapper
    Null,

    /// Dropout with the given keep-probability
    Dropout { keep_prob: f32 },

    /// Dense projection applied per time step
    FullyConnected { units: usize, activation: Activation },

    /// Highway layer (gated identity/transform mix)
    Highway { activation: Activation },

    /// 1-D convolution over time
    Conv1d {
        filters: usize,
        kernel_width: usize,
        keep_prob: f32,
    },

    /// Pool an inner mapper's output over time
    Reduce {
        op: ReduceOp,
        inner: Box<SequenceMapper>,
    },

    /// Skip connection around an inner mapper
    Residual { inner: Box<SequenceMapper> },

    /// Ordered chain of sub-mappers
    Seq { layers: Vec<SequenceMapper> },

    /// Attend from the sequence onto itself and merge the attended vectors
    SelfAttention {
        similarity: Similarity,
        merge: AttentionMerge,
    },

    /// Bidirectional recurrent pass
    BiRecurrent { cell: RecurrentCell },

    /// Run a recurrent encoder over an inner time axis, producing one
    /// vector per outer step (used to pool character embeddings per word)
    EncodeOverTime { encoder: RecurrentEncoder, mask: bool },
}

impl SequenceMapper {
    /// Dropout layer; fails if `keep_prob` is outside `[0, 1]`.
    pub fn dropout(keep_prob: f32) -> Result<Self> {
        check_keep_prob(keep_prob, "dropout")?;
        Ok(SequenceMapper::Dropout { keep_prob })
    }

    /// Dense projection; fails if `units` is zero.
    pub fn fully_connected(units: usize, activation: Activation) -> Result<Self> {
        if units == 0 {
            return Err(Error::InvalidParameter(
                "fully-connected layer needs at least one unit".to_string(),
            ));
        }
        Ok(SequenceMapper::FullyConnected { units, activation })
    }

    pub fn highway(activation: Activation) -> Self {
        SequenceMapper::Highway { activation }
    }

    /// 1-D convolution; fails on zero filters/width or bad keep-prob.
    pub fn conv1d(filters: usize, kernel_width: usize, keep_prob: f32) -> Result<Self> {
        if filters == 0 || kernel_width == 0 {
            return Err(Error::InvalidParameter(format!(
                "conv1d needs positive filters and kernel width, got {filters}x{kernel_width}"
            )));
        }
        check_keep_prob(keep_prob, "conv1d")?;
        Ok(SequenceMapper::Conv1d {
            filters,
            kernel_width,
            keep_prob,
        })
    }

    pub fn reduce(op: ReduceOp, inner: SequenceMapper) -> Self {
        SequenceMapper::Reduce {
            op,
            inner: Box::new(inner),
        }
    }

    pub fn residual(inner: SequenceMapper) -> Self {
        SequenceMapper::Residual {
            inner: Box::new(inner),
        }
    }

    pub fn seq(layers: Vec<SequenceMapper>) -> Self {
        SequenceMapper::Seq { layers }
    }

    pub fn self_attention(similarity: Similarity, merge: AttentionMerge) -> Self {
        SequenceMapper::SelfAttention { similarity, merge }
    }

    pub fn bi_recurrent(cell: RecurrentCell) -> Self {
        SequenceMapper::BiRecurrent { cell }
    }

    pub fn encode_over_time(encoder: RecurrentEncoder, mask: bool) -> Self {
        SequenceMapper::EncodeOverTime { encoder, mask }
    }

    /// Validate this mapper and every nested descriptor.
    pub fn validate(&self) -> Result<()> {
        match self {
            SequenceMapper::Null | SequenceMapper::Highway { .. } => Ok(()),
            SequenceMapper::Dropout { keep_prob } => check_keep_prob(*keep_prob, "dropout"),
            SequenceMapper::FullyConnected { units, .. } => {
                if *units == 0 {
                    Err(Error::InvalidParameter(
                        "fully-connected layer needs at least one unit".to_string(),
                    ))
                } else {
                    Ok(())
                }
            }
            SequenceMapper::Conv1d {
                filters,
                kernel_width,
                keep_prob,
            } => {
                if *filters == 0 || *kernel_width == 0 {
                    return Err(Error::InvalidParameter(format!(
                        "conv1d needs positive filters and kernel width, got {filters}x{kernel_width}"
                    )));
                }
                check_keep_prob(*keep_prob, "conv1d")
            }
            SequenceMapper::Reduce { inner, .. } => inner.validate(),
            SequenceMapper::Residual { inner } => inner.validate(),
            SequenceMapper::Seq { layers } => {
                for layer in layers {
                    layer.validate()?;
                }
                Ok(())
            }
            SequenceMapper::SelfAttention { .. } => Ok(()),
            SequenceMapper::BiRecurrent { cell } => cell.validate(),
            SequenceMapper::EncodeOverTime { encoder, .. } => encoder.validate(),
        }
    }

    /// Number of descriptor nodes in this subtree.
    pub fn node_count(&self) -> usize {
        match self {
            SequenceMapper::Reduce { inner, .. } | SequenceMapper::Residual { inner } => {
                1 + inner.node_count()
            }
            SequenceMapper::Seq { layers } => {
                1 + layers.iter().map(SequenceMapper::node_count).sum::<usize>()
            }
            _ => 1,
        }
    }
}

/// Paired mapper applied to context and question together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layer", rename_all = "snake_case")]
pub enum BiMapper {
    /// Leave both sequences unchanged
    Null,

    /// Run `first`, then `second`, over the concatenated pair
    Chain {
        first: Box<SequenceMapper>,
        second: Box<SequenceMapper>,
    },
}

impl BiMapper {
    pub fn chain(first: SequenceMapper, second: SequenceMapper) -> Self {
        BiMapper::Chain {
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            BiMapper::Null => Ok(()),
            BiMapper::Chain { first, second } => {
                first.validate()?;
                second.validate()
            }
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            BiMapper::Null => 1,
            BiMapper::Chain { first, second } => 1 + first.node_count() + second.node_count(),
        }
    }
}
