//! Word and character embedder descriptors

use super::layers::SequenceMapper;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Fixed pretrained word embeddings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEmbedder {
    /// Name of the pretrained vector set (e.g. `glove.840B.300d`)
    pub vec_name: String,

    /// Scale of the random init used for out-of-vocabulary words
    #[serde(default)]
    pub init_scale: f32,

    /// Train the unknown-word vector instead of keeping it fixed
    #[serde(default)]
    pub learn_unk: bool,
}

impl WordEmbedder {
    /// Fixed embeddings with zero OOV init and a frozen unknown vector.
    pub fn fixed(vec_name: impl Into<String>) -> Self {
        Self {
            vec_name: vec_name.into(),
            init_scale: 0.0,
            learn_unk: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.vec_name.is_empty() {
            return Err(Error::Config(
                "word embedder needs a pretrained vector-set name".to_string(),
            ));
        }
        if self.init_scale < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "word embedder init scale {} must be non-negative",
                self.init_scale
            )));
        }
        Ok(())
    }
}

/// Learned character-level embeddings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharEmbedder {
    /// Words longer than this are truncated before char embedding
    pub word_length_th: usize,

    /// Characters rarer than this count are mapped to unknown
    pub char_th: usize,

    /// Dimension of each character vector
    pub char_dim: usize,

    /// Scale of the random init
    #[serde(default = "default_char_init_scale")]
    pub init_scale: f32,
}

fn default_char_init_scale() -> f32 {
    0.05
}

impl CharEmbedder {
    pub fn learned(word_length_th: usize, char_th: usize, char_dim: usize) -> Result<Self> {
        let embedder = Self {
            word_length_th,
            char_th,
            char_dim,
            init_scale: default_char_init_scale(),
        };
        embedder.validate()?;
        Ok(embedder)
    }

    pub fn with_init_scale(mut self, init_scale: f32) -> Self {
        self.init_scale = init_scale;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.word_length_th == 0 || self.char_dim == 0 {
            return Err(Error::InvalidParameter(
                "char embedder needs positive word-length threshold and char dim".to_string(),
            ));
        }
        if self.init_scale < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "char embedder init scale {} must be non-negative",
                self.init_scale
            )));
        }
        Ok(())
    }
}

/// Character embeddings pooled to one vector per word.
///
/// `layer` reduces the per-character sequence of each word (e.g. a
/// max-pooled convolution, or a recurrent encoder over time).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharWordEmbedder {
    pub embedder: CharEmbedder,
    pub layer: SequenceMapper,

    /// Share parameters between the context and question branches
    #[serde(default)]
    pub shared_parameters: bool,
}

impl CharWordEmbedder {
    pub fn new(embedder: CharEmbedder, layer: SequenceMapper, shared_parameters: bool) -> Self {
        Self {
            embedder,
            layer,
            shared_parameters,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.embedder.validate()?;
        self.layer.validate()
    }

    pub fn node_count(&self) -> usize {
        // embedder node plus the pooling subtree
        1 + self.layer.node_count()
    }
}
