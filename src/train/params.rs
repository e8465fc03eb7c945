//! Training hyperparameter record

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Supported optimizer families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    Adam,
    Adadelta,
    Sgd,
    Adagrad,
    Rmsprop,
}

impl OptimizerKind {
    pub const ALL: [OptimizerKind; 5] = [
        OptimizerKind::Adam,
        OptimizerKind::Adadelta,
        OptimizerKind::Sgd,
        OptimizerKind::Adagrad,
        OptimizerKind::Rmsprop,
    ];
}

impl FromStr for OptimizerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "adam" => Ok(OptimizerKind::Adam),
            "adadelta" => Ok(OptimizerKind::Adadelta),
            "sgd" => Ok(OptimizerKind::Sgd),
            "adagrad" => Ok(OptimizerKind::Adagrad),
            "rmsprop" => Ok(OptimizerKind::Rmsprop),
            name => Err(Error::Config(format!(
                "Unknown optimizer: {name}. Supported: adam, adadelta, sgd, adagrad, rmsprop"
            ))),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptimizerKind::Adam => "adam",
            OptimizerKind::Adadelta => "adadelta",
            OptimizerKind::Sgd => "sgd",
            OptimizerKind::Adagrad => "adagrad",
            OptimizerKind::Rmsprop => "rmsprop",
        };
        write!(f, "{name}")
    }
}

/// Serializable optimizer choice: family, learning rate, and any extra
/// family-specific parameters (betas, momentum, decay).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSpec {
    pub kind: OptimizerKind,

    pub lr: f32,

    #[serde(flatten)]
    pub params: HashMap<String, serde_json::Value>,
}

impl OptimizerSpec {
    /// Parse the optimizer name and check the learning rate; fails fast on
    /// an unrecognized name.
    pub fn new(name: &str, lr: f32) -> Result<Self> {
        let spec = Self {
            kind: name.parse()?,
            lr,
            params: HashMap::new(),
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.lr <= 0.0 || !self.lr.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "learning rate {} must be positive and finite",
                self.lr
            )));
        }
        Ok(())
    }
}

/// Immutable bag of run settings handed to the external training loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainParams {
    pub optimizer: OptimizerSpec,

    /// Number of passes over the training split
    #[serde(default = "default_epochs")]
    pub num_epochs: usize,

    /// Exponential-moving-average decay for eval-time weights, in (0, 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ema: Option<f32>,

    /// Checkpoints retained before the oldest is deleted
    #[serde(default = "default_max_checkpoints")]
    pub max_checkpoints_to_keep: usize,

    /// Log training metrics every N steps
    #[serde(default = "default_log_period")]
    pub log_period: usize,

    /// Run the evaluators every N steps
    #[serde(default = "default_eval_period")]
    pub eval_period: usize,

    /// Persist a checkpoint every N steps
    #[serde(default = "default_save_period")]
    pub save_period: usize,

    /// Per-split cap on evaluated examples; `None` evaluates the full split
    #[serde(default)]
    pub eval_samples: BTreeMap<String, Option<usize>>,
}

fn default_epochs() -> usize {
    10
}

fn default_max_checkpoints() -> usize {
    5
}

fn default_log_period() -> usize {
    30
}

fn default_eval_period() -> usize {
    1000
}

fn default_save_period() -> usize {
    1000
}

impl TrainParams {
    pub fn new(optimizer: OptimizerSpec) -> Self {
        Self {
            optimizer,
            num_epochs: default_epochs(),
            ema: None,
            max_checkpoints_to_keep: default_max_checkpoints(),
            log_period: default_log_period(),
            eval_period: default_eval_period(),
            save_period: default_save_period(),
            eval_samples: BTreeMap::new(),
        }
    }

    pub fn with_epochs(mut self, num_epochs: usize) -> Self {
        self.num_epochs = num_epochs;
        self
    }

    pub fn with_ema(mut self, decay: f32) -> Self {
        self.ema = Some(decay);
        self
    }

    pub fn with_max_checkpoints(mut self, keep: usize) -> Self {
        self.max_checkpoints_to_keep = keep;
        self
    }

    pub fn with_periods(mut self, log: usize, eval: usize, save: usize) -> Self {
        self.log_period = log;
        self.eval_period = eval;
        self.save_period = save;
        self
    }

    /// Cap the evaluated examples for one split; `None` means the full split.
    pub fn with_eval_samples(mut self, split: impl Into<String>, cap: Option<usize>) -> Self {
        self.eval_samples.insert(split.into(), cap);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.optimizer.validate()?;
        if self.num_epochs == 0 {
            return Err(Error::InvalidParameter(
                "epoch count must be positive".to_string(),
            ));
        }
        if let Some(ema) = self.ema {
            if !(ema > 0.0 && ema < 1.0) {
                return Err(Error::InvalidParameter(format!(
                    "EMA decay {ema} must be in (0, 1)"
                )));
            }
        }
        if self.max_checkpoints_to_keep == 0 {
            return Err(Error::InvalidParameter(
                "at least one checkpoint must be kept".to_string(),
            ));
        }
        for (name, period) in [
            ("log", self.log_period),
            ("eval", self.eval_period),
            ("save", self.save_period),
        ] {
            if period == 0 {
                return Err(Error::InvalidParameter(format!(
                    "{name} period must be positive"
                )));
            }
        }
        if let Some((split, _)) = self.eval_samples.iter().find(|(_, cap)| **cap == Some(0)) {
            return Err(Error::InvalidParameter(format!(
                "eval sample cap for split {split} must be positive when set"
            )));
        }
        Ok(())
    }
}
