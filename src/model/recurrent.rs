//! Recurrent cell and encoder descriptors

use super::layers::check_keep_prob;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Specification of a recurrent cell.
///
/// `keep_prob` is the recurrent dropout keep-probability; `1.0` disables
/// dropout inside the cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell", rename_all = "lowercase")]
pub enum RecurrentCell {
    Lstm { hidden: usize, keep_prob: f32 },
    Gru { hidden: usize, keep_prob: f32 },
}

impl RecurrentCell {
    /// LSTM cell with recurrent dropout.
    pub fn lstm(hidden: usize, keep_prob: f32) -> Result<Self> {
        check_hidden(hidden)?;
        check_keep_prob(keep_prob, "recurrent cell")?;
        Ok(RecurrentCell::Lstm { hidden, keep_prob })
    }

    /// GRU cell without dropout.
    pub fn gru(hidden: usize) -> Result<Self> {
        check_hidden(hidden)?;
        Ok(RecurrentCell::Gru {
            hidden,
            keep_prob: 1.0,
        })
    }

    pub fn hidden_units(&self) -> usize {
        match self {
            RecurrentCell::Lstm { hidden, .. } | RecurrentCell::Gru { hidden, .. } => *hidden,
        }
    }

    pub fn keep_prob(&self) -> f32 {
        match self {
            RecurrentCell::Lstm { keep_prob, .. } | RecurrentCell::Gru { keep_prob, .. } => {
                *keep_prob
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_hidden(self.hidden_units())?;
        check_keep_prob(self.keep_prob(), "recurrent cell")
    }
}

fn check_hidden(hidden: usize) -> Result<()> {
    if hidden == 0 {
        return Err(Error::InvalidParameter(
            "recurrent cell needs a positive hidden size".to_string(),
        ));
    }
    Ok(())
}

/// Recurrent pass that reduces a sequence to a single vector.
///
/// `output_units` optionally projects the final state; `None` keeps the
/// cell's hidden size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecurrentEncoder {
    pub cell: RecurrentCell,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_units: Option<usize>,
}

impl RecurrentEncoder {
    pub fn new(cell: RecurrentCell) -> Self {
        Self {
            cell,
            output_units: None,
        }
    }

    pub fn with_output_units(mut self, units: usize) -> Self {
        self.output_units = Some(units);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.cell.validate()?;
        if self.output_units == Some(0) {
            return Err(Error::InvalidParameter(
                "recurrent encoder projection needs a positive size".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lstm_constructor() {
        let cell = RecurrentCell::lstm(100, 0.8).unwrap();
        assert_eq!(cell.hidden_units(), 100);
        assert!((cell.keep_prob() - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_gru_defaults_to_no_dropout() {
        let cell = RecurrentCell::gru(80).unwrap();
        assert!((cell.keep_prob() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_hidden_rejected() {
        assert!(RecurrentCell::lstm(0, 0.8).is_err());
        assert!(RecurrentCell::gru(0).is_err());
    }

    #[test]
    fn test_bad_keep_prob_rejected() {
        assert!(RecurrentCell::lstm(100, 1.5).is_err());
    }

    #[test]
    fn test_encoder_projection_validation() {
        let encoder = RecurrentEncoder::new(RecurrentCell::gru(50).unwrap());
        assert!(encoder.validate().is_ok());
        assert!(encoder.with_output_units(0).validate().is_err());
    }
}
