//! Evaluation metrics over predicted answer spans
//!
//! Evaluators consume model outputs (already-extracted span predictions
//! plus per-example losses) and batch labels, and produce an ordered map
//! of scalar metrics. The serializable [`EvaluatorSpec`] list is part of
//! the persisted run; [`build_evaluators`] turns it into runtime objects.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serializable evaluator choice, part of the run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluatorSpec {
    /// Mean loss over the evaluated examples
    Loss,

    /// Exact-match and token-F1 of predicted spans
    Span,

    /// Accuracy of placing the prediction in a gold answer sentence
    SentenceSpan,

    /// EM/F1 per answer-length bound; longer predictions count as wrong
    BoundedSpan { bounds: Vec<usize> },
}

impl EvaluatorSpec {
    pub fn validate(&self) -> Result<()> {
        if let EvaluatorSpec::BoundedSpan { bounds } = self {
            if bounds.is_empty() {
                return Err(Error::Config(
                    "bounded-span evaluator needs at least one bound".to_string(),
                ));
            }
            if bounds.contains(&0) {
                return Err(Error::InvalidParameter(
                    "span length bounds must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Build runtime evaluators from their specs, failing fast on a bad spec.
pub fn build_evaluators(specs: &[EvaluatorSpec]) -> Result<Vec<Box<dyn Evaluator>>> {
    specs
        .iter()
        .map(|spec| -> Result<Box<dyn Evaluator>> {
            spec.validate()?;
            Ok(match spec {
                EvaluatorSpec::Loss => Box::new(LossEvaluator),
                EvaluatorSpec::Span => Box::new(SpanEvaluator),
                EvaluatorSpec::SentenceSpan => Box::new(SentenceSpanEvaluator),
                EvaluatorSpec::BoundedSpan { bounds } => {
                    Box::new(BoundedSpanEvaluator::new(bounds.clone()))
                }
            })
        })
        .collect()
}

/// A predicted answer span (inclusive token indices).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanPrediction {
    pub start: usize,
    pub end: usize,
    pub score: f32,
}

impl SpanPrediction {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false // spans are inclusive, so never empty
    }
}

/// Gold labels for one example.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpanLabel {
    /// Gold answer spans (inclusive token indices); any counts as correct
    pub answer_spans: Vec<(usize, usize)>,

    /// Token index of each sentence start, ascending, first at 0
    pub sentence_starts: Vec<usize>,
}

/// Model outputs for an evaluated set of examples, aligned with labels.
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    pub predictions: Vec<SpanPrediction>,
    pub losses: Vec<f32>,
}

/// Ordered scalar-metric map produced by an evaluator.
pub type Evaluation = BTreeMap<String, f64>;

/// Consumes model outputs and labels, produces scalar metrics.
pub trait Evaluator {
    fn name(&self) -> &str;

    fn evaluate(&self, outputs: &BatchOutput, labels: &[SpanLabel]) -> Evaluation;
}

/// Mean loss over the evaluated examples.
#[derive(Debug, Clone, Copy, Default)]
pub struct LossEvaluator;

impl Evaluator for LossEvaluator {
    fn name(&self) -> &str {
        "loss"
    }

    fn evaluate(&self, outputs: &BatchOutput, _labels: &[SpanLabel]) -> Evaluation {
        let mut eval = Evaluation::new();
        let mean = if outputs.losses.is_empty() {
            0.0
        } else {
            outputs.losses.iter().map(|&l| l as f64).sum::<f64>() / outputs.losses.len() as f64
        };
        eval.insert("loss".to_string(), mean);
        eval
    }
}

/// Exact-match and token-F1 against the best-matching gold span.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanEvaluator;

impl Evaluator for SpanEvaluator {
    fn name(&self) -> &str {
        "span"
    }

    fn evaluate(&self, outputs: &BatchOutput, labels: &[SpanLabel]) -> Evaluation {
        assert_eq!(
            outputs.predictions.len(),
            labels.len(),
            "predictions and labels must be aligned"
        );

        let mut eval = Evaluation::new();
        if labels.is_empty() {
            eval.insert("span/accuracy".to_string(), 0.0);
            eval.insert("span/f1".to_string(), 0.0);
            return eval;
        }

        let mut em_total = 0.0;
        let mut f1_total = 0.0;
        for (pred, label) in outputs.predictions.iter().zip(labels) {
            em_total += exact_match(pred, &label.answer_spans);
            f1_total += best_f1(pred, &label.answer_spans);
        }

        let n = labels.len() as f64;
        eval.insert("span/accuracy".to_string(), em_total / n);
        eval.insert("span/f1".to_string(), f1_total / n);
        eval
    }
}

/// Accuracy of predicting a span inside a gold answer sentence.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceSpanEvaluator;

impl Evaluator for SentenceSpanEvaluator {
    fn name(&self) -> &str {
        "sentence"
    }

    fn evaluate(&self, outputs: &BatchOutput, labels: &[SpanLabel]) -> Evaluation {
        assert_eq!(outputs.predictions.len(), labels.len());

        let mut eval = Evaluation::new();
        if labels.is_empty() {
            eval.insert("sentence/accuracy".to_string(), 0.0);
            return eval;
        }

        let correct = outputs
            .predictions
            .iter()
            .zip(labels)
            .filter(|(pred, label)| {
                let pred_sentence = sentence_of(pred.start, &label.sentence_starts);
                label
                    .answer_spans
                    .iter()
                    .any(|&(start, _)| sentence_of(start, &label.sentence_starts) == pred_sentence)
            })
            .count();

        eval.insert(
            "sentence/accuracy".to_string(),
            correct as f64 / labels.len() as f64,
        );
        eval
    }
}

/// EM/F1 per answer-length bound, keyed `b{bound}/...`.
///
/// A prediction longer than the bound scores zero for that bound, matching
/// the convention of bounded-span evaluation on extractive QA leaderboards.
#[derive(Debug, Clone, Default)]
pub struct BoundedSpanEvaluator {
    bounds: Vec<usize>,
}

impl BoundedSpanEvaluator {
    pub fn new(bounds: Vec<usize>) -> Self {
        Self { bounds }
    }
}

impl Evaluator for BoundedSpanEvaluator {
    fn name(&self) -> &str {
        "bounded-span"
    }

    fn evaluate(&self, outputs: &BatchOutput, labels: &[SpanLabel]) -> Evaluation {
        assert_eq!(outputs.predictions.len(), labels.len());

        let mut eval = Evaluation::new();
        for &bound in &self.bounds {
            let (mut em_total, mut f1_total) = (0.0, 0.0);
            for (pred, label) in outputs.predictions.iter().zip(labels) {
                if pred.len() > bound {
                    continue;
                }
                em_total += exact_match(pred, &label.answer_spans);
                f1_total += best_f1(pred, &label.answer_spans);
            }

            let n = labels.len().max(1) as f64;
            eval.insert(format!("b{bound}/accuracy"), em_total / n);
            eval.insert(format!("b{bound}/f1"), f1_total / n);
        }
        eval
    }
}

fn exact_match(pred: &SpanPrediction, golds: &[(usize, usize)]) -> f64 {
    if golds
        .iter()
        .any(|&(start, end)| pred.start == start && pred.end == end)
    {
        1.0
    } else {
        0.0
    }
}

/// Best token-overlap F1 of the prediction against any gold span.
fn best_f1(pred: &SpanPrediction, golds: &[(usize, usize)]) -> f64 {
    golds
        .iter()
        .map(|&(start, end)| token_f1(pred, start, end))
        .fold(0.0, f64::max)
}

fn token_f1(pred: &SpanPrediction, gold_start: usize, gold_end: usize) -> f64 {
    let overlap_start = pred.start.max(gold_start);
    let overlap_end = pred.end.min(gold_end);
    if overlap_start > overlap_end {
        return 0.0;
    }

    let overlap = (overlap_end - overlap_start + 1) as f64;
    let precision = overlap / pred.len() as f64;
    let recall = overlap / (gold_end - gold_start + 1) as f64;
    2.0 * precision * recall / (precision + recall)
}

/// Index of the sentence containing a token position.
fn sentence_of(pos: usize, sentence_starts: &[usize]) -> usize {
    match sentence_starts.binary_search(&pos) {
        Ok(i) => i,
        Err(0) => 0,
        Err(i) => i - 1,
    }
}
