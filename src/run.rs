//! Run assembly and the training entry point
//!
//! A [`RunSpec`] bundles everything a training run needs: the model
//! descriptor tree, the hyperparameter record, the data configuration, and
//! the evaluator list. [`start_training`] validates the bundle, persists it
//! into the model directory, and hands it to a [`TrainingBackend`], the
//! seam where the external optimization loop plugs in.

use crate::data::TrainingData;
use crate::error::{Error, Result};
use crate::model::QaModel;
use crate::train::{build_evaluators, EvaluatorSpec, ModelDir, RunRecord, TrainParams};
use serde::{Deserialize, Serialize};

/// Complete, serializable description of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    pub model: QaModel,
    pub train_params: TrainParams,
    pub data: TrainingData,
    pub evaluators: Vec<EvaluatorSpec>,

    /// Seed for run-scoped shuffling; `None` lets the backend pick
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Free-form description persisted with the run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RunSpec {
    /// Validate every part of the run.
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        self.train_params.validate()?;
        self.data.validate()?;
        if self.evaluators.is_empty() {
            return Err(Error::Config(
                "a run needs at least one evaluator".to_string(),
            ));
        }
        for evaluator in &self.evaluators {
            evaluator.validate()?;
        }
        for split in self.train_params.eval_samples.keys() {
            if !self.data.corpus.has_split(split) {
                return Err(Error::Config(format!(
                    "eval sample cap names unknown split {split} of corpus {}",
                    self.data.corpus.name
                )));
            }
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// The external optimization loop.
///
/// Implementations own everything numeric: graph construction from the
/// descriptor tree, gradients, checkpoints, and device placement.
pub trait TrainingBackend {
    fn start_training(&mut self, spec: &RunSpec, dir: &ModelDir) -> Result<()>;
}

/// Backend that stops after the run is assembled and persisted.
///
/// Used by `--dry-run` and by tests; records a summary of what a real
/// backend would execute.
#[derive(Debug, Default)]
pub struct DryRunBackend {
    pub last_summary: Option<String>,
}

impl DryRunBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrainingBackend for DryRunBackend {
    fn start_training(&mut self, spec: &RunSpec, dir: &ModelDir) -> Result<()> {
        self.last_summary = Some(format!(
            "{} epochs of {} on corpus {} -> {}",
            spec.train_params.num_epochs,
            spec.train_params.optimizer.kind,
            spec.data.corpus.name,
            dir.path().display(),
        ));
        Ok(())
    }
}

/// Assemble, validate, persist, and launch a training run.
///
/// Fails fast on any configuration error before the backend is invoked.
/// Refuses to overwrite an existing run unless `resume` is set.
#[allow(clippy::too_many_arguments)]
pub fn start_training(
    data: TrainingData,
    model: QaModel,
    train_params: TrainParams,
    evaluators: Vec<EvaluatorSpec>,
    model_dir: &ModelDir,
    notes: Option<String>,
    resume: bool,
    backend: &mut dyn TrainingBackend,
) -> Result<()> {
    let spec = RunSpec {
        model,
        train_params,
        data,
        evaluators,
        seed: None,
        notes,
    };
    launch(spec, model_dir, resume, backend)
}

/// [`start_training`] over an already-assembled [`RunSpec`].
pub fn launch(
    spec: RunSpec,
    model_dir: &ModelDir,
    resume: bool,
    backend: &mut dyn TrainingBackend,
) -> Result<()> {
    spec.validate()?;
    // Surface evaluator construction errors before anything is written
    build_evaluators(&spec.evaluators)?;

    if model_dir.has_run() && !resume {
        return Err(Error::RunDir(format!(
            "{} already contains a run; pass resume to continue it",
            model_dir.path().display()
        )));
    }

    model_dir.save_spec(&spec)?;
    if let Some(notes) = &spec.notes {
        model_dir.save_notes(notes)?;
    }
    model_dir.save_record(&RunRecord::now(resume))?;

    backend.start_training(&spec, model_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes;

    #[test]
    fn test_validate_rejects_empty_evaluators() {
        let mut spec = recipes::bidaf().unwrap();
        spec.evaluators.clear();
        assert!(matches!(spec.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_eval_split() {
        let mut spec = recipes::bidaf().unwrap();
        spec.train_params = spec
            .train_params
            .clone()
            .with_eval_samples("test", Some(100));
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_launch_persists_and_reports() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ModelDir::create(tmp.path().join("bidaf-run")).unwrap();
        let mut backend = DryRunBackend::new();

        let mut spec = recipes::bidaf().unwrap();
        spec.notes = Some("smoke".to_string());
        launch(spec, &dir, false, &mut backend).unwrap();

        assert!(dir.has_run());
        assert!(dir.notes_path().exists());
        let summary = backend.last_summary.unwrap();
        assert!(summary.contains("adam"));
        assert!(summary.contains("squad"));
    }

    #[test]
    fn test_launch_refuses_to_clobber() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ModelDir::create(tmp.path()).unwrap();
        let mut backend = DryRunBackend::new();

        launch(recipes::bidaf().unwrap(), &dir, false, &mut backend).unwrap();
        let again = launch(recipes::bidaf().unwrap(), &dir, false, &mut backend);
        assert!(matches!(again, Err(Error::RunDir(_))));

        // Resuming is allowed
        launch(recipes::bidaf().unwrap(), &dir, true, &mut backend).unwrap();
    }
}
