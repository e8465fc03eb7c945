//! Model output directory
//!
//! Owns the directory a run writes into: the assembled run spec, free-form
//! notes, and a start record. Checkpoint files themselves are written by
//! the external training backend.

use crate::error::{Error, Result};
use crate::run::RunSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SPEC_FILE: &str = "run.yaml";
const NOTES_FILE: &str = "notes.txt";
const RECORD_FILE: &str = "record.yaml";

/// Start record persisted alongside the run spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub started: DateTime<Utc>,
    pub resume: bool,
}

impl RunRecord {
    pub fn now(resume: bool) -> Self {
        Self {
            started: Utc::now(),
            resume,
        }
    }
}

/// Handle to a run's output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDir {
    path: PathBuf,
}

impl ModelDir {
    /// Create the directory (and parents) if needed.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn spec_path(&self) -> PathBuf {
        self.path.join(SPEC_FILE)
    }

    pub fn notes_path(&self) -> PathBuf {
        self.path.join(NOTES_FILE)
    }

    pub fn record_path(&self) -> PathBuf {
        self.path.join(RECORD_FILE)
    }

    /// Whether this directory already holds a persisted run.
    pub fn has_run(&self) -> bool {
        self.spec_path().exists()
    }

    pub fn save_spec(&self, spec: &RunSpec) -> Result<()> {
        let yaml = serde_yaml::to_string(spec)?;
        fs::write(self.spec_path(), yaml)?;
        Ok(())
    }

    pub fn load_spec(&self) -> Result<RunSpec> {
        if !self.has_run() {
            return Err(Error::RunDir(format!(
                "{} does not contain a run spec",
                self.path.display()
            )));
        }
        let yaml = fs::read_to_string(self.spec_path())?;
        Ok(serde_yaml::from_str(&yaml)?)
    }

    pub fn save_notes(&self, notes: &str) -> Result<()> {
        fs::write(self.notes_path(), notes)?;
        Ok(())
    }

    pub fn save_record(&self, record: &RunRecord) -> Result<()> {
        let yaml = serde_yaml::to_string(record)?;
        fs::write(self.record_path(), yaml)?;
        Ok(())
    }

    pub fn load_record(&self) -> Result<RunRecord> {
        let yaml = fs::read_to_string(self.record_path())?;
        Ok(serde_yaml::from_str(&yaml)?)
    }
}
