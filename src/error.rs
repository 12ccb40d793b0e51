use std::path::{Path, PathBuf};

use polars::prelude::PolarsError;
use smartcore::error::Failed;
use thiserror::Error;

/// Errors raised while loading the model artifacts at startup. All of them are fatal.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("artifact file not found: {path:?}")]
    Missing { path: PathBuf },
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid json in {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("unsupported reference set format {path:?}, expected .csv or .parquet")]
    Format { path: PathBuf },
    #[error("invalid artifact {path:?}: {reason}")]
    Invalid { path: PathBuf, reason: String },
    #[error("cannot build classifier: {0}")]
    Classifier(String),
    #[error(transparent)]
    Frame(#[from] PolarsError),
}

/// Problems building the classifier from its reference rows. The caller knows
/// which file the rows came from and turns these into an [`ArtifactError`].
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("{0}")]
    Invalid(String),
    #[error("cannot build classifier: {0}")]
    Knn(String),
    #[error(transparent)]
    Frame(#[from] PolarsError),
}

impl ReferenceError {
    pub fn at(self, path: &Path) -> ArtifactError {
        match self {
            ReferenceError::Invalid(reason) => ArtifactError::Invalid {
                path: path.to_path_buf(),
                reason,
            },
            ReferenceError::Knn(reason) => ArtifactError::Classifier(reason),
            ReferenceError::Frame(e) => ArtifactError::Frame(e),
        }
    }
}

/// Errors raised by a single prediction. Reported back to the user, never fatal.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("X has {found} features, but {stage} is expecting {expected} features as input")]
    DimensionMismatch {
        stage: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{stage}: Input X contains {kind}")]
    NonFinite {
        stage: &'static str,
        kind: &'static str,
    },
    #[error("classifier failed: {0}")]
    Classifier(String),
    #[error("classifier returned unexpected label {0}")]
    Label(i32),
    #[error("invalid submission: {0}")]
    Submission(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl From<Failed> for PredictError {
    fn from(e: Failed) -> Self {
        PredictError::Classifier(e.to_string())
    }
}

impl From<Failed> for ReferenceError {
    fn from(e: Failed) -> Self {
        ReferenceError::Knn(e.to_string())
    }
}
