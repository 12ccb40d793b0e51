use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, info, log_enabled, trace, warn, Level};
use polars::prelude::*;
use polars_io::parquet::ParquetReader;

use crate::classifier::{KnnClassifier, RiskLabel};
use crate::error::{ArtifactError, PredictError};
use crate::features::ExpectedSchema;
use crate::records::HeartRecord;
use crate::scaler::StandardScaler;

/// Where the three model artifacts live.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub classifier: PathBuf,
    pub scaler: PathBuf,
    pub columns: PathBuf,
}

impl ArtifactPaths {
    pub fn missing_message(&self) -> String {
        format!(
            "Error: One or more model files are missing! Please ensure {:?}, {:?}, and {:?} are in this folder.",
            self.classifier, self.scaler, self.columns
        )
    }

    fn ensure_present(&self) -> Result<(), ArtifactError> {
        for path in [&self.classifier, &self.scaler, &self.columns] {
            if !path.is_file() {
                return Err(ArtifactError::Missing { path: path.clone() });
            }
        }
        Ok(())
    }
}

fn open(path: &Path) -> Result<File, ArtifactError> {
    File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = open(path)?;
    serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| {
        ArtifactError::Json {
            path: path.to_path_buf(),
            source,
        }
    })
}

pub fn read_parquet(path: &Path) -> Result<DataFrame, ArtifactError> {
    let file = open(path)?;

    Ok(ParquetReader::new(file).finish()?)
}

pub fn read_csv(path: &Path) -> Result<DataFrame, ArtifactError> {
    let file = open(path)?;

    Ok(CsvReader::new(file).has_header(true).finish()?)
}

/// Read a reference frame, picking the reader from the file extension.
pub fn read_frame(path: &Path) -> Result<DataFrame, ArtifactError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => read_csv(path),
        Some("parquet") => read_parquet(path),
        _ => Err(ArtifactError::Format {
            path: path.to_path_buf(),
        }),
    }
}

pub fn load_schema(path: &Path) -> Result<ExpectedSchema, ArtifactError> {
    let columns: Vec<String> = read_json(path)?;
    ExpectedSchema::new(columns).map_err(|reason| ArtifactError::Invalid {
        path: path.to_path_buf(),
        reason,
    })
}

pub fn load_scaler(path: &Path) -> Result<StandardScaler, ArtifactError> {
    let scaler: StandardScaler = read_json(path)?;
    scaler.check().map_err(|reason| ArtifactError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(scaler)
}

pub fn load_classifier(
    path: &Path,
    schema: &ExpectedSchema,
    label_column: &str,
    neighbors: usize,
) -> Result<KnnClassifier, ArtifactError> {
    let df = read_frame(path)?;
    debug!("reference frame {:?} is {:?}", path, df.shape());
    KnnClassifier::from_frame(&df, schema.columns(), label_column, neighbors)
        .map_err(|e| e.at(path))
}

/// The loaded model: schema, scaler and classifier. Built once at startup and
/// only read afterwards.
#[derive(Debug)]
pub struct Predictor {
    schema: ExpectedSchema,
    scaler: StandardScaler,
    classifier: KnnClassifier,
}

impl Predictor {
    pub fn new(schema: ExpectedSchema, scaler: StandardScaler, classifier: KnnClassifier) -> Self {
        Predictor {
            schema,
            scaler,
            classifier,
        }
    }

    pub fn load(
        paths: &ArtifactPaths,
        label_column: &str,
        neighbors: usize,
    ) -> Result<Self, ArtifactError> {
        paths.ensure_present()?;

        let schema = load_schema(&paths.columns)?;
        let scaler = load_scaler(&paths.scaler)?;
        let classifier = load_classifier(&paths.classifier, &schema, label_column, neighbors)?;

        info!(
            "loaded {} schema columns, scaler over {} features, {} reference rows of {} features",
            schema.len(),
            scaler.n_features(),
            classifier.n_samples(),
            classifier.n_features()
        );
        if scaler.n_features() != schema.len() {
            warn!(
                "scaler expects {} features but schema has {}, every prediction will fail",
                scaler.n_features(),
                schema.len()
            );
        }
        Ok(Predictor::new(schema, scaler, classifier))
    }

    pub fn schema(&self) -> &ExpectedSchema {
        &self.schema
    }

    /// Align, scale and classify one record.
    pub fn predict(&self, record: &HeartRecord) -> Result<RiskLabel, PredictError> {
        let encoded = self.schema.align(record);
        if log_enabled!(Level::Trace) {
            for (column, value) in self.schema.named(&encoded) {
                trace!("{} = {}", column, value);
            }
        }
        let scaled = self.scaler.transform(encoded.as_slice())?;
        let risk = self.classifier.predict(&scaled)?;
        info!("predicted {} risk", risk.name());
        Ok(risk)
    }
}
