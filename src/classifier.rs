use log::debug;
use polars::prelude::*;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::metrics::distance::euclidian::Euclidian;
use smartcore::neighbors::knn_classifier::{KNNClassifier, KNNClassifierParameters};

use crate::error::{PredictError, ReferenceError};

type Knn = KNNClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>, Euclidian<f64>>;

/// Binary outcome of one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLabel {
    Low,
    High,
}

impl RiskLabel {
    pub fn from_label(label: i32) -> Result<Self, PredictError> {
        match label {
            0 => Ok(RiskLabel::Low),
            1 => Ok(RiskLabel::High),
            other => Err(PredictError::Label(other)),
        }
    }

    pub fn label(self) -> i32 {
        match self {
            RiskLabel::Low => 0,
            RiskLabel::High => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RiskLabel::Low => "low",
            RiskLabel::High => "high",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RiskLabel::High => "⚠️ High Risk of Heart Stroke detected. Please consult a doctor.",
            RiskLabel::Low => "✅ Low Risk. Your heart health appears normal.",
        }
    }
}

/// k-nearest-neighbors vote over a stored set of scaled training points.
pub struct KnnClassifier {
    knn: Knn,
    n_features: usize,
    n_samples: usize,
}

impl std::fmt::Debug for KnnClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnnClassifier")
            .field("n_features", &self.n_features)
            .field("n_samples", &self.n_samples)
            .finish()
    }
}

impl KnnClassifier {
    /// `points` is row-major, `n_features` values per label.
    pub fn fit(
        points: Vec<f64>,
        n_features: usize,
        labels: Vec<i32>,
        k: usize,
    ) -> Result<Self, ReferenceError> {
        let n_samples = labels.len();
        if n_features == 0 || points.len() != n_samples * n_features {
            return Err(ReferenceError::Invalid(format!(
                "{} values do not form {} rows of {} features",
                points.len(),
                n_samples,
                n_features
            )));
        }
        if let Some(bad) = labels.iter().find(|&&l| l != 0 && l != 1) {
            return Err(ReferenceError::Invalid(format!(
                "label {} is not 0 or 1",
                bad
            )));
        }
        if k < 2 || k > n_samples {
            return Err(ReferenceError::Knn(format!(
                "k={} needs between 2 and {} reference rows",
                k, n_samples
            )));
        }

        let x = DenseMatrix::new(n_samples, n_features, points, false);
        let knn = KNNClassifier::fit(&x, &labels, KNNClassifierParameters::default().with_k(k))?;
        debug!("fitted knn with k={} over {} rows", k, n_samples);
        Ok(KnnClassifier {
            knn,
            n_features,
            n_samples,
        })
    }

    /// Build from a reference frame: `columns` in order, plus the label column.
    pub fn from_frame(
        df: &DataFrame,
        columns: &[String],
        label_column: &str,
        k: usize,
    ) -> Result<Self, ReferenceError> {
        let nrows = df.height();
        let ncols = columns.len();

        let mut features: Vec<Vec<f64>> = Vec::with_capacity(ncols);
        for name in columns {
            let series = df.column(name)?.cast(&DataType::Float64)?;
            if series.null_count() > 0 {
                return Err(ReferenceError::Invalid(format!(
                    "column {} has missing values",
                    name
                )));
            }
            features.push(series.f64()?.into_no_null_iter().collect());
        }

        let target = df.column(label_column)?.cast(&DataType::Int32)?;
        if target.null_count() > 0 {
            return Err(ReferenceError::Invalid(format!(
                "label column {} has missing values",
                label_column
            )));
        }
        let labels: Vec<i32> = target.i32()?.into_no_null_iter().collect();

        // columns in, rows out
        let mut points = Vec::with_capacity(nrows * ncols);
        for row in 0..nrows {
            for column in &features {
                points.push(column[row]);
            }
        }

        Self::fit(points, ncols, labels, k)
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn predict(&self, x: &[f64]) -> Result<RiskLabel, PredictError> {
        if x.len() != self.n_features {
            return Err(PredictError::DimensionMismatch {
                stage: "KNeighborsClassifier",
                expected: self.n_features,
                found: x.len(),
            });
        }
        // the neighbor search cannot order NaN distances
        if let Some(v) = x.iter().find(|v| !v.is_finite()) {
            return Err(PredictError::NonFinite {
                stage: "KNeighborsClassifier",
                kind: if v.is_nan() { "NaN" } else { "infinity" },
            });
        }
        let row = DenseMatrix::new(1, self.n_features, x.to_vec(), false);
        let predicted = self.knn.predict(&row)?;
        match predicted.first() {
            Some(&label) => RiskLabel::from_label(label),
            None => Err(PredictError::Classifier("no prediction returned".to_string())),
        }
    }
}
