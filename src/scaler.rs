use serde::Deserialize;

use crate::error::PredictError;

fn enabled() -> bool {
    true
}

/// Per-column standardization fitted at training time: `(x - mean) / scale`.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
    #[serde(default = "enabled")]
    with_mean: bool,
    #[serde(default = "enabled")]
    with_std: bool,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, String> {
        let scaler = StandardScaler {
            mean,
            scale,
            with_mean: true,
            with_std: true,
        };
        scaler.check()?;
        Ok(scaler)
    }

    /// Validate a deserialized scaler.
    pub fn check(&self) -> Result<(), String> {
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if self.mean.is_empty() {
            return Err("scaler has no columns".to_string());
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, x: &[f64]) -> Result<Vec<f64>, PredictError> {
        if x.len() != self.n_features() {
            return Err(PredictError::DimensionMismatch {
                stage: "StandardScaler",
                expected: self.n_features(),
                found: x.len(),
            });
        }
        Ok(x.iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(&v, (&mean, &scale))| {
                let centered = if self.with_mean { v - mean } else { v };
                // constant columns were fitted with a zero scale
                if self.with_std && scale != 0.0 {
                    centered / scale
                } else {
                    centered
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardizes_each_column() {
        let scaler = StandardScaler::new(vec![50.0, 130.0], vec![10.0, 20.0]).unwrap();
        assert_eq!(scaler.transform(&[60.0, 110.0]).unwrap(), vec![1.0, -1.0]);
    }

    #[test]
    fn zero_scale_only_centers() {
        let scaler = StandardScaler::new(vec![1.0], vec![0.0]).unwrap();
        assert_eq!(scaler.transform(&[3.0]).unwrap(), vec![2.0]);
    }

    #[test]
    fn rejects_wrong_dimension() {
        let scaler = StandardScaler::new(vec![0.0; 3], vec![1.0; 3]).unwrap();
        let err = scaler.transform(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            PredictError::DimensionMismatch { expected: 3, found: 2, .. }
        ));
        assert!(err.to_string().contains("expecting 3 features"));
    }

    #[test]
    fn json_flags_default_on() {
        let scaler: StandardScaler =
            serde_json::from_str(r#"{"mean": [2.0], "scale": [2.0]}"#).unwrap();
        assert_eq!(scaler.transform(&[4.0]).unwrap(), vec![1.0]);

        let scaler: StandardScaler =
            serde_json::from_str(r#"{"mean": [2.0], "scale": [2.0], "with_mean": false}"#)
                .unwrap();
        assert_eq!(scaler.transform(&[4.0]).unwrap(), vec![2.0]);
    }

    #[test]
    fn mismatched_lengths_fail_check() {
        assert!(StandardScaler::new(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(StandardScaler::new(vec![], vec![]).is_err());
    }
}
