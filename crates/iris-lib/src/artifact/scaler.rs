//! Feature scalers restored from the bundle's `scaler` entry

use crate::predictor::{FeatureScaler, TransformFailure};
use serde::{Deserialize, Serialize};

/// Serialized scaler parameters, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    /// Z-score normalization: `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// Rescale each column from `[data_min, data_max]` into `feature_range`
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "default_feature_range")]
        feature_range: [f64; 2],
    },
    /// Pass-through, for classifiers trained on raw measurements
    Identity { n_features: usize },
}

fn default_feature_range() -> [f64; 2] {
    [0.0, 1.0]
}

impl ScalerParams {
    /// Validate the parameters and build the runtime scaler
    pub fn build(self) -> Result<Box<dyn FeatureScaler>, String> {
        match self {
            ScalerParams::Standard { mean, scale } => {
                if mean.is_empty() {
                    return Err("standard scaler has no columns".to_string());
                }
                if mean.len() != scale.len() {
                    return Err(format!(
                        "standard scaler has {} means but {} scales",
                        mean.len(),
                        scale.len()
                    ));
                }
                Ok(Box::new(StandardScaler::new(mean, scale)))
            }
            ScalerParams::MinMax {
                data_min,
                data_max,
                feature_range,
            } => {
                if data_min.is_empty() {
                    return Err("min-max scaler has no columns".to_string());
                }
                if data_min.len() != data_max.len() {
                    return Err(format!(
                        "min-max scaler has {} minimums but {} maximums",
                        data_min.len(),
                        data_max.len()
                    ));
                }
                if feature_range[0] >= feature_range[1] {
                    return Err(format!(
                        "min-max feature_range [{}, {}] is empty",
                        feature_range[0], feature_range[1]
                    ));
                }
                Ok(Box::new(MinMaxScaler::new(data_min, data_max, feature_range)))
            }
            ScalerParams::Identity { n_features } => {
                if n_features == 0 {
                    return Err("identity scaler has no columns".to_string());
                }
                Ok(Box::new(IdentityScaler { n_features }))
            }
        }
    }
}

fn check_width(expected: usize, row: &[f64]) -> Result<(), TransformFailure> {
    if row.len() != expected {
        return Err(TransformFailure {
            expected,
            got: row.len(),
        });
    }
    Ok(())
}

/// Standard scaler restored from fitted mean and scale
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Zero scale entries (constant training columns) divide by one instead
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();
        Self { mean, scale }
    }
}

impl FeatureScaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, TransformFailure> {
        check_width(self.n_features(), row)?;
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }
}

/// Min-max scaler restored from the fitted column bounds
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    data_min: Vec<f64>,
    data_range: Vec<f64>,
    feature_range: [f64; 2],
}

impl MinMaxScaler {
    pub fn new(data_min: Vec<f64>, data_max: Vec<f64>, feature_range: [f64; 2]) -> Self {
        let data_range = data_min
            .iter()
            .zip(&data_max)
            .map(|(lo, hi)| {
                let range = hi - lo;
                if range == 0.0 {
                    1.0
                } else {
                    range
                }
            })
            .collect();
        Self {
            data_min,
            data_range,
            feature_range,
        }
    }
}

impl FeatureScaler for MinMaxScaler {
    fn n_features(&self) -> usize {
        self.data_min.len()
    }

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, TransformFailure> {
        check_width(self.n_features(), row)?;
        let [lo, hi] = self.feature_range;
        Ok(row
            .iter()
            .zip(self.data_min.iter().zip(&self.data_range))
            .map(|(x, (min, range))| (x - min) / range * (hi - lo) + lo)
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct IdentityScaler {
    n_features: usize,
}

impl IdentityScaler {
    pub fn new(n_features: usize) -> Self {
        Self { n_features }
    }
}

impl FeatureScaler for IdentityScaler {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, TransformFailure> {
        check_width(self.n_features, row)?;
        Ok(row.to_vec())
    }
}
