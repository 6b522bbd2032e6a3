//! Classifiers restored from the bundle's `model` entry

use super::onnx::OnnxClassifier;
use super::LoadFailure;
use crate::predictor::{Classifier, InferenceFailure};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How per-class linear scores become probabilities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    /// Softmax over all class scores
    #[default]
    Multinomial,
    /// Independent sigmoid per class, normalized to sum to one
    Ovr,
}

/// Serialized classifier parameters, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierParams {
    LogisticRegression {
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
        #[serde(default)]
        multi_class: MultiClass,
    },
    /// ONNX graph evaluated with tract; `path` is relative to the bundle file.
    /// `num_classes` defaults to the width of the selected output.
    Onnx {
        path: PathBuf,
        n_features: usize,
        #[serde(default)]
        num_classes: Option<usize>,
        #[serde(default)]
        output_index: Option<usize>,
    },
}

impl ClassifierParams {
    /// Validate the parameters and build the runtime classifier
    pub fn build(self, base_dir: &Path) -> Result<Box<dyn Classifier>, LoadFailure> {
        match self {
            ClassifierParams::LogisticRegression {
                coef,
                intercept,
                multi_class,
            } => LogisticRegression::new(coef, intercept, multi_class)
                .map(|model| Box::new(model) as Box<dyn Classifier>)
                .map_err(|reason| LoadFailure::InvalidEntry {
                    entry: "model",
                    reason,
                }),
            ClassifierParams::Onnx {
                path,
                n_features,
                num_classes,
                output_index,
            } => {
                if n_features == 0 || num_classes == Some(0) {
                    return Err(LoadFailure::InvalidEntry {
                        entry: "model",
                        reason: "onnx classifier needs non-zero n_features and num_classes"
                            .to_string(),
                    });
                }
                let path = base_dir.join(path);
                OnnxClassifier::load(&path, n_features, num_classes, output_index)
                    .map(|model| Box::new(model) as Box<dyn Classifier>)
                    .map_err(|e| LoadFailure::Onnx {
                        path,
                        reason: format!("{:#}", e),
                    })
            }
        }
    }
}

/// Linear model with logistic link, one coefficient row per class
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    multi_class: MultiClass,
}

impl LogisticRegression {
    /// A single coefficient row is the binary case (positive class = 1)
    pub fn new(
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
        multi_class: MultiClass,
    ) -> Result<Self, String> {
        let width = coef.first().map(Vec::len).unwrap_or(0);
        if coef.is_empty() || width == 0 {
            return Err("logistic regression has no coefficients".to_string());
        }
        if coef.iter().any(|row| row.len() != width) {
            return Err("logistic regression coefficient rows differ in width".to_string());
        }
        if intercept.len() != coef.len() {
            return Err(format!(
                "logistic regression has {} coefficient rows but {} intercepts",
                coef.len(),
                intercept.len()
            ));
        }
        Ok(Self {
            coef,
            intercept,
            multi_class,
        })
    }

    fn n_features(&self) -> usize {
        self.coef[0].len()
    }

    fn decision_function(&self, features: &[f64]) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect()
    }
}

impl Classifier for LogisticRegression {
    fn num_classes(&self) -> usize {
        if self.coef.len() == 1 {
            2
        } else {
            self.coef.len()
        }
    }

    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceFailure> {
        if features.len() != self.n_features() {
            return Err(InferenceFailure::FeatureMismatch {
                expected: self.n_features(),
                got: features.len(),
            });
        }

        let scores = self.decision_function(features);
        if scores.len() == 1 {
            let positive = sigmoid(scores[0]);
            return Ok(vec![1.0 - positive, positive]);
        }

        match self.multi_class {
            MultiClass::Multinomial => Ok(softmax(&scores)),
            MultiClass::Ovr => {
                let raw: Vec<f64> = scores.iter().map(|&z| sigmoid(z)).collect();
                let total: f64 = raw.iter().sum();
                if total <= 0.0 || !total.is_finite() {
                    return Err(InferenceFailure::Runtime(
                        "one-vs-rest probabilities do not normalize".to_string(),
                    ));
                }
                Ok(raw.into_iter().map(|p| p / total).collect())
            }
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|&z| (z - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
