//! Prediction pipeline: feature row → scaler → classifier → verdict

mod features;
mod pipeline;

#[cfg(test)]
mod tests;

pub use features::{feature_row, FEATURE_COLUMNS, NUM_FEATURES};
pub use pipeline::{argmax, predict, MAX_INFERENCE_MS};

use thiserror::Error;

/// Feature vector width did not match what the scaler was fitted on
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("feature vector has {got} columns, scaler expects {expected}")]
pub struct TransformFailure {
    pub expected: usize,
    pub got: usize,
}

/// The classifier could not produce a probability distribution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceFailure {
    #[error("classifier expects {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("classifier returned no class probabilities")]
    EmptyOutput,

    #[error("classifier returned a non-finite probability for class {class}")]
    NonFinite { class: usize },

    #[error("classifier runtime error: {0}")]
    Runtime(String),
}

/// Any failure of a single prediction attempt
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("transform failed: {0}")]
    Transform(#[from] TransformFailure),

    #[error("inference failed: {0}")]
    Inference(#[from] InferenceFailure),
}

/// Stateless feature transform fitted at training time
pub trait FeatureScaler: Send + Sync {
    /// Number of columns the scaler was fitted on
    fn n_features(&self) -> usize;

    /// Map a raw feature row to its normalized form
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, TransformFailure>;
}

/// Classifier producing a probability distribution over a fixed class set
pub trait Classifier: Send + Sync {
    /// Number of classes in the output distribution
    fn num_classes(&self) -> usize;

    /// Short name of the implementation, used in metrics labels
    fn kind(&self) -> &'static str;

    /// Per-class probabilities for one normalized sample
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceFailure>;
}
