//! ONNX classifier inference using tract
//!
//! Lets a bundle point at a classifier exported to ONNX instead of carrying
//! linear coefficients inline. The graph must take a `[1, n_features]` f32
//! input and expose the class probabilities as a plain f32 tensor (export
//! scikit-learn models with `zipmap=False`).

use crate::predictor::{Classifier, InferenceFailure};
use anyhow::{Context, Result};
use std::path::Path;
use tract_onnx::prelude::*;
use tracing::debug;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-backed classifier
pub struct OnnxClassifier {
    model: TractModel,
    n_features: usize,
    num_classes: usize,
    output_index: Option<usize>,
}

impl OnnxClassifier {
    /// Load and optimize an ONNX model from disk.
    ///
    /// Without an explicit `num_classes` the class count is read from the
    /// last dimension of the selected output.
    pub fn load(
        path: &Path,
        n_features: usize,
        num_classes: Option<usize>,
        output_index: Option<usize>,
    ) -> Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .with_context(|| format!("Failed to parse ONNX model {:?}", path))?
            .with_input_fact(0, f32::fact([1, n_features]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?;

        let index = output_index.unwrap_or_else(|| model.outputs.len().saturating_sub(1));
        let num_classes = match num_classes {
            Some(n) => n,
            None => output_width(&model, index)
                .with_context(|| format!("Cannot infer class count from output {}", index))?,
        };

        let model = model
            .into_runnable()
            .context("Failed to create runnable model")?;

        debug!(path = %path.display(), n_features, num_classes, "ONNX classifier loaded");

        Ok(Self {
            model,
            n_features,
            num_classes,
            output_index,
        })
    }

    fn features_to_tensor(&self, features: &[f64]) -> Result<Tensor, InferenceFailure> {
        let data: Vec<f32> = features.iter().map(|&x| x as f32).collect();
        let array = tract_ndarray::Array2::from_shape_vec((1, self.n_features), data)
            .map_err(|e| InferenceFailure::Runtime(e.to_string()))?;
        Ok(array.into())
    }
}

fn output_width(model: &TypedModel, index: usize) -> Result<usize> {
    let fact = model.output_fact(index)?;
    let shape = fact
        .shape
        .as_concrete()
        .context("output shape is not fixed")?;
    shape
        .last()
        .copied()
        .filter(|&n| n > 0)
        .context("output has no class dimension")
}

impl Classifier for OnnxClassifier {
    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceFailure> {
        if features.len() != self.n_features {
            return Err(InferenceFailure::FeatureMismatch {
                expected: self.n_features,
                got: features.len(),
            });
        }

        let input = self.features_to_tensor(features)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| InferenceFailure::Runtime(format!("{:#}", e)))?;

        let index = self
            .output_index
            .unwrap_or_else(|| outputs.len().saturating_sub(1));
        let output = outputs.get(index).ok_or_else(|| {
            InferenceFailure::Runtime(format!("model has no output at index {}", index))
        })?;

        let view = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceFailure::Runtime(format!("{:#}", e)))?;
        let probabilities: Vec<f64> = view.iter().map(|&p| p as f64).collect();

        if probabilities.is_empty() {
            return Err(InferenceFailure::EmptyOutput);
        }
        if probabilities.len() != self.num_classes {
            return Err(InferenceFailure::Runtime(format!(
                "model output has {} values, expected {}",
                probabilities.len(),
                self.num_classes
            )));
        }
        Ok(probabilities)
    }
}
