//! Single-sample inference over a loaded model bundle

use super::{feature_row, InferenceFailure, PredictError};
use crate::artifact::ModelBundle;
use crate::models::{MeasurementRecord, PredictionResult};
use std::time::Instant;
use tracing::{debug, warn};

/// Inference latency above which a warning is logged
pub const MAX_INFERENCE_MS: u128 = 5;

/// Run one record through the bundle's scaler and classifier
pub fn predict(
    record: &MeasurementRecord,
    bundle: &ModelBundle,
) -> Result<PredictionResult, PredictError> {
    let start = Instant::now();

    let row = feature_row(record);
    let scaled = bundle.scaler.transform(&row)?;
    let probabilities = bundle.model.predict_proba(&scaled)?;

    if let Some(class) = probabilities.iter().position(|p| !p.is_finite()) {
        return Err(InferenceFailure::NonFinite { class }.into());
    }
    let predicted_class = argmax(&probabilities).ok_or(InferenceFailure::EmptyOutput)?;
    let confidence_score = probabilities[predicted_class].clamp(0.0, 1.0);

    let elapsed = start.elapsed();
    if elapsed.as_millis() > MAX_INFERENCE_MS {
        warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
    } else {
        debug!(elapsed_us = elapsed.as_micros(), predicted_class, confidence_score, "Inference completed");
    }

    Ok(PredictionResult::from_record(
        record,
        predicted_class,
        confidence_score,
        bundle.class_name(predicted_class).map(str::to_string),
    ))
}

/// Index of the largest value; ties go to the first occurrence
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in values.iter().enumerate() {
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}
