//! Core data models for the iris classifier

use serde::{Deserialize, Serialize};
use std::fmt;

/// Four raw measurements of one specimen, in centimeters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    #[serde(default)]
    pub sepal_length: f64,
    #[serde(default)]
    pub sepal_width: f64,
    #[serde(default)]
    pub petal_length: f64,
    #[serde(default)]
    pub petal_width: f64,
}

impl MeasurementRecord {
    pub fn new(sepal_length: f64, sepal_width: f64, petal_length: f64, petal_width: f64) -> Self {
        Self {
            sepal_length,
            sepal_width,
            petal_length,
            petal_width,
        }
    }

    /// Value of a single field
    pub fn get(&self, field: MeasurementField) -> f64 {
        match field {
            MeasurementField::SepalLength => self.sepal_length,
            MeasurementField::SepalWidth => self.sepal_width,
            MeasurementField::PetalLength => self.petal_length,
            MeasurementField::PetalWidth => self.petal_width,
        }
    }
}

/// The four input fields of the measurement form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementField {
    SepalLength,
    SepalWidth,
    PetalLength,
    PetalWidth,
}

impl MeasurementField {
    /// All fields in form (and feature) order
    pub const ALL: [MeasurementField; 4] = [
        MeasurementField::SepalLength,
        MeasurementField::SepalWidth,
        MeasurementField::PetalLength,
        MeasurementField::PetalWidth,
    ];

    /// Key used in form posts and JSON bodies
    pub fn key(&self) -> &'static str {
        match self {
            MeasurementField::SepalLength => "sepal_length",
            MeasurementField::SepalWidth => "sepal_width",
            MeasurementField::PetalLength => "petal_length",
            MeasurementField::PetalWidth => "petal_width",
        }
    }

    /// Human-readable label shown next to the input
    pub fn label(&self) -> &'static str {
        match self {
            MeasurementField::SepalLength => "Sepal length (cm)",
            MeasurementField::SepalWidth => "Sepal width (cm)",
            MeasurementField::PetalLength => "Petal length (cm)",
            MeasurementField::PetalWidth => "Petal width (cm)",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for MeasurementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A measurement record annotated with the classifier's verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
    pub predicted_class: usize,
    pub confidence_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_label: Option<String>,
}

impl PredictionResult {
    pub fn from_record(
        record: &MeasurementRecord,
        predicted_class: usize,
        confidence_score: f64,
        class_label: Option<String>,
    ) -> Self {
        Self {
            sepal_length: record.sepal_length,
            sepal_width: record.sepal_width,
            petal_length: record.petal_length,
            petal_width: record.petal_width,
            predicted_class,
            confidence_score,
            class_label,
        }
    }

    /// The measurements this result was computed from
    pub fn record(&self) -> MeasurementRecord {
        MeasurementRecord::new(
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_recoverable_from_result() {
        let record = MeasurementRecord::new(5.1, 3.5, 1.4, 0.2);
        let result = PredictionResult::from_record(&record, 0, 0.98, None);
        assert_eq!(result.record(), record);
    }

    #[test]
    fn test_field_keys_roundtrip() {
        for field in MeasurementField::ALL {
            assert_eq!(MeasurementField::from_key(field.key()), Some(field));
        }
        assert_eq!(MeasurementField::from_key("stem_length"), None);
    }

    #[test]
    fn test_missing_json_fields_default_to_zero() {
        let record: MeasurementRecord = serde_json::from_str(r#"{"petal_width": 1.5}"#).unwrap();
        assert_eq!(record, MeasurementRecord::new(0.0, 0.0, 0.0, 1.5));
    }
}
