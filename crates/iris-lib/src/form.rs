//! Measurement input form
//!
//! Holds the raw text of the four measurement fields until the user
//! submits. Submission parses the fields, emits one record and clears the
//! form. Parsing is the only validation: negative or implausible values are
//! passed through as typed.

use crate::models::{MeasurementField, MeasurementRecord};
use thiserror::Error;

/// A field could not be read as a number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{} must be a number, got {value:?}", .field.label())]
    InvalidNumber {
        field: MeasurementField,
        value: String,
    },
}

/// Parse one field's text; blank means the default of 0.0
pub fn parse_field(field: MeasurementField, raw: &str) -> Result<f64, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(FormError::InvalidNumber {
            field,
            value: raw.to_string(),
        }),
    }
}

/// Four text inputs and a submit action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasurementForm {
    values: [String; 4],
}

impl MeasurementForm {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(field: MeasurementField) -> usize {
        match field {
            MeasurementField::SepalLength => 0,
            MeasurementField::SepalWidth => 1,
            MeasurementField::PetalLength => 2,
            MeasurementField::PetalWidth => 3,
        }
    }

    /// Store the raw text typed into a field
    pub fn set(&mut self, field: MeasurementField, raw: impl Into<String>) {
        self.values[Self::slot(field)] = raw.into();
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, field: MeasurementField, raw: impl Into<String>) -> Self {
        self.set(field, raw);
        self
    }

    pub fn get(&self, field: MeasurementField) -> &str {
        &self.values[Self::slot(field)]
    }

    /// Check a single field without submitting
    pub fn validate_field(&self, field: MeasurementField) -> Result<f64, FormError> {
        parse_field(field, self.get(field))
    }

    /// Parse every field into a record, then clear the form.
    ///
    /// On a parse error nothing is submitted and the typed values are kept.
    pub fn submit(&mut self) -> Result<MeasurementRecord, FormError> {
        let record = MeasurementRecord {
            sepal_length: self.validate_field(MeasurementField::SepalLength)?,
            sepal_width: self.validate_field(MeasurementField::SepalWidth)?,
            petal_length: self.validate_field(MeasurementField::PetalLength)?,
            petal_width: self.validate_field(MeasurementField::PetalWidth)?,
        };
        self.reset();
        Ok(record)
    }

    /// Clear every field back to blank
    pub fn reset(&mut self) {
        self.values = Default::default();
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|v| v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_form_submits_zeros() {
        let mut form = MeasurementForm::new();
        assert_eq!(form.submit().unwrap(), MeasurementRecord::default());
    }

    #[test]
    fn test_submit_parses_all_fields() {
        let mut form = MeasurementForm::new()
            .with(MeasurementField::SepalLength, "5.1")
            .with(MeasurementField::SepalWidth, " 3.5 ")
            .with(MeasurementField::PetalLength, "1.4")
            .with(MeasurementField::PetalWidth, "0.2");
        let record = form.submit().unwrap();
        assert_eq!(record, MeasurementRecord::new(5.1, 3.5, 1.4, 0.2));
    }

    #[test]
    fn test_submit_resets_fields() {
        let mut form = MeasurementForm::new()
            .with(MeasurementField::SepalLength, "5.1")
            .with(MeasurementField::PetalWidth, "0.2");
        form.submit().unwrap();
        assert!(form.is_blank());
        assert_eq!(form.submit().unwrap(), MeasurementRecord::default());
    }

    #[test]
    fn test_partial_form_defaults_missing_fields() {
        let mut form = MeasurementForm::new().with(MeasurementField::PetalLength, "4.2");
        assert_eq!(
            form.submit().unwrap(),
            MeasurementRecord::new(0.0, 0.0, 4.2, 0.0)
        );
    }

    #[test]
    fn test_negative_values_pass_through() {
        let mut form = MeasurementForm::new().with(MeasurementField::SepalWidth, "-3");
        assert_eq!(form.submit().unwrap().sepal_width, -3.0);
    }

    #[test]
    fn test_invalid_number_keeps_values() {
        let mut form = MeasurementForm::new()
            .with(MeasurementField::SepalLength, "5.1")
            .with(MeasurementField::PetalLength, "long");
        let err = form.submit().unwrap_err();
        assert_eq!(
            err,
            FormError::InvalidNumber {
                field: MeasurementField::PetalLength,
                value: "long".to_string(),
            }
        );
        assert_eq!(form.get(MeasurementField::SepalLength), "5.1");
        assert_eq!(form.get(MeasurementField::PetalLength), "long");
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(parse_field(MeasurementField::SepalLength, "NaN").is_err());
        assert!(parse_field(MeasurementField::SepalLength, "inf").is_err());
    }

    #[test]
    fn test_error_message_names_field() {
        let err = parse_field(MeasurementField::PetalWidth, "x").unwrap_err();
        assert_eq!(err.to_string(), "Petal width (cm) must be a number, got \"x\"");
    }
}
