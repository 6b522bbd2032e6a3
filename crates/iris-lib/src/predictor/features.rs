//! Feature row construction
//!
//! The classifier was trained on columns in a fixed order. That order is
//! pinned here and every feature row is built from it.

use crate::models::{MeasurementField, MeasurementRecord};

/// Number of input features expected by the model
pub const NUM_FEATURES: usize = 4;

/// A training-time column and the form field that feeds it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureColumn {
    pub field: MeasurementField,
    pub name: &'static str,
}

/// Column order used when the bundle was trained
pub const FEATURE_COLUMNS: [FeatureColumn; NUM_FEATURES] = [
    FeatureColumn {
        field: MeasurementField::SepalLength,
        name: "sepal length (cm)",
    },
    FeatureColumn {
        field: MeasurementField::SepalWidth,
        name: "sepal width (cm)",
    },
    FeatureColumn {
        field: MeasurementField::PetalLength,
        name: "petal length (cm)",
    },
    FeatureColumn {
        field: MeasurementField::PetalWidth,
        name: "petal width (cm)",
    },
];

/// Build the single-row feature vector for one record
pub fn feature_row(record: &MeasurementRecord) -> [f64; NUM_FEATURES] {
    FEATURE_COLUMNS.map(|column| record.get(column.field))
}
