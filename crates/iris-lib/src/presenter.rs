//! Result presentation: the success notice and the history table
//!
//! Rendering never touches the session; it only reads results.

use crate::models::PredictionResult;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// History table header, in display order
pub const HISTORY_COLUMNS: [&str; 6] = [
    "sepal_length (cm)",
    "sepal_width (cm)",
    "petal_length (cm)",
    "petal_width (cm)",
    "confidence score",
    "predicted class",
];

/// Shown when the history table has no rows
pub const EMPTY_HISTORY_MESSAGE: &str = "No predictions yet";

/// Format a confidence score with at least four significant digits.
///
/// Scores of 0.1 and above get four decimals; smaller scores get one more
/// decimal per leading zero.
pub fn format_confidence(score: f64) -> String {
    let leading_zeros = if score > 0.0 && score < 0.1 {
        (-score.log10()).floor() as usize
    } else {
        0
    };
    format!("{:.*}", 4 + leading_zeros, score)
}

/// Immediate outcome of one submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessNotice {
    pub predicted_class: usize,
    pub class_label: Option<String>,
    pub confidence_score: f64,
}

impl SuccessNotice {
    pub fn class_line(&self) -> String {
        match &self.class_label {
            Some(label) => format!("Predicted class: {} ({})", self.predicted_class, label),
            None => format!("Predicted class: {}", self.predicted_class),
        }
    }

    pub fn confidence_line(&self) -> String {
        format!("Confidence score: {}", format_confidence(self.confidence_score))
    }

    pub fn lines(&self) -> [String; 2] {
        [self.class_line(), self.confidence_line()]
    }
}

impl From<&PredictionResult> for SuccessNotice {
    fn from(result: &PredictionResult) -> Self {
        Self {
            predicted_class: result.predicted_class,
            class_label: result.class_label.clone(),
            confidence_score: result.confidence_score,
        }
    }
}

/// One row of the history table
#[derive(Debug, Clone, PartialEq, Tabled, Serialize)]
pub struct HistoryRow {
    #[tabled(rename = "sepal_length (cm)")]
    pub sepal_length: String,
    #[tabled(rename = "sepal_width (cm)")]
    pub sepal_width: String,
    #[tabled(rename = "petal_length (cm)")]
    pub petal_length: String,
    #[tabled(rename = "petal_width (cm)")]
    pub petal_width: String,
    #[tabled(rename = "confidence score")]
    pub confidence_score: String,
    #[tabled(rename = "predicted class")]
    pub predicted_class: String,
}

impl HistoryRow {
    /// Cells in [`HISTORY_COLUMNS`] order
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.sepal_length,
            &self.sepal_width,
            &self.petal_length,
            &self.petal_width,
            &self.confidence_score,
            &self.predicted_class,
        ]
    }
}

impl From<&PredictionResult> for HistoryRow {
    fn from(result: &PredictionResult) -> Self {
        Self {
            sepal_length: result.sepal_length.to_string(),
            sepal_width: result.sepal_width.to_string(),
            petal_length: result.petal_length.to_string(),
            petal_width: result.petal_width.to_string(),
            confidence_score: format_confidence(result.confidence_score),
            predicted_class: result.predicted_class.to_string(),
        }
    }
}

/// The full session history as a table, one row per prediction
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryTable {
    rows: Vec<HistoryRow>,
}

impl HistoryTable {
    pub fn from_history(results: &[PredictionResult]) -> Self {
        Self {
            rows: results.iter().map(HistoryRow::from).collect(),
        }
    }

    pub fn rows(&self) -> &[HistoryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Plain-text rendering with rounded borders
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return EMPTY_HISTORY_MESSAGE.to_string();
        }
        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}
