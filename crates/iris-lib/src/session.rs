//! Session-scoped prediction history
//!
//! A [`Session`] is created when a user starts interacting and dropped when
//! they leave. Nothing here is persisted, and the history is never pruned.

use crate::artifact::ModelBundle;
use crate::models::{MeasurementRecord, PredictionResult};
use crate::predictor::{predict, PredictError};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Ordered log of prediction results, in submission order
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionHistory {
    results: Vec<PredictionResult>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a result at the end of the history
    pub fn append(&mut self, result: PredictionResult) {
        self.results.push(result);
    }

    /// Every result so far, oldest first
    pub fn all(&self) -> &[PredictionResult] {
        &self.results
    }

    pub fn last(&self) -> Option<&PredictionResult> {
        self.results.last()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// One user's interactive session
#[derive(Debug, Clone)]
pub struct Session {
    history: SessionHistory,
    started_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            history: SessionHistory::new(),
            started_at: Utc::now(),
        }
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Predict one record and record the result.
    ///
    /// The history only grows when the prediction succeeds.
    pub fn submit(
        &mut self,
        record: &MeasurementRecord,
        bundle: &ModelBundle,
    ) -> Result<&PredictionResult, PredictError> {
        let result = predict(record, bundle)?;
        self.history.append(result);
        Ok(&self.history.results[self.history.results.len() - 1])
    }
}
