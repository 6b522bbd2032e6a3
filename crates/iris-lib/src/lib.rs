//! Iris classification library
//!
//! This crate provides the core functionality for:
//! - Loading the serialized scaler/classifier bundle
//! - Collecting measurements through a resettable form
//! - Running single-sample predictions
//! - Keeping a session-scoped history and presenting it
//! - Health checks and observability

pub mod artifact;
pub mod form;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod presenter;
pub mod session;

pub use artifact::{ArtifactLoader, LoadFailure, ModelBundle, DEFAULT_ARTIFACT_PATH};
pub use form::{FormError, MeasurementForm};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{ServiceMetrics, StructuredLogger};
pub use predictor::{predict, PredictError};
pub use presenter::{HistoryTable, SuccessNotice};
pub use session::{Session, SessionHistory};
