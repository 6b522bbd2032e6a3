//! Model bundle artifact: loading, validation and the in-memory bundle
//!
//! The bundle is a single JSON document with two required entries, `scaler`
//! and `model`, plus optional `class_names`. It is read once per process and
//! shared read-only afterwards.

mod classifier;
mod loader;
mod onnx;
mod scaler;

pub use classifier::{ClassifierParams, LogisticRegression, MultiClass};
pub use loader::{
    compute_checksum, load_bundle_from_path, parse_bundle, ArtifactLoader, DEFAULT_ARTIFACT_PATH,
};
pub use onnx::OnnxClassifier;
pub use scaler::{IdentityScaler, MinMaxScaler, ScalerParams, StandardScaler};

use crate::predictor::{Classifier, FeatureScaler};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The artifact could not be turned into a usable bundle
#[derive(Debug, Error)]
pub enum LoadFailure {
    #[error("model artifact not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read model artifact {path:?}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact {path:?} is not a valid bundle")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model artifact {path:?} is missing the `{entry}` entry")]
    MissingEntry { path: PathBuf, entry: &'static str },

    #[error("invalid `{entry}` entry: {reason}")]
    InvalidEntry { entry: &'static str, reason: String },

    #[error("failed to load ONNX classifier {path:?}: {reason}")]
    Onnx { path: PathBuf, reason: String },
}

/// A fitted scaler paired with the classifier trained on its output
pub struct ModelBundle {
    pub scaler: Box<dyn FeatureScaler>,
    pub model: Box<dyn Classifier>,
    pub class_names: Vec<String>,
    /// SHA-256 of the artifact bytes
    pub version: String,
    pub source: Option<PathBuf>,
}

impl ModelBundle {
    pub fn new(scaler: Box<dyn FeatureScaler>, model: Box<dyn Classifier>) -> Self {
        Self {
            scaler,
            model,
            class_names: Vec::new(),
            version: "unversioned".to_string(),
            source: None,
        }
    }

    pub fn with_class_names(mut self, class_names: Vec<String>) -> Self {
        self.class_names = class_names;
        self
    }

    pub fn num_classes(&self) -> usize {
        self.model.num_classes()
    }

    /// Name of a class index, when the bundle carries names
    pub fn class_name(&self, class: usize) -> Option<&str> {
        self.class_names.get(class).map(String::as_str)
    }

    /// First 12 hex digits of the version, for labels and log lines
    pub fn short_version(&self) -> &str {
        let end = self.version.len().min(12);
        &self.version[..end]
    }
}

impl fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBundle")
            .field("n_features", &self.scaler.n_features())
            .field("classifier", &self.model.kind())
            .field("num_classes", &self.model.num_classes())
            .field("class_names", &self.class_names)
            .field("version", &self.version)
            .field("source", &self.source)
            .finish()
    }
}
