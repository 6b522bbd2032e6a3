//! Artifact loading with one-time caching

use super::{ClassifierParams, LoadFailure, ModelBundle, ScalerParams};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Default bundle location, relative to the working directory
pub const DEFAULT_ARTIFACT_PATH: &str = "ml/ML_items";

/// Top-level bundle document; entries are checked one by one so a missing
/// key is reported by name rather than as a generic parse error
#[derive(Debug, Deserialize)]
struct RawBundle {
    scaler: Option<serde_json::Value>,
    model: Option<serde_json::Value>,
    #[serde(default)]
    class_names: Vec<String>,
}

/// Loads the model bundle once and hands out the cached copy afterwards
#[derive(Debug)]
pub struct ArtifactLoader {
    path: PathBuf,
    cached: OnceLock<Arc<ModelBundle>>,
}

impl ArtifactLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.get().is_some()
    }

    /// Load the bundle on first call; later calls return the same instance.
    /// Failures are not cached.
    pub fn load_bundle(&self) -> Result<Arc<ModelBundle>, LoadFailure> {
        if let Some(bundle) = self.cached.get() {
            debug!(path = %self.path.display(), "Using cached model bundle");
            return Ok(Arc::clone(bundle));
        }

        let bundle = Arc::new(load_bundle_from_path(&self.path)?);
        Ok(Arc::clone(self.cached.get_or_init(|| bundle)))
    }
}

impl Default for ArtifactLoader {
    fn default() -> Self {
        Self::new(DEFAULT_ARTIFACT_PATH)
    }
}

/// Read and parse a bundle without caching
pub fn load_bundle_from_path(path: &Path) -> Result<ModelBundle, LoadFailure> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoadFailure::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadFailure::Unreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let bundle = parse_bundle(&bytes, path)?;

    info!(
        path = %path.display(),
        version = %bundle.short_version(),
        classifier = bundle.model.kind(),
        n_features = bundle.scaler.n_features(),
        num_classes = bundle.num_classes(),
        "Model bundle loaded"
    );

    Ok(bundle)
}

/// Parse bundle bytes; `path` is used for error messages and to resolve
/// files the bundle refers to
pub fn parse_bundle(bytes: &[u8], path: &Path) -> Result<ModelBundle, LoadFailure> {
    let raw: RawBundle = serde_json::from_slice(bytes).map_err(|source| LoadFailure::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    let scaler_value = raw.scaler.ok_or_else(|| LoadFailure::MissingEntry {
        path: path.to_path_buf(),
        entry: "scaler",
    })?;
    let model_value = raw.model.ok_or_else(|| LoadFailure::MissingEntry {
        path: path.to_path_buf(),
        entry: "model",
    })?;

    let scaler = serde_json::from_value::<ScalerParams>(scaler_value)
        .map_err(|e| e.to_string())
        .and_then(ScalerParams::build)
        .map_err(|reason| LoadFailure::InvalidEntry {
            entry: "scaler",
            reason,
        })?;

    let model_params = serde_json::from_value::<ClassifierParams>(model_value).map_err(|e| {
        LoadFailure::InvalidEntry {
            entry: "model",
            reason: e.to_string(),
        }
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let model = model_params.build(base_dir)?;

    if !raw.class_names.is_empty() && raw.class_names.len() != model.num_classes() {
        return Err(LoadFailure::InvalidEntry {
            entry: "class_names",
            reason: format!(
                "{} names for {} classes",
                raw.class_names.len(),
                model.num_classes()
            ),
        });
    }

    Ok(ModelBundle {
        scaler,
        model,
        class_names: raw.class_names,
        version: compute_checksum(bytes),
        source: Some(path.to_path_buf()),
    })
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
