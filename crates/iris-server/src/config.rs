//! Server configuration

use anyhow::{Context, Result};
use iris_lib::DEFAULT_ARTIFACT_PATH;
use serde::Deserialize;
use std::collections::HashMap;

/// Server configuration, read from `IRIS_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Path of the serialized scaler/classifier bundle
    #[serde(default = "default_artifact_path")]
    pub artifact_path: String,

    /// Port for the form, JSON API and health/metrics endpoints
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Name attached to structured log events
    #[serde(default = "default_instance_name")]
    pub instance_name: String,
}

fn default_artifact_path() -> String {
    DEFAULT_ARTIFACT_PATH.to_string()
}

fn default_api_port() -> u16 {
    8501
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_instance_name() -> String {
    "iris-server".to_string()
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::from_env(None)
    }

    /// Load from an explicit variable map instead of the process environment
    pub fn from_env(vars: Option<HashMap<String, String>>) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("IRIS")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid IRIS_* configuration")
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.api_port)
    }
}
