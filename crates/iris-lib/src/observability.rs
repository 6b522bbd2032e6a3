//! Observability for the classifier service
//!
//! Provides:
//! - Prometheus metrics (prediction latency, prediction/error counts, history size, model info)
//! - Event-style structured logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_gauge, GaugeVec,
    Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for inference latency (seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Registered once per process; the default Prometheus registry rejects duplicates
static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

struct ServiceMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounter,
    prediction_errors_total: IntCounter,
    session_history_size: IntGauge,
    model_info: GaugeVec,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "iris_prediction_latency_seconds",
                "Time spent running the scaler and classifier for one submission",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter!(
                "iris_predictions_total",
                "Total number of successful predictions"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter!(
                "iris_prediction_errors_total",
                "Total number of failed prediction attempts"
            )
            .expect("Failed to register prediction_errors_total"),

            session_history_size: register_int_gauge!(
                "iris_session_history_size",
                "Number of prediction results held in the active session"
            )
            .expect("Failed to register session_history_size"),

            model_info: register_gauge_vec!(
                "iris_model_info",
                "Information about the loaded model bundle",
                &["version", "classifier"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Handle to the process-wide metrics; clones share the same series
#[derive(Clone)]
pub struct ServiceMetrics {
    _private: (),
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServiceMetricsInner {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions_total.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors_total.inc();
    }

    pub fn set_session_history_size(&self, len: usize) {
        self.inner().session_history_size.set(len as i64);
    }

    /// Replace the model info series with the current bundle
    pub fn set_model_info(&self, version: &str, classifier: &str) {
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[version, classifier])
            .set(1.0);
    }
}

/// Event logger for service lifecycle and predictions
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, listen_addr: &str) {
        info!(
            event = "server_started",
            instance = %self.instance,
            server_version = %version,
            listen_addr = %listen_addr,
            "Iris classifier started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "server_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Iris classifier shutting down"
        );
    }

    pub fn log_bundle_loaded(&self, path: &str, version: &str, classifier: &str, num_classes: usize) {
        info!(
            event = "bundle_loaded",
            instance = %self.instance,
            path = %path,
            model_version = %version,
            classifier = %classifier,
            num_classes = num_classes,
            "Model bundle ready"
        );
    }

    pub fn log_prediction(
        &self,
        predicted_class: usize,
        confidence_score: f64,
        history_len: usize,
        model_version: &str,
    ) {
        info!(
            event = "prediction_generated",
            instance = %self.instance,
            predicted_class = predicted_class,
            confidence_score = confidence_score,
            history_len = history_len,
            model_version = %model_version,
            "Generated prediction"
        );
    }

    pub fn log_prediction_failed(&self, error: &str, model_version: &str) {
        warn!(
            event = "prediction_failed",
            instance = %self.instance,
            error = %error,
            model_version = %model_version,
            "Prediction failed, history unchanged"
        );
    }
}
