//! HTTP API: the measurement form page, JSON prediction endpoints, health
//! checks and Prometheus metrics

use crate::page::{render_page, PageView};
use iris_lib::{
    health::{ComponentStatus, HealthRegistry},
    models::{MeasurementField, MeasurementRecord, PredictionResult},
    observability::{ServiceMetrics, StructuredLogger},
    HistoryTable, MeasurementForm, ModelBundle, PredictError, Session, SuccessNotice,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Shared application state
pub struct AppState {
    pub bundle: Arc<ModelBundle>,
    pub session: Mutex<Session>,
    pub health_registry: HealthRegistry,
    pub metrics: ServiceMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        bundle: Arc<ModelBundle>,
        health_registry: HealthRegistry,
        metrics: ServiceMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            bundle,
            session: Mutex::new(Session::new()),
            health_registry,
            metrics,
            logger,
        }
    }

    /// Predict one record, append it to the session and record the outcome.
    ///
    /// Returns the stored result and the history as it stands afterwards.
    async fn submit(
        &self,
        record: &MeasurementRecord,
    ) -> Result<(PredictionResult, HistoryTable), PredictError> {
        let mut session = self.session.lock().await;
        let start = Instant::now();
        let outcome = session.submit(record, &self.bundle).cloned();
        self.metrics
            .observe_prediction_latency(start.elapsed().as_secs_f64());

        match outcome {
            Ok(result) => {
                let history_len = session.history().len();
                self.metrics.inc_predictions();
                self.metrics.set_session_history_size(history_len);
                self.logger.log_prediction(
                    result.predicted_class,
                    result.confidence_score,
                    history_len,
                    self.bundle.short_version(),
                );
                self.health_registry.record_prediction(None).await;
                Ok((result, HistoryTable::from_history(session.history().all())))
            }
            Err(err) => {
                let message = err.to_string();
                self.metrics.inc_prediction_errors();
                self.logger
                    .log_prediction_failed(&message, self.bundle.short_version());
                self.health_registry
                    .record_prediction(Some(&message))
                    .await;
                Err(err)
            }
        }
    }

    async fn history_table(&self) -> HistoryTable {
        HistoryTable::from_history(self.session.lock().await.history().all())
    }
}

/// Raw form fields as posted by the page; every field may be blank or absent
#[derive(Debug, Default, Deserialize)]
pub struct FormSubmission {
    #[serde(default)]
    pub sepal_length: String,
    #[serde(default)]
    pub sepal_width: String,
    #[serde(default)]
    pub petal_length: String,
    #[serde(default)]
    pub petal_width: String,
}

impl FormSubmission {
    fn into_form(self) -> MeasurementForm {
        MeasurementForm::new()
            .with(MeasurementField::SepalLength, self.sepal_length)
            .with(MeasurementField::SepalWidth, self.sepal_width)
            .with(MeasurementField::PetalLength, self.petal_length)
            .with(MeasurementField::PetalWidth, self.petal_width)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub results: Vec<PredictionResult>,
}

/// Blank form, plus the history panel when the session has results
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let history = state.history_table().await;
    Html(render_page(&PageView {
        history: Some(history),
        ..Default::default()
    }))
}

/// Form submission: validate, predict, then show a cleared form with the notice
async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(submission): Form<FormSubmission>,
) -> Response {
    let mut form = submission.into_form();

    let record = match form.submit() {
        Ok(record) => record,
        Err(err) => {
            let history = state.history_table().await;
            let page = render_page(&PageView {
                form: Some(&form),
                error: Some(err.to_string()),
                history: Some(history),
                ..Default::default()
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response();
        }
    };

    match state.submit(&record).await {
        Ok((result, history)) => Html(render_page(&PageView {
            notice: Some(SuccessNotice::from(&result)),
            history: Some(history),
            ..Default::default()
        }))
        .into_response(),
        Err(err) => {
            let history = state.history_table().await;
            let page = render_page(&PageView {
                error: Some(format!("Prediction failed: {}", err)),
                history: Some(history),
                ..Default::default()
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response()
        }
    }
}

/// JSON prediction; absent fields are treated as zero
async fn predict_json(
    State(state): State<Arc<AppState>>,
    Json(record): Json<MeasurementRecord>,
) -> Response {
    match state.submit(&record).await {
        Ok((result, _)) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => {
            let body = ErrorResponse {
                error: err.to_string(),
            };
            (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
        }
    }
}

async fn history(State(state): State<Arc<AppState>>) -> Json<HistoryResponse> {
    let session = state.session.lock().await;
    let results = session.history().all().to_vec();
    Json(HistoryResponse {
        count: results.len(),
        results,
    })
}

/// Health check response - returns 200 if healthy or degraded, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index).post(submit_form))
        .route("/api/predict", post(predict_json))
        .route("/api/history", get(history))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve(
    addr: &str,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
