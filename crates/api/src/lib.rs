//! Camera Alert Monitor API Server
//!
//! HTTP host for the geofence engine: position samples and hazard sets come
//! in, alert outcomes and engine state go out.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use geofence_engine::HazardEngine;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod error;
mod routes;
mod settings;
pub mod sinks;

pub use error::{ApiError, ErrorResponse};
pub use settings::{MonitorConfig, StartupError, ENV_PREFIX};

/// Application state shared across handlers
pub struct AppState {
    /// Geofence engine
    pub engine: Arc<HazardEngine>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus exporter, if a recorder was installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: Arc<HazardEngine>) -> Self {
        Self {
            engine,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub monitoring: bool,
    pub hazard_count: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/state", get(routes::monitor::get_state))
        .route("/api/v1/samples", post(routes::samples::post_sample))
        .route("/api/v1/hazards", put(routes::hazards::put_hazards))
        .route("/api/v1/monitor/stop", post(routes::monitor::stop))
        .route("/api/v1/monitor/resume", post(routes::monitor::resume))
        .route("/api/v1/monitor/reset", post(routes::monitor::reset))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let hazard_count = state.engine.hazard_count()?;
    let monitoring = state.engine.is_running();

    Ok(Json(HealthResponse {
        status: if monitoring { "healthy" } else { "stopped" }.to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        monitoring,
        hazard_count,
    }))
}

/// Prometheus scrape handler
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging; unknown levels fall back to INFO
pub fn init_logging(level: &str) {
    let max_level = Level::from_str(level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(max_level)
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        warn!("Tracing subscriber already installed");
    }
}

/// Load hazards, start the sinks, and serve until shutdown.
///
/// Monitoring does not start if any configured hazard source fails.
pub async fn run_server(config: MonitorConfig) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Arc::new(HazardEngine::new(config.engine.clone()));

    let hazards = config.load_hazards()?;
    if hazards.is_empty() {
        warn!("No hazard sources configured, starting with an empty set");
    } else {
        engine.load_hazards(hazards)?;
    }

    sinks::spawn_notification_sink(&engine);
    sinks::spawn_diagnostics_sink(&engine);

    let mut state = AppState::new(Arc::clone(&engine));
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!("Prometheus recorder not installed: {}", e),
    }

    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
