//! Drowsiness Monitor API Server
//!
//! Control and reporting surface for the drowsiness monitor, plus the
//! wiring that runs the frame loop beside it.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use anyhow::Context;
use camera_capture::FrameSource;
use dms::{run_frame_loop, DrowsinessMonitor, LandmarkDetector, SharedMonitor};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use storage::EpisodeRecorder;
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub mod config;
mod routes;

pub use crate::config::MonitorConfig;
pub use routes::detection::ToggleResponse;

/// Application state shared across handlers
pub struct AppState {
    /// Detection session
    pub monitor: SharedMonitor,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus exporter, when installed
    pub metrics: Option<PrometheusHandle>,
    /// Frame loop still pulling frames
    pub frame_source_alive: AtomicBool,
}

impl AppState {
    /// Create new application state
    pub fn new(monitor: SharedMonitor, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            monitor,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics,
            frame_source_alive: AtomicBool::new(false),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
    pub detection: DetectionStatus,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub frame_source: ComponentHealth,
    pub metrics: ComponentHealth,
}

/// Individual component health
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
}

impl ComponentHealth {
    fn from_flag(ok: bool) -> Self {
        Self {
            status: if ok { "ok" } else { "stopped" }.to_string(),
        }
    }
}

/// Detection summary
#[derive(Debug, Serialize)]
pub struct DetectionStatus {
    pub active: bool,
    pub state: String,
    pub episodes_recorded: u64,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/data", get(routes::data::get_data))
        .route("/api/v1/detection/toggle", post(routes::detection::toggle))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let monitor = state.monitor.read().await;
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus {
            frame_source: ComponentHealth::from_flag(state.frame_source_alive.load(Ordering::Relaxed)),
            metrics: ComponentHealth::from_flag(state.metrics.is_some()),
        },
        detection: DetectionStatus {
            active: monitor.is_active(),
            state: monitor.state().label().to_string(),
            episodes_recorded: monitor.episodes_recorded(),
        },
    };

    Json(response)
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed".to_string()),
    }
}

/// Initialize logging (`RUST_LOG`, default `info`)
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_err()
    {
        eprintln!("tracing subscriber already installed");
    }
}

/// Build the monitor with its file-backed recorder
///
/// Detection settings are checked before anything is created on disk.
pub fn build_monitor(config: &MonitorConfig) -> anyhow::Result<DrowsinessMonitor> {
    config.dms.validate().context("invalid detection configuration")?;
    let recorder = EpisodeRecorder::from_config(&config.storage)
        .context("failed to prepare episode log")?;
    let monitor = DrowsinessMonitor::new(config.dms.clone())
        .context("invalid detection configuration")?
        .with_recorder(Arc::new(recorder));
    Ok(monitor)
}

/// Run the frame loop on a blocking thread
///
/// When the source ends or fails, only this task stops; the HTTP surface
/// keeps serving the last known state.
pub fn spawn_frame_loop<S, D>(state: Arc<AppState>, mut source: S, mut detector: D) -> JoinHandle<()>
where
    S: FrameSource + Send + 'static,
    D: LandmarkDetector + Send + 'static,
{
    state.frame_source_alive.store(true, Ordering::Relaxed);
    tokio::task::spawn_blocking(move || {
        let result = run_frame_loop(&mut source, &mut detector, &state.monitor, |_, _| {});
        state.frame_source_alive.store(false, Ordering::Relaxed);
        match result {
            Ok(frames) => info!("Frame loop finished after {} frames", frames),
            Err(e) => error!("Frame loop stopped: {}", e),
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown requested");
}

/// Run the server until Ctrl-C
pub async fn run_server(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use dms::{DmsConfig, DrowsinessMonitor};
    use tokio::sync::RwLock;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        let monitor = DrowsinessMonitor::new(DmsConfig::default()).unwrap();
        Arc::new(AppState::new(Arc::new(RwLock::new(monitor)), None))
    }

    async fn send(state: &Arc<AppState>, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = create_router(state.clone())
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[test]
    fn test_invalid_config_creates_no_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = MonitorConfig::default();
        config.dms.ear_threshold = -1.0;
        config.storage.log_path = dir.path().join("drowsiness_log.csv");

        assert!(build_monitor(&config).is_err());
        assert!(!config.storage.log_path.exists());
    }

    #[test]
    fn test_build_monitor_prepares_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = MonitorConfig::default();
        config.storage.log_path = dir.path().join("drowsiness_log.csv");
        config.storage.snapshot_dir = dir.path().to_path_buf();

        let monitor = build_monitor(&config).unwrap();
        assert!(!monitor.is_active());
        assert!(monitor.episode_writer().is_some());
        assert!(config.storage.log_path.exists());
    }

    #[tokio::test]
    async fn test_data_before_start() {
        let state = test_state();
        let (status, json) = send(&state, "GET", "/api/v1/data").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "READY");
        assert_eq!(json["detection_active"], false);
        assert_eq!(json["threshold"], 0.2);
        assert_eq!(json["current_ear"], 0.0);
        assert!(json["ear_values"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let state = test_state();

        let (status, json) = send(&state, "POST", "/api/v1/detection/toggle").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "Detection started");
        assert_eq!(json["detection_active"], true);

        let (_, json) = send(&state, "GET", "/api/v1/data").await;
        assert_eq!(json["status"], "STARTING");

        let (_, json) = send(&state, "POST", "/api/v1/detection/toggle").await;
        assert_eq!(json["status"], "Detection stopped");
        assert_eq!(json["detection_active"], false);

        let (_, json) = send(&state, "GET", "/api/v1/data").await;
        assert_eq!(json["status"], "READY");
    }

    #[tokio::test]
    async fn test_toggle_requires_post() {
        let state = test_state();
        let (status, _) = send(&state, "GET", "/api/v1/detection/toggle").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_health_reports_stopped_source() {
        let state = test_state();
        let (status, json) = send(&state, "GET", "/api/v1/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["components"]["frame_source"]["status"], "stopped");
        assert_eq!(json["detection"]["state"], "READY");
        assert_eq!(json["detection"]["episodes_recorded"], 0);
    }

    #[tokio::test]
    async fn test_metrics_without_exporter() {
        let state = test_state();
        let (status, _) = send(&state, "GET", "/metrics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_exhausted_source_keeps_serving() {
        let state = test_state();
        state.monitor.write().await.start();

        let input = "{\"width\":10,\"height\":10,\"face\":null}\n".repeat(3);
        let (source, detector) = dms::replay_from_reader(std::io::Cursor::new(input));
        spawn_frame_loop(state.clone(), source, detector).await.unwrap();

        assert!(!state.frame_source_alive.load(Ordering::Relaxed));
        let (status, json) = send(&state, "GET", "/api/v1/data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "NO FACE");
        assert_eq!(json["detection_active"], true);
    }
}
