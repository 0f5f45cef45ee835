//! Drowsiness Monitor - Main Entry Point

use alerting::{spawn_alert_loop, TerminalBell};
use anyhow::Context;
use api::{build_monitor, init_logging, run_server, spawn_frame_loop, AppState, MonitorConfig};
use dms::open_replay;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== Drowsiness Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let config = MonitorConfig::load().context("failed to load configuration")?;
    let monitor = build_monitor(&config)?;

    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics exporter unavailable: {}", e);
            None
        }
    };

    let _alerts = spawn_alert_loop(monitor.flags(), config.alerting.clone(), TerminalBell);
    let state = Arc::new(AppState::new(Arc::new(RwLock::new(monitor)), metrics));

    match &config.server.replay_path {
        Some(path) => {
            let (source, detector) = open_replay(path).context("failed to open landmark replay")?;
            spawn_frame_loop(state.clone(), source.with_fps(config.server.replay_fps), detector);
        }
        None => warn!("No frame source configured; serving control surface only"),
    }

    run_server(&config.server.bind, state).await
}
