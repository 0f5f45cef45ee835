//! Detection Control Routes

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::AppState;

/// Response for the toggle endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub status: String,
    pub detection_active: bool,
}

/// Start detection if stopped, stop it if running
pub async fn toggle(State(state): State<Arc<AppState>>) -> Json<ToggleResponse> {
    let active = state.monitor.write().await.toggle();
    info!("Detection toggled via API (active: {})", active);

    let status = if active {
        "Detection started"
    } else {
        "Detection stopped"
    };
    Json(ToggleResponse {
        status: status.to_string(),
        detection_active: active,
    })
}
