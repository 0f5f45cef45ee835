//! Reporting Routes

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::AppState;
use dms::DataSnapshot;

/// Current state, ratio history and flags for the dashboard
pub async fn get_data(State(state): State<Arc<AppState>>) -> Json<DataSnapshot> {
    let monitor = state.monitor.read().await;
    Json(monitor.snapshot())
}
