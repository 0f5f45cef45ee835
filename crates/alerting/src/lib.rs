//! Alerting System
//!
//! Provides alert debouncing and the periodic audible alert loop.

mod latch;
mod sound;

pub use latch::{AlertLatch, DEFAULT_CLEAR_AFTER};
pub use sound::{spawn_alert_loop, AlertConfig, AlertFlags, AlertSink, TerminalBell};

use thiserror::Error;

/// Alert errors
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Alert output failed: {0}")]
    Output(#[from] std::io::Error),
}
