//! Audible alert loop
//!
//! Runs beside the frame path and only reads the shared flags.

use crate::AlertError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Alert loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Check interval (milliseconds)
    pub interval_ms: u64,
    /// Tone frequency (Hz)
    pub tone_hz: u32,
    /// Tone duration (milliseconds)
    pub tone_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            tone_hz: 1000,
            tone_ms: 500,
        }
    }
}

impl AlertConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    pub fn tone(&self) -> Duration {
        Duration::from_millis(self.tone_ms)
    }
}

/// Flags published by the frame path for concurrent readers
///
/// Single writer; a stale read for one interval is acceptable.
#[derive(Debug, Default)]
pub struct AlertFlags {
    alert_active: AtomicBool,
    detection_active: AtomicBool,
}

impl AlertFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, alert_active: bool, detection_active: bool) {
        self.alert_active.store(alert_active, Ordering::Relaxed);
        self.detection_active.store(detection_active, Ordering::Relaxed);
    }

    pub fn alert_active(&self) -> bool {
        self.alert_active.load(Ordering::Relaxed)
    }

    pub fn detection_active(&self) -> bool {
        self.detection_active.load(Ordering::Relaxed)
    }

    /// Sound only while detection runs and the alert is raised
    pub fn should_sound(&self) -> bool {
        self.alert_active() && self.detection_active()
    }
}

/// Output device for the audible alert
pub trait AlertSink: Send {
    fn sound(&mut self, tone_hz: u32, duration: Duration) -> Result<(), AlertError>;
}

/// Rings the terminal bell on stderr
#[derive(Debug, Default)]
pub struct TerminalBell;

impl AlertSink for TerminalBell {
    fn sound(&mut self, tone_hz: u32, duration: Duration) -> Result<(), AlertError> {
        warn!(tone_hz, duration_ms = duration.as_millis() as u64, "DROWSINESS ALERT");
        let mut stderr = std::io::stderr();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }
}

/// Spawn the periodic alert check on the current runtime
pub fn spawn_alert_loop<S>(flags: Arc<AlertFlags>, config: AlertConfig, mut sink: S) -> JoinHandle<()>
where
    S: AlertSink + 'static,
{
    info!("Starting alert loop with config: {:?}", config);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.interval());
        loop {
            ticker.tick().await;
            if flags.should_sound() {
                if let Err(e) = sink.sound(config.tone_hz, config.tone()) {
                    warn!("Alert sound failed: {}", e);
                }
            }
        }
    })
}
