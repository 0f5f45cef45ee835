//! Drowsiness state machine

use crate::config::{DmsConfig, RecordPolicy};
use alerting::AlertLatch;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// Monitor state as reported to collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrowsinessState {
    /// Detection inactive
    #[default]
    #[serde(rename = "READY")]
    Ready,
    /// Detection just (re)started, no frame processed yet
    #[serde(rename = "STARTING")]
    Starting,
    #[serde(rename = "AWAKE")]
    Awake,
    #[serde(rename = "DROWSY")]
    Drowsy,
    #[serde(rename = "NO FACE")]
    NoFace,
}

impl DrowsinessState {
    pub fn label(&self) -> &'static str {
        match self {
            DrowsinessState::Ready => "READY",
            DrowsinessState::Starting => "STARTING",
            DrowsinessState::Awake => "AWAKE",
            DrowsinessState::Drowsy => "DROWSY",
            DrowsinessState::NoFace => "NO FACE",
        }
    }
}

impl fmt::Display for DrowsinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of advancing the machine by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: DrowsinessState,
    pub alert_active: bool,
    pub consecutive_low_frames: u32,
    /// This frame should produce an episode record
    pub record_episode: bool,
}

/// Consecutive-low-frame counter with debounced alert
#[derive(Debug, Clone)]
pub struct DrowsinessMachine {
    ear_threshold: f64,
    ear_consec_frames: u32,
    no_face_resets_counter: bool,
    record_policy: RecordPolicy,
    consecutive_low_frames: u32,
    state: DrowsinessState,
    alert: AlertLatch,
}

impl DrowsinessMachine {
    pub fn new(config: &DmsConfig) -> Self {
        Self {
            ear_threshold: config.ear_threshold,
            ear_consec_frames: config.ear_consec_frames,
            no_face_resets_counter: config.no_face_resets_counter,
            record_policy: config.record_policy,
            consecutive_low_frames: 0,
            state: DrowsinessState::Ready,
            alert: AlertLatch::new(config.alert_clear_after()),
        }
    }

    /// Advance by one frame; `ratio` is `None` when no face was found
    pub fn advance(&mut self, ratio: Option<f64>, now: Instant) -> Transition {
        let previous = self.state;
        let mut record_episode = false;

        match ratio {
            None => {
                if self.no_face_resets_counter {
                    self.consecutive_low_frames = 0;
                }
                self.state = DrowsinessState::NoFace;
            }
            Some(ratio) if ratio < self.ear_threshold => {
                self.consecutive_low_frames = self.consecutive_low_frames.saturating_add(1);
                if self.consecutive_low_frames >= self.ear_consec_frames {
                    self.state = DrowsinessState::Drowsy;
                    self.alert.trigger(now);
                    record_episode = match self.record_policy {
                        RecordPolicy::Edge => previous != DrowsinessState::Drowsy,
                        RecordPolicy::EveryFrame => true,
                    };
                    if previous != DrowsinessState::Drowsy {
                        info!(
                            ratio,
                            frames = self.consecutive_low_frames,
                            "Drowsiness detected"
                        );
                    }
                } else {
                    // Eyes closing but not long enough yet
                    self.state = DrowsinessState::Awake;
                }
            }
            Some(_) => {
                self.consecutive_low_frames = 0;
                self.state = DrowsinessState::Awake;
                self.alert.release(now);
            }
        }

        if previous != self.state {
            debug!("State {} -> {}", previous, self.state);
        }

        Transition {
            state: self.state,
            alert_active: self.alert.is_active(),
            consecutive_low_frames: self.consecutive_low_frames,
            record_episode,
        }
    }

    /// Clear counter and alert, entering `state`
    pub fn reset(&mut self, state: DrowsinessState) {
        self.consecutive_low_frames = 0;
        self.alert.reset();
        self.state = state;
    }

    pub fn state(&self) -> DrowsinessState {
        self.state
    }

    pub fn alert_active(&self) -> bool {
        self.alert.is_active()
    }

    pub fn consecutive_low_frames(&self) -> u32 {
        self.consecutive_low_frames
    }

    pub fn ear_threshold(&self) -> f64 {
        self.ear_threshold
    }
}
