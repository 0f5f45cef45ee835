//! DMS per-frame output and reporting snapshot

use crate::estimator::EyePair;
use crate::state::DrowsinessState;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One face-present frame in the rolling history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    /// Face-present frame number since detection started
    pub sequence: u64,
    /// Eye-openness ratio
    pub ratio: f64,
    pub timestamp: DateTime<Local>,
}

/// Everything a renderer needs to annotate one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// Whether detection ran on this frame
    pub detection_active: bool,

    pub state: DrowsinessState,

    /// Eye-openness ratio, absent when no usable face
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,

    pub alert_active: bool,

    pub consecutive_low_frames: u32,

    /// Eye contour points in pixel coordinates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eyes: Option<EyePair>,

    /// An episode record was written for this frame
    pub episode_recorded: bool,
}

impl FrameAnalysis {
    /// Pass-through result for frames seen while detection is off
    pub fn inactive(state: DrowsinessState) -> Self {
        Self {
            detection_active: false,
            state,
            ratio: None,
            alert_active: false,
            consecutive_low_frames: 0,
            eyes: None,
            episode_recorded: false,
        }
    }

    /// Ratio for display; absent shows as 0.0
    pub fn display_ratio(&self) -> f64 {
        self.ratio.unwrap_or(0.0)
    }

    pub fn face_detected(&self) -> bool {
        self.ratio.is_some()
    }
}

/// Reporting snapshot served to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSnapshot {
    /// Ratios in insertion order
    pub ear_values: Vec<f64>,
    /// Sequence numbers matching `ear_values`
    pub timestamps: Vec<u64>,
    pub status: DrowsinessState,
    pub current_ear: f64,
    pub alert_active: bool,
    pub threshold: f64,
    pub detection_active: bool,
}
