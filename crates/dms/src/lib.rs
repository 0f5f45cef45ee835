//! Driver Monitoring System (DMS)
//!
//! Eye-openness based drowsiness detection:
//! - Eye-openness ratio from six-point eye contours
//! - Per-frame two-eye estimate
//! - Consecutive-frame drowsiness state machine with debounced alert
//! - Detection session with rolling history and episode recording

pub mod analysis;
pub mod config;
pub mod detector;
pub mod estimator;
pub mod geometry;
pub mod pipeline;
pub mod replay;
pub mod session;
pub mod state;

pub use analysis::{DataSnapshot, FrameAnalysis, FrameSample};
pub use config::{DmsConfig, RecordPolicy};
pub use detector::{FaceLandmarks, FaceObservation, LandmarkDetector};
pub use estimator::{estimate_frame, EyePair};
pub use geometry::{compute_openness, EyeLandmarks, Point2D};
pub use pipeline::{run_frame_loop, SharedMonitor};
pub use replay::{open_replay, replay_from_reader, ReplayDetector, ReplaySource};
pub use session::{DrowsinessMonitor, EpisodeWriter, FrameTime};
pub use state::{DrowsinessMachine, DrowsinessState, Transition};

use thiserror::Error;

/// DMS error types
#[derive(Error, Debug)]
pub enum DmsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Landmark {index} missing (face mesh has {available} points)")]
    KeypointsMissing { index: usize, available: usize },

    #[error("Landmark detection failed: {0}")]
    Detection(String),

    #[error("Replay failed: {0}")]
    Replay(String),
}
