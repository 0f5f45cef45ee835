//! Camera Capture Interface
//!
//! Frame types and the acquisition seam for the drowsiness monitor.
//! Camera devices live behind [`FrameSource`]; the monitor only sees
//! decoded RGB frames.

pub mod frame;
pub mod source;

pub use frame::VideoFrame;
pub use source::FrameSource;

use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera: {0}")]
    Open(String),

    /// A single frame could not be read; the stream may recover
    #[error("Frame read failed: {0}")]
    Read(String),

    /// The stream ended or failed permanently
    #[error("Frame stream exhausted")]
    Exhausted,

    #[error("Frame buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}
