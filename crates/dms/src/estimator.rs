//! Per-frame eye state estimation

use crate::geometry::{compute_openness, EyeLandmarks};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Left and right eye contours of one face, in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyePair {
    pub left: EyeLandmarks,
    pub right: EyeLandmarks,
}

/// Single openness scalar for a frame; `None` when no usable face
///
/// Mean of both eyes. A degenerate eye is dropped and the other eye used
/// alone; two degenerate eyes count as no face.
pub fn estimate_frame(eyes: Option<&EyePair>) -> Option<f64> {
    let eyes = eyes?;
    match (compute_openness(&eyes.left), compute_openness(&eyes.right)) {
        (Some(left), Some(right)) => Some((left + right) / 2.0),
        (Some(one), None) | (None, Some(one)) => {
            debug!("One eye degenerate, using the other alone");
            Some(one)
        }
        (None, None) => {
            debug!("Both eyes degenerate, treating frame as no face");
            None
        }
    }
}
