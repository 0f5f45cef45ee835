//! Eye-openness geometry
//!
//! Six-point eye contour convention: points 0 and 3 are the eye corners,
//! (1, 5) and (2, 4) are the upper/lower lid pairs.

use serde::{Deserialize, Serialize};

/// Eye widths at or below this are treated as degenerate detections
pub const MIN_EYE_WIDTH: f64 = 1e-6;

/// Point in pixel (or normalized) image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance
    pub fn distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Six eye contour points in fixed anatomical order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeLandmarks(pub [Point2D; 6]);

impl EyeLandmarks {
    pub fn points(&self) -> &[Point2D; 6] {
        &self.0
    }
}

/// Eye-openness ratio: mean lid separation over eye width
///
/// Returns `None` for a degenerate (zero-width or non-finite) eye.
pub fn compute_openness(eye: &EyeLandmarks) -> Option<f64> {
    let p = eye.points();
    let vertical_1 = p[1].distance(&p[5]);
    let vertical_2 = p[2].distance(&p[4]);
    let horizontal = p[0].distance(&p[3]);

    if !horizontal.is_finite() || horizontal <= MIN_EYE_WIDTH {
        return None;
    }

    let ratio = (vertical_1 + vertical_2) / (2.0 * horizontal);
    ratio.is_finite().then_some(ratio)
}
