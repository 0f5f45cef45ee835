//! Landmark detector interface
//!
//! The face landmark model itself is external. Detectors hand the monitor
//! either a full normalized face mesh or pre-extracted eye contours.

use crate::estimator::EyePair;
use crate::geometry::{EyeLandmarks, Point2D};
use crate::DmsError;
use camera_capture::VideoFrame;
use serde::{Deserialize, Serialize};

/// Face-mesh indices of the left eye contour (corner, upper lid x2, corner, lower lid x2)
pub const LEFT_EYE_INDICES: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// Face-mesh indices of the right eye contour
pub const RIGHT_EYE_INDICES: [usize; 6] = [362, 385, 387, 263, 373, 380];

/// Face mesh landmarks in normalized [0, 1] image coordinates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceLandmarks {
    pub points: Vec<Point2D>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    /// Extract one eye, scaled to pixels and truncated to whole pixels
    pub fn eye(&self, indices: &[usize; 6], width: u32, height: u32) -> Result<EyeLandmarks, DmsError> {
        let mut eye = [Point2D::default(); 6];
        for (slot, &index) in eye.iter_mut().zip(indices) {
            let p = self.points.get(index).ok_or(DmsError::KeypointsMissing {
                index,
                available: self.points.len(),
            })?;
            *slot = Point2D::new(
                (p.x * width as f64).trunc(),
                (p.y * height as f64).trunc(),
            );
        }
        Ok(EyeLandmarks(eye))
    }

    pub fn eye_pair(&self, width: u32, height: u32) -> Result<EyePair, DmsError> {
        Ok(EyePair {
            left: self.eye(&LEFT_EYE_INDICES, width, height)?,
            right: self.eye(&RIGHT_EYE_INDICES, width, height)?,
        })
    }
}

/// What a detector saw for the single tracked face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceObservation {
    /// Full normalized face mesh
    Mesh(FaceLandmarks),
    /// Eye contours already in pixel coordinates
    Eyes(EyePair),
}

impl FaceObservation {
    /// Pixel-space eye contours for a frame of the given size
    pub fn eye_pair(&self, width: u32, height: u32) -> Result<EyePair, DmsError> {
        match self {
            FaceObservation::Mesh(mesh) => mesh.eye_pair(width, height),
            FaceObservation::Eyes(pair) => Ok(*pair),
        }
    }
}

/// Face landmark detector
///
/// `Ok(None)` means no face in the frame.
pub trait LandmarkDetector {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Option<FaceObservation>, DmsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_with_eyes() -> FaceLandmarks {
        let mut points = vec![Point2D::new(0.5, 0.5); 478];
        for (i, &idx) in LEFT_EYE_INDICES.iter().enumerate() {
            points[idx] = Point2D::new(0.30 + i as f64 * 0.01, 0.40);
        }
        for (i, &idx) in RIGHT_EYE_INDICES.iter().enumerate() {
            points[idx] = Point2D::new(0.60 + i as f64 * 0.01, 0.40);
        }
        FaceLandmarks::new(points)
    }

    #[test]
    fn test_denormalizes_to_whole_pixels() {
        let mesh = mesh_with_eyes();
        let pair = mesh.eye_pair(640, 480).unwrap();

        // 0.31 * 640 = 198.4 -> 198
        assert_eq!(pair.left.points()[1], Point2D::new(198.0, 192.0));
        assert_eq!(pair.right.points()[0], Point2D::new(384.0, 192.0));
    }

    #[test]
    fn test_short_mesh_is_rejected() {
        let mesh = FaceLandmarks::new(vec![Point2D::default(); 100]);
        let err = mesh.eye_pair(640, 480).unwrap_err();
        assert!(matches!(
            err,
            DmsError::KeypointsMissing {
                index: 160,
                available: 100
            }
        ));
    }

    #[test]
    fn test_eye_observation_passes_through() {
        let pair = mesh_with_eyes().eye_pair(100, 100).unwrap();
        let obs = FaceObservation::Eyes(pair);
        assert_eq!(obs.eye_pair(640, 480).unwrap(), pair);
    }
}
