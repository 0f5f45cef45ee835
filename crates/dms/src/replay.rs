//! Landmark replay
//!
//! Plays back a JSON-lines recording of detector output in place of a
//! live camera and landmark model. Each line describes one frame:
//!
//! ```text
//! {"width":640,"height":480,"face":{"mesh":{"points":[{"x":0.1,"y":0.2}, ...]}}}
//! {"width":640,"height":480,"face":null}
//! ```

use crate::detector::{FaceObservation, LandmarkDetector};
use crate::DmsError;
use camera_capture::{CameraError, FrameSource, VideoFrame};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::info;

/// One recorded frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub face: Option<FaceObservation>,
}

/// Observation of the most recent frame, not yet taken by the detector
///
/// Outer `None` means nothing pending; `Some(None)` is a recorded no-face frame.
type LatestObservation = Arc<Mutex<Option<Option<FaceObservation>>>>;

/// Frame half of a replay: yields blank frames sized as recorded
pub struct ReplaySource {
    reader: Box<dyn BufRead + Send>,
    latest: LatestObservation,
    frame_interval: Option<Duration>,
    sequence: u32,
    line: String,
}

/// Detector half of a replay: returns the observation of the latest frame
pub struct ReplayDetector {
    latest: LatestObservation,
}

/// Open a replay file
pub fn open_replay(path: impl AsRef<Path>) -> Result<(ReplaySource, ReplayDetector), DmsError> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| DmsError::Replay(format!("{}: {}", path.display(), e)))?;
    info!("Replaying landmarks from {}", path.display());
    Ok(replay_from_reader(BufReader::new(file)))
}

/// Build a replay over any line reader
pub fn replay_from_reader(reader: impl BufRead + Send + 'static) -> (ReplaySource, ReplayDetector) {
    let latest = LatestObservation::default();
    (
        ReplaySource {
            reader: Box::new(reader),
            latest: latest.clone(),
            frame_interval: None,
            sequence: 0,
            line: String::new(),
        },
        ReplayDetector { latest },
    )
}

impl ReplaySource {
    /// Pace playback at `fps` frames per second
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.frame_interval = (fps > 0).then(|| Duration::from_secs_f64(1.0 / fps as f64));
        self
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Result<VideoFrame, CameraError> {
        let record = loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .map_err(|e| CameraError::Read(e.to_string()))?;
            if read == 0 {
                return Err(CameraError::Exhausted);
            }
            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            break serde_json::from_str::<ReplayRecord>(trimmed)
                .map_err(|e| CameraError::Read(format!("bad replay line: {}", e)))?;
        };

        if let Some(interval) = self.frame_interval {
            std::thread::sleep(interval);
        }

        // Detector half gone means nobody consumes observations
        if Arc::strong_count(&self.latest) == 1 {
            return Err(CameraError::Exhausted);
        }
        // Overwrites any observation the detector skipped
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(record.face);

        self.sequence = self.sequence.wrapping_add(1);
        Ok(VideoFrame::blank(record.width, record.height, self.sequence))
    }
}

impl LandmarkDetector for ReplayDetector {
    fn detect(&mut self, _frame: &VideoFrame) -> Result<Option<FaceObservation>, DmsError> {
        let taken = self.latest.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(taken.flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::EyePair;
    use crate::geometry::tests::eye;
    use std::io::Cursor;

    fn eyes_line(opening: f64) -> String {
        let record = ReplayRecord {
            width: 64,
            height: 48,
            face: Some(FaceObservation::Eyes(EyePair {
                left: eye(20.0, 20.0, 10.0, opening),
                right: eye(40.0, 20.0, 10.0, opening),
            })),
        };
        serde_json::to_string(&record).unwrap()
    }

    #[test]
    fn test_pairs_frames_with_observations() {
        let input = format!("{}\n\n{{\"width\":64,\"height\":48}}\n", eyes_line(4.0));
        let (mut source, mut detector) = replay_from_reader(Cursor::new(input));

        let frame = source.next_frame().unwrap();
        assert_eq!((frame.width, frame.height, frame.sequence), (64, 48, 1));
        assert!(matches!(detector.detect(&frame).unwrap(), Some(FaceObservation::Eyes(_))));

        let frame = source.next_frame().unwrap();
        assert_eq!(detector.detect(&frame).unwrap(), None);

        assert!(matches!(source.next_frame(), Err(CameraError::Exhausted)));
    }

    #[test]
    fn test_skipped_detection_uses_latest() {
        let input = format!("{}\n{}\n", eyes_line(1.0), eyes_line(6.0));
        let (mut source, mut detector) = replay_from_reader(Cursor::new(input));

        source.next_frame().unwrap();
        let frame = source.next_frame().unwrap();
        let Some(FaceObservation::Eyes(pair)) = detector.detect(&frame).unwrap() else {
            panic!("expected eye observation");
        };
        assert_eq!(pair.left, eye(20.0, 20.0, 10.0, 6.0));
    }

    #[test]
    fn test_idle_frames_hold_one_observation() {
        let input = format!("{}\n", eyes_line(4.0)).repeat(5000);
        let (mut source, mut detector) = replay_from_reader(Cursor::new(input));

        for _ in 0..5000 {
            source.next_frame().unwrap();
        }
        assert!(detector.latest.lock().unwrap().is_some());

        let frame = source.next_frame();
        assert!(matches!(frame, Err(CameraError::Exhausted)));
        assert!(detector.detect(&VideoFrame::blank(64, 48, 0)).unwrap().is_some());
        assert!(detector.latest.lock().unwrap().is_none());
        assert_eq!(detector.detect(&VideoFrame::blank(64, 48, 0)).unwrap(), None);
    }

    #[test]
    fn test_dropped_detector_ends_replay() {
        let (mut source, detector) = replay_from_reader(Cursor::new(eyes_line(4.0)));
        drop(detector);
        assert!(matches!(source.next_frame(), Err(CameraError::Exhausted)));
    }

    #[test]
    fn test_bad_line_is_read_error() {
        let (mut source, _detector) = replay_from_reader(Cursor::new("not json\n"));
        assert!(matches!(source.next_frame(), Err(CameraError::Read(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = open_replay("/definitely/not/here.jsonl").err().unwrap();
        assert!(matches!(err, DmsError::Replay(_)));
    }
}
