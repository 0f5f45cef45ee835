//! Frame processing loop

use crate::analysis::FrameAnalysis;
use crate::detector::LandmarkDetector;
use crate::session::{DrowsinessMonitor, FrameTime};
use camera_capture::{CameraError, FrameSource, VideoFrame};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Monitor handle shared by the frame path and the HTTP surface
pub type SharedMonitor = Arc<RwLock<DrowsinessMonitor>>;

/// Consecutive failed reads before the stream is given up
pub const MAX_CONSECUTIVE_READ_FAILURES: u32 = 30;

/// Pull frames until the source is exhausted, returning the frame count
///
/// Blocking; run it on a dedicated thread. Detection only runs while the
/// monitor is active. `on_frame` sees every processed frame with its
/// analysis; frames whose detection straddled a start/stop are dropped.
pub fn run_frame_loop<S, D, F>(
    source: &mut S,
    detector: &mut D,
    monitor: &RwLock<DrowsinessMonitor>,
    mut on_frame: F,
) -> Result<u64, CameraError>
where
    S: FrameSource + ?Sized,
    D: LandmarkDetector + ?Sized,
    F: FnMut(&VideoFrame, &FrameAnalysis),
{
    let (mirror, writer) = {
        let guard = monitor.blocking_read();
        (guard.config().mirror_frames, guard.episode_writer())
    };
    let mut frames = 0u64;
    let mut failures = 0u32;

    info!("Frame loop started");
    loop {
        let mut frame = match source.next_frame() {
            Ok(frame) => {
                failures = 0;
                frame
            }
            Err(CameraError::Exhausted) => {
                info!("Frame source exhausted after {} frames", frames);
                return Ok(frames);
            }
            Err(e) => {
                failures += 1;
                warn!("Frame read failed ({}/{}): {}", failures, MAX_CONSECUTIVE_READ_FAILURES, e);
                if failures >= MAX_CONSECUTIVE_READ_FAILURES {
                    error!("Giving up on frame source");
                    return Err(e);
                }
                continue;
            }
        };
        frames += 1;

        if mirror {
            frame.mirror();
        }

        // Activity and epoch are read together; a start/stop while the
        // detector runs invalidates this frame's observation
        let (active, epoch) = {
            let guard = monitor.blocking_read();
            (guard.is_active(), guard.epoch())
        };
        let observation = if active {
            match detector.detect(&frame) {
                Ok(obs) => obs,
                Err(e) => {
                    // Keep the last good state for this frame
                    warn!("Landmark detection failed: {}", e);
                    continue;
                }
            }
        } else {
            None
        };

        let mut guard = monitor.blocking_write();
        if guard.epoch() != epoch {
            debug!("Detection toggled during landmark detection, skipping frame");
            continue;
        }
        let (mut analysis, pending) =
            guard.advance_frame(&frame, observation.as_ref(), FrameTime::now());
        drop(guard);

        // Snapshot encoding and file writes happen outside the lock
        if let (Some(record), Some(writer)) = (pending, &writer) {
            analysis.episode_recorded = writer.write(&record, &frame);
        }
        on_frame(&frame, &analysis);
    }
}
