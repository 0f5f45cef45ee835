//! Detection session
//!
//! Owns all mutable monitor state. Only the frame path mutates it; the
//! reporting and control surfaces reach it through a shared lock.

use crate::analysis::{DataSnapshot, FrameAnalysis, FrameSample};
use crate::config::DmsConfig;
use crate::detector::FaceObservation;
use crate::estimator::estimate_frame;
use crate::state::{DrowsinessMachine, DrowsinessState};
use crate::DmsError;
use alerting::AlertFlags;
use camera_capture::VideoFrame;
use chrono::{DateTime, Local};
use ring_buffer::RingBuffer;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use storage::{EpisodeRecord, EpisodeSink};
use tracing::{debug, info, warn};

/// Monotonic and wall-clock time of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Drives alert debounce
    pub instant: Instant,
    /// Stamps history and episode records
    pub wall: DateTime<Local>,
}

impl FrameTime {
    pub fn now() -> Self {
        Self {
            instant: Instant::now(),
            wall: Local::now(),
        }
    }

    /// Same clock, `offset` later
    pub fn after(&self, offset: Duration) -> Self {
        Self {
            instant: self.instant + offset,
            wall: self.wall + chrono::Duration::from_std(offset).unwrap_or_else(|_| chrono::Duration::zero()),
        }
    }
}

/// Writes episode records and counts the successful ones
///
/// Cloneable so the frame loop can write without holding the monitor lock.
#[derive(Clone)]
pub struct EpisodeWriter {
    sink: Arc<dyn EpisodeSink>,
    recorded: Arc<AtomicU64>,
}

impl EpisodeWriter {
    pub fn new(sink: Arc<dyn EpisodeSink>) -> Self {
        Self {
            sink,
            recorded: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Persist one episode; failures are logged, never propagated
    pub fn write(&self, record: &EpisodeRecord, frame: &VideoFrame) -> bool {
        match self.sink.record(record, frame) {
            Ok(()) => {
                self.recorded.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("dms_episodes_recorded_total").increment(1);
                true
            }
            Err(e) => {
                // Frame processing continues; the state already moved on
                warn!("Episode recording incomplete: {}", e);
                metrics::counter!("dms_recorder_failures_total").increment(1);
                false
            }
        }
    }

    pub fn recorded(&self) -> u64 {
        self.recorded.load(Ordering::Relaxed)
    }
}

/// Drowsiness monitor session
pub struct DrowsinessMonitor {
    config: DmsConfig,
    machine: DrowsinessMachine,
    history: RingBuffer<FrameSample>,
    sequence: u64,
    detection_active: bool,
    current_ratio: Option<f64>,
    writer: Option<EpisodeWriter>,
    flags: Arc<AlertFlags>,
    /// Bumped on every start/stop
    epoch: u64,
}

impl DrowsinessMonitor {
    /// Create an inactive monitor; rejects invalid configuration
    pub fn new(config: DmsConfig) -> Result<Self, DmsError> {
        config.validate()?;
        let history = RingBuffer::new(config.history_capacity)
            .map_err(|e| DmsError::Config(e.to_string()))?;
        info!("Creating drowsiness monitor with config: {:?}", config);
        Ok(Self {
            machine: DrowsinessMachine::new(&config),
            history,
            sequence: 0,
            detection_active: false,
            current_ratio: None,
            writer: None,
            flags: Arc::new(AlertFlags::new()),
            epoch: 0,
            config,
        })
    }

    /// Attach the episode sink used on drowsy frames
    pub fn with_recorder(mut self, recorder: Arc<dyn EpisodeSink>) -> Self {
        self.writer = Some(EpisodeWriter::new(recorder));
        self
    }

    /// Writer for recording episodes outside the monitor lock
    pub fn episode_writer(&self) -> Option<EpisodeWriter> {
        self.writer.clone()
    }

    /// Flags for the concurrent alert loop
    pub fn flags(&self) -> Arc<AlertFlags> {
        self.flags.clone()
    }

    /// Begin detection with a full reset (also when already active)
    pub fn start(&mut self) {
        self.detection_active = true;
        self.epoch += 1;
        self.machine.reset(DrowsinessState::Starting);
        self.history.clear();
        self.sequence = 0;
        self.current_ratio = None;
        self.publish_flags();
        info!("Detection started");
    }

    /// Stop detection; history is kept for display
    pub fn stop(&mut self) {
        self.detection_active = false;
        self.epoch += 1;
        self.machine.reset(DrowsinessState::Ready);
        self.publish_flags();
        info!("Detection stopped");
    }

    /// Flip detection on or off, returning the new active flag
    pub fn toggle(&mut self) -> bool {
        if self.detection_active {
            self.stop();
        } else {
            self.start();
        }
        self.detection_active
    }

    pub fn is_active(&self) -> bool {
        self.detection_active
    }

    /// Changes whenever detection is started or stopped
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Run one frame through estimation, the state machine and recording
    ///
    /// Frames seen while inactive are passed through untouched.
    pub fn process(
        &mut self,
        frame: &VideoFrame,
        observation: Option<&FaceObservation>,
        time: FrameTime,
    ) -> FrameAnalysis {
        let (mut analysis, pending) = self.advance_frame(frame, observation, time);
        if let (Some(record), Some(writer)) = (pending, &self.writer) {
            analysis.episode_recorded = writer.write(&record, frame);
        }
        analysis
    }

    /// Like [`process`](Self::process) but without I/O: a pending episode
    /// record is returned for the caller to write via [`EpisodeWriter`]
    pub fn advance_frame(
        &mut self,
        frame: &VideoFrame,
        observation: Option<&FaceObservation>,
        time: FrameTime,
    ) -> (FrameAnalysis, Option<EpisodeRecord>) {
        if !self.detection_active {
            return (FrameAnalysis::inactive(self.machine.state()), None);
        }

        let eyes = observation.and_then(|obs| match obs.eye_pair(frame.width, frame.height) {
            Ok(pair) => Some(pair),
            Err(e) => {
                warn!("Unusable landmarks, treating frame as no face: {}", e);
                None
            }
        });
        let ratio = estimate_frame(eyes.as_ref());

        metrics::counter!("dms_frames_processed_total").increment(1);
        match ratio {
            Some(r) => {
                self.sequence += 1;
                self.history.push(FrameSample {
                    sequence: self.sequence,
                    ratio: r,
                    timestamp: time.wall,
                });
                metrics::gauge!("dms_current_ear").set(r);
            }
            None => {
                metrics::counter!("dms_no_face_frames_total").increment(1);
                metrics::gauge!("dms_current_ear").set(0.0);
            }
        }
        self.current_ratio = ratio;

        let transition = self.machine.advance(ratio, time.instant);
        debug!(
            state = %transition.state,
            ratio = ratio.unwrap_or(0.0),
            low_frames = transition.consecutive_low_frames,
            "Frame processed"
        );

        let pending = match ratio {
            Some(r) if transition.record_episode => Some(EpisodeRecord::new(
                time.wall,
                r,
                DrowsinessState::Drowsy.label(),
            )),
            _ => None,
        };

        self.publish_flags();

        let analysis = FrameAnalysis {
            detection_active: true,
            state: transition.state,
            ratio,
            alert_active: transition.alert_active,
            consecutive_low_frames: transition.consecutive_low_frames,
            eyes,
            episode_recorded: false,
        };
        (analysis, pending)
    }

    fn publish_flags(&self) {
        self.flags.publish(self.machine.alert_active(), self.detection_active);
    }

    /// Reporting snapshot
    pub fn snapshot(&self) -> DataSnapshot {
        let (ear_values, timestamps) = self
            .history
            .iter()
            .map(|s| (s.ratio, s.sequence))
            .unzip();
        DataSnapshot {
            ear_values,
            timestamps,
            status: self.machine.state(),
            current_ear: self.current_ratio.unwrap_or(0.0),
            alert_active: self.machine.alert_active(),
            threshold: self.config.ear_threshold,
            detection_active: self.detection_active,
        }
    }

    pub fn state(&self) -> DrowsinessState {
        self.machine.state()
    }

    pub fn alert_active(&self) -> bool {
        self.machine.alert_active()
    }

    pub fn consecutive_low_frames(&self) -> u32 {
        self.machine.consecutive_low_frames()
    }

    pub fn history(&self) -> &RingBuffer<FrameSample> {
        &self.history
    }

    pub fn episodes_recorded(&self) -> u64 {
        self.writer.as_ref().map_or(0, EpisodeWriter::recorded)
    }

    pub fn config(&self) -> &DmsConfig {
        &self.config
    }
}
