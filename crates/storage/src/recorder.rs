//! Episode recorder
//!
//! Pairs a log row with a snapshot image. The two writes are independent:
//! a failed snapshot does not retract the log row and vice versa.

use crate::{EpisodeLog, EpisodeRecord, SnapshotWriter, StorageError};
use camera_capture::VideoFrame;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{error, info};

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// CSV episode log path
    pub log_path: PathBuf,
    /// Directory for snapshot images
    pub snapshot_dir: PathBuf,
    /// Snapshot file name prefix
    pub snapshot_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("drowsiness_log.csv"),
            snapshot_dir: PathBuf::from("."),
            snapshot_prefix: "drowsy".to_string(),
        }
    }
}

/// Destination for recorded episodes
pub trait EpisodeSink: Send + Sync {
    fn record(&self, record: &EpisodeRecord, frame: &VideoFrame) -> Result<(), StorageError>;
}

/// File-backed recorder: CSV row plus JPEG snapshot
#[derive(Debug, Clone)]
pub struct EpisodeRecorder {
    log: EpisodeLog,
    snapshots: SnapshotWriter,
}

impl EpisodeRecorder {
    pub fn new(log: EpisodeLog, snapshots: SnapshotWriter) -> Self {
        Self { log, snapshots }
    }

    /// Open the log (writing its header if new) and set up the snapshot writer
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let log = EpisodeLog::open(&config.log_path)?;
        let snapshots = SnapshotWriter::new(&config.snapshot_dir, &config.snapshot_prefix);
        info!(
            "Episode recorder ready (log: {}, snapshots: {})",
            log.path().display(),
            snapshots.dir().display()
        );
        Ok(Self::new(log, snapshots))
    }
}

impl EpisodeSink for EpisodeRecorder {
    fn record(&self, record: &EpisodeRecord, frame: &VideoFrame) -> Result<(), StorageError> {
        let logged = self.log.append(record);
        if let Err(e) = &logged {
            error!("Failed to append episode log row: {}", e);
        }

        let snapped = self.snapshots.write(frame, &record.timestamp);
        match &snapped {
            Ok(path) => info!("Drowsiness episode recorded, snapshot {}", path.display()),
            Err(e) => error!("Failed to write episode snapshot: {}", e),
        }

        logged.and(snapped.map(|_| ()))
    }
}
