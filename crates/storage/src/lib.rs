//! Storage Layer
//!
//! Persists one log row and one snapshot image per recorded drowsiness
//! episode. Both writes are append/create only; nothing is ever rewritten.

mod episode_log;
mod recorder;
mod snapshot;

pub use episode_log::{EpisodeLog, EpisodeRecord, LOG_HEADER};
pub use recorder::{EpisodeRecorder, EpisodeSink, StorageConfig};
pub use snapshot::SnapshotWriter;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Snapshot encoding failed: {0}")]
    Encode(#[from] camera_capture::CameraError),
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
