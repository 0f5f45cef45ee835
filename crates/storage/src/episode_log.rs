//! Append-only CSV episode log

use crate::StorageError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Header row written when the log file is created
pub const LOG_HEADER: &str = "Timestamp,EAR,Status";

/// One recorded drowsiness episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub timestamp: DateTime<Local>,
    /// Eye-openness ratio rounded to two decimals
    pub ratio: f64,
    pub status: String,
}

impl EpisodeRecord {
    pub fn new(timestamp: DateTime<Local>, ratio: f64, status: impl Into<String>) -> Self {
        Self {
            timestamp,
            ratio: (ratio * 100.0).round() / 100.0,
            status: status.into(),
        }
    }

    /// Render as a CSV row (no trailing newline)
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{:.2},{}",
            self.timestamp.format("%Y-%m-%dT%H:%M:%S%.6f"),
            self.ratio,
            self.status
        )
    }
}

/// Append-only log of episode records
#[derive(Debug, Clone)]
pub struct EpisodeLog {
    path: PathBuf,
}

impl EpisodeLog {
    /// Open the log, creating it with a header row if absent
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
            }
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .map_err(|e| StorageError::io(&path, e))?;
            writeln!(file, "{}", LOG_HEADER).map_err(|e| StorageError::io(&path, e))?;
            info!("Created episode log at {}", path.display());
        }
        Ok(Self { path })
    }

    /// Append one record
    pub fn append(&self, record: &EpisodeRecord) -> Result<(), StorageError> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| StorageError::io(&self.path, e))?;
        writeln!(file, "{}", record.to_csv_row()).map_err(|e| StorageError::io(&self.path, e))?;
        debug!("Appended episode row to {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
