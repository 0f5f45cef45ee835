//! Snapshot images for recorded episodes

use crate::StorageError;
use camera_capture::VideoFrame;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::debug;

const JPEG_QUALITY: u8 = 90;

/// Writes one JPEG per episode, named from its timestamp
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
    prefix: String,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// `<prefix>_YYYYMMDD_HHMMSS.jpg`; same-second snapshots share a name
    pub fn file_name(&self, timestamp: &DateTime<Local>) -> String {
        format!("{}_{}.jpg", self.prefix, timestamp.format("%Y%m%d_%H%M%S"))
    }

    pub fn path_for(&self, timestamp: &DateTime<Local>) -> PathBuf {
        self.dir.join(self.file_name(timestamp))
    }

    /// Encode and write the frame, returning the written path
    pub fn write(&self, frame: &VideoFrame, timestamp: &DateTime<Local>) -> Result<PathBuf, StorageError> {
        let jpeg = frame.encode_jpeg(JPEG_QUALITY)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        let path = self.path_for(timestamp);
        std::fs::write(&path, jpeg).map_err(|e| StorageError::io(&path, e))?;
        debug!("Wrote snapshot {}", path.display());
        Ok(path)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_name_pattern() {
        let writer = SnapshotWriter::new(".", "drowsy");
        let ts = Local.with_ymd_and_hms(2024, 12, 1, 8, 5, 9).unwrap();
        assert_eq!(writer.file_name(&ts), "drowsy_20241201_080509.jpg");
    }

    #[test]
    fn test_write_creates_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("snaps"), "drowsy");
        let ts = Local.with_ymd_and_hms(2024, 12, 1, 8, 5, 9).unwrap();

        let path = writer.write(&VideoFrame::blank(16, 16, 0), &ts).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_same_second_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path(), "drowsy");
        let ts = Local.with_ymd_and_hms(2024, 12, 1, 8, 5, 9).unwrap();

        let first = writer.write(&VideoFrame::blank(8, 8, 0), &ts).unwrap();
        let second = writer.write(&VideoFrame::blank(8, 8, 1), &ts).unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
