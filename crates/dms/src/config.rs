//! DMS configuration

use crate::DmsError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When a drowsy frame produces an episode record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordPolicy {
    /// Once per episode, on entry into DROWSY
    #[default]
    Edge,
    /// On every frame classified DROWSY
    EveryFrame,
}

/// DMS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// Eye-openness ratio below which a frame counts as eyes-closed
    pub ear_threshold: f64,

    /// Consecutive eyes-closed frames before DROWSY
    pub ear_consec_frames: u32,

    /// Rolling history capacity (samples)
    pub history_capacity: usize,

    /// Seconds an alert stays raised after its last trigger
    pub alert_clear_secs: u64,

    /// Whether a no-face frame resets the eyes-closed counter
    pub no_face_resets_counter: bool,

    /// Episode recording policy
    pub record_policy: RecordPolicy,

    /// Mirror frames horizontally before analysis
    pub mirror_frames: bool,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.20,
            ear_consec_frames: 50,
            history_capacity: ring_buffer::DEFAULT_CAPACITY,
            alert_clear_secs: 3,
            no_face_resets_counter: false,
            record_policy: RecordPolicy::Edge,
            mirror_frames: true,
        }
    }
}

impl DmsConfig {
    /// Reject out-of-range values; nothing is clamped
    pub fn validate(&self) -> Result<(), DmsError> {
        if !self.ear_threshold.is_finite() || self.ear_threshold <= 0.0 {
            return Err(DmsError::Config(format!(
                "ear_threshold must be a positive number, got {}",
                self.ear_threshold
            )));
        }
        if self.ear_consec_frames < 1 {
            return Err(DmsError::Config(
                "ear_consec_frames must be at least 1, got 0".to_string(),
            ));
        }
        if self.history_capacity < 1 {
            return Err(DmsError::Config(
                "history_capacity must be at least 1, got 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn alert_clear_after(&self) -> Duration {
        Duration::from_secs(self.alert_clear_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DmsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ear_threshold, 0.20);
        assert_eq!(config.ear_consec_frames, 50);
        assert_eq!(config.history_capacity, 100);
    }

    #[test]
    fn test_rejects_non_positive_threshold() {
        for threshold in [0.0, -0.1, f64::NAN] {
            let config = DmsConfig {
                ear_threshold: threshold,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(DmsError::Config(_))));
        }
    }

    #[test]
    fn test_rejects_zero_frames() {
        let config = DmsConfig {
            ear_consec_frames: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ear_consec_frames"));
    }

    #[test]
    fn test_record_policy_names() {
        let policy: RecordPolicy = serde_json::from_str("\"every_frame\"").unwrap();
        assert_eq!(policy, RecordPolicy::EveryFrame);
    }
}
