//! Monitor configuration
//!
//! Layers, lowest priority first: built-in defaults, an optional TOML file
//! (`drowsiness.toml`, or the path in `DROWSINESS_CONFIG`), then
//! `DROWSY_`-prefixed environment variables such as
//! `DROWSY_DMS__EAR_THRESHOLD=0.22`.

use alerting::AlertConfig;
use ::config::{Config, ConfigError, Environment, File};
use dms::DmsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use storage::StorageConfig;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "DROWSINESS_CONFIG";

/// HTTP server and frame source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,
    /// JSON-lines landmark recording to replay
    pub replay_path: Option<PathBuf>,
    /// Replay pacing (frames per second)
    pub replay_fps: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            replay_path: None,
            replay_fps: 30,
        }
    }
}

/// Complete monitor configuration, fixed at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub dms: DmsConfig,
    pub storage: StorageConfig,
    pub alerting: AlertConfig,
    pub server: ServerConfig,
}

impl MonitorConfig {
    /// Load using `DROWSINESS_CONFIG` if set, else an optional `drowsiness.toml`
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load_from(Some(Path::new(&path))),
            None => Self::load_from(None),
        }
    }

    /// Load with an explicit file (required) or the default one (optional)
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("drowsiness").required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("DROWSY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dms::RecordPolicy;

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        std::fs::write(
            &path,
            r#"
[dms]
ear_threshold = 0.25
ear_consec_frames = 20
record_policy = "every_frame"

[storage]
log_path = "/var/log/drowsy.csv"

[server]
replay_path = "session.jsonl"
"#,
        )
        .unwrap();

        let config = MonitorConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.dms.ear_threshold, 0.25);
        assert_eq!(config.dms.ear_consec_frames, 20);
        assert_eq!(config.dms.record_policy, RecordPolicy::EveryFrame);
        assert_eq!(config.dms.history_capacity, 100);
        assert_eq!(config.storage.log_path, PathBuf::from("/var/log/drowsy.csv"));
        assert_eq!(config.storage.snapshot_prefix, "drowsy");
        assert_eq!(config.alerting.interval_ms, 1000);
        assert_eq!(config.server.replay_path, Some(PathBuf::from("session.jsonl")));
        assert_eq!(config.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let result = MonitorConfig::load_from(Some(Path::new("/no/such/monitor.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_values_load_but_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[dms]\near_consec_frames = 0\n").unwrap();

        let config = MonitorConfig::load_from(Some(&path)).unwrap();
        assert!(config.dms.validate().is_err());
    }
}
