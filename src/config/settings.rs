use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::PollSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// How often each view re-reads the shared store.
    pub poll_interval_ms: u64,
    /// Up to this much is added to every poll so views drift apart.
    pub poll_jitter_ms: u64,

    /// Where the store lives. Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// `tracing` filter directive; `RUST_LOG` takes precedence.
    pub log_filter: String,

    pub ui_scale: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            poll_jitter_ms: 250,
            data_dir: None,
            log_filter: "info".into(),
            ui_scale: 1.0,
        }
    }
}

impl AppSettings {
    pub fn poll(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            jitter: Duration::from_millis(self.poll_jitter_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{"poll_interval_ms": 2000}"#).unwrap();
        assert_eq!(settings.poll_interval_ms, 2000);
        assert_eq!(settings.poll_jitter_ms, 250);
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn zero_interval_is_clamped() {
        let settings = AppSettings {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(settings.poll().interval, Duration::from_millis(1));
    }
}
