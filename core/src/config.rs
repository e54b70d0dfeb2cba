//! Runtime configuration. History depth and flash timing are fixed
//! constants in `types`; only environment-facing settings live here.

use crate::snapshot::DEFAULT_SNAPSHOT_KEY;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// SQLite database path, or `:memory:`.
    pub db_path: String,
    /// Name of the snapshot entry; scopes persisted state.
    pub snapshot_key: String,
    /// Show remaining undo depth.
    pub debug: bool,
    /// Sessions whose event log survives a restart; older ones are pruned.
    pub event_log_sessions: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            db_path: "city-tracker.db".into(),
            snapshot_key: DEFAULT_SNAPSHOT_KEY.into(),
            debug: false,
            event_log_sessions: 20,
        }
    }
}

impl TrackerConfig {
    /// Load from a JSON file. Missing keys fall back to defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: TrackerConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        if config.snapshot_key.trim().is_empty() {
            anyhow::bail!("{path}: snapshot_key must not be empty");
        }
        Ok(config)
    }

    /// In-memory config for tests.
    pub fn default_test() -> Self {
        Self {
            db_path: ":memory:".into(),
            snapshot_key: "test-state".into(),
            debug: true,
            event_log_sessions: 20,
        }
    }
}
