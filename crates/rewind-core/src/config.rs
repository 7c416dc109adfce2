//! Recorder configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use rewind_tabs::NodeIdScope;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Whether snapshot node ids are unique across all tabs or per tab
    pub node_id_scope: NodeIdScope,
    /// Agent message `type`s that carry no session action (injection handshake)
    pub ignored_message_types: Vec<String>,
    /// Capacity of the host event queue
    pub event_queue_capacity: usize,
}

impl Config {
    /// Load a JSON config file; absent fields keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;

        if config.event_queue_capacity == 0 {
            return Err(CoreError::Config(
                "event_queue_capacity must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }

    /// Load from `default_path()` if it exists, defaults otherwise
    pub fn load_or_default() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("rewind"))
            .unwrap_or_else(|| PathBuf::from(".rewind"))
            .join("config.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            node_id_scope: NodeIdScope::Global,
            ignored_message_types: vec!["SIGN_CONNECT".to_string()],
            event_queue_capacity: 1024,
        }
    }
}
