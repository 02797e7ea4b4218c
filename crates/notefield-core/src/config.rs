//! Editor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for the save debounce.
pub const MAX_SAVE_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Debounce between the last edit and the `key:` save.
    pub save_delay_ms: u64,
    /// Fields render on a dark background.
    pub night_mode: bool,
    /// Paste fidelity used when the host does not say otherwise.
    pub extended_paste: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            save_delay_ms: 600,
            night_mode: false,
            extended_paste: false,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("save delay must be between 1 and {max} ms, got {0}", max = MAX_SAVE_DELAY_MS)]
    SaveDelayOutOfRange(u64),
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.save_delay_ms == 0 || self.save_delay_ms > MAX_SAVE_DELAY_MS {
            return Err(ConfigError::SaveDelayOutOfRange(self.save_delay_ms));
        }
        Ok(())
    }

    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }
}
