//! Settings structs. All sections deserialize with `camelCase` keys and fall
//! back to their defaults per field.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrbitSettings {
    /// Push-update connection settings.
    pub realtime: RealtimeSettings,
    /// Durable storage settings.
    pub storage: StorageSettings,
    /// Log output settings.
    pub logging: LoggingSettings,
}

impl OrbitSettings {
    /// Reject values the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        let base = &self.realtime.base_url;
        if !(base.starts_with("http://")
            || base.starts_with("https://")
            || base.starts_with("ws://")
            || base.starts_with("wss://"))
        {
            return Err(SettingsError::InvalidValue(format!(
                "realtime.baseUrl must be an http(s) or ws(s) URL, got {base:?}"
            )));
        }
        if !self.realtime.ws_path.starts_with('/') {
            return Err(SettingsError::InvalidValue(format!(
                "realtime.wsPath must start with '/', got {:?}",
                self.realtime.ws_path
            )));
        }
        if self.realtime.reconnect_delay_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "realtime.reconnectDelayMs must be > 0".into(),
            ));
        }
        if self.realtime.send_queue == 0 {
            return Err(SettingsError::InvalidValue(
                "realtime.sendQueue must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Push-update connection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealtimeSettings {
    /// Origin of the ORBIT web app; `https` selects `wss`.
    pub base_url: String,
    /// Path of the WebSocket endpoint.
    pub ws_path: String,
    /// Fixed delay between a close and the next connect, in milliseconds.
    pub reconnect_delay_ms: u64,
    /// Capacity of the outbound frame queue while connected.
    pub send_queue: usize,
}

impl RealtimeSettings {
    /// Reconnect delay as a [`Duration`].
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            ws_path: "/ws".to_string(),
            reconnect_delay_ms: 3000,
            send_queue: 64,
        }
    }
}

/// Durable storage settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    /// File backing the local (durable) key/value store.
    pub local_store_path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            local_store_path: crate::loader::orbit_dir().join("local-storage.json"),
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case() {
        let value = serde_json::to_value(OrbitSettings::default()).unwrap();
        assert_eq!(value["realtime"]["reconnectDelayMs"], 3000);
        assert_eq!(value["realtime"]["baseUrl"], "http://localhost:5000");
        assert!(value["storage"]["localStorePath"].is_string());
    }

    #[test]
    fn partial_section_keeps_defaults() {
        let settings: OrbitSettings =
            serde_json::from_str(r#"{"realtime": {"baseUrl": "https://orbit.example"}}"#).unwrap();
        assert_eq!(settings.realtime.base_url, "https://orbit.example");
        assert_eq!(settings.realtime.reconnect_delay_ms, 3000);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn reconnect_delay_duration() {
        let realtime = RealtimeSettings {
            reconnect_delay_ms: 1500,
            ..RealtimeSettings::default()
        };
        assert_eq!(realtime.reconnect_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn validate_rejects_bad_scheme() {
        let mut settings = OrbitSettings::default();
        settings.realtime.base_url = "ftp://orbit.example".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_delay() {
        let mut settings = OrbitSettings::default();
        settings.realtime.reconnect_delay_ms = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_relative_ws_path() {
        let mut settings = OrbitSettings::default();
        settings.realtime.ws_path = "ws".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_queue() {
        let mut settings = OrbitSettings::default();
        settings.realtime.send_queue = 0;
        assert!(settings.validate().is_err());
    }
}
