//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`OrbitSettings::default()`]
//! 2. If `~/.orbit/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `ORBIT_*` environment overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::OrbitSettings;

/// `~/.orbit`, falling back to `/tmp/.orbit` when `HOME` is unset.
pub fn orbit_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".orbit")
}

/// Resolve the path to the settings file (`~/.orbit/settings.json`).
pub fn settings_path() -> PathBuf {
    orbit_dir().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<OrbitSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. Invalid JSON or values that
/// fail validation are errors.
pub fn load_settings_from_path(path: &Path) -> Result<OrbitSettings> {
    load_with_env(path, |name| std::env::var(name).ok())
}

fn load_with_env(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<OrbitSettings> {
    let defaults = serde_json::to_value(OrbitSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: OrbitSettings = serde_json::from_value(merged)?;
    apply_overrides(&mut settings, env);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `ORBIT_*` overrides read through `env`.
///
/// Invalid values are ignored with a warning (falling back to file/default).
pub fn apply_overrides(settings: &mut OrbitSettings, env: impl Fn(&str) -> Option<String>) {
    let string = |name: &str| env(name).filter(|v| !v.is_empty());

    // ── Realtime ────────────────────────────────────────────────────
    if let Some(v) = string("ORBIT_BASE_URL") {
        settings.realtime.base_url = v;
    }
    if let Some(v) = string("ORBIT_WS_PATH") {
        settings.realtime.ws_path = v;
    }
    if let Some(v) = string("ORBIT_RECONNECT_DELAY_MS") {
        match parse_u64_range(&v, 1, 3_600_000) {
            Some(n) => settings.realtime.reconnect_delay_ms = n,
            None => warn_invalid("ORBIT_RECONNECT_DELAY_MS", &v),
        }
    }
    if let Some(v) = string("ORBIT_SEND_QUEUE") {
        match parse_usize_range(&v, 1, 65_536) {
            Some(n) => settings.realtime.send_queue = n,
            None => warn_invalid("ORBIT_SEND_QUEUE", &v),
        }
    }

    // ── Storage ─────────────────────────────────────────────────────
    if let Some(v) = string("ORBIT_LOCAL_STORE") {
        settings.storage.local_store_path = PathBuf::from(v);
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = string("ORBIT_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = string("ORBIT_LOG_JSON") {
        match parse_bool(&v) {
            Some(b) => settings.logging.json = b,
            None => warn_invalid("ORBIT_LOG_JSON", &v),
        }
    }
}

fn warn_invalid(key: &str, value: &str) {
    tracing::warn!(key, value, "invalid env var, ignoring");
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}
