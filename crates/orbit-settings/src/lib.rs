//! # orbit-settings
//!
//! Configuration for the ORBIT realtime client, loaded from three layers (in
//! priority order):
//! 1. **Compiled defaults**: [`OrbitSettings::default()`]
//! 2. **User file**: `~/.orbit/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `ORBIT_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, orbit_dir, settings_path};
pub use types::{LoggingSettings, OrbitSettings, RealtimeSettings, StorageSettings};
