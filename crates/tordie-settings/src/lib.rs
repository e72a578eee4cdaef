//! Tordie Settings Crate
//!
//! Handles editor configuration: view limits, document extents, selection
//! tolerances and ruler metrics, with TOML/JSON persistence.

pub mod config;
pub mod error;

pub use config::{
    Config, DocumentSettings, RulerSettings, SelectionSettings, ViewportSettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
