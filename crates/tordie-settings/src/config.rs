//! Configuration and settings management for Tordie
//!
//! Provides configuration file handling, defaults, and validation.
//! Supports JSON and TOML file formats stored in the platform config directory.
//!
//! Configuration is organized into logical sections:
//! - Viewport settings (zoom limits, initial pan/zoom/rotation, scroll padding)
//! - Document extents
//! - Selection tolerances (drag threshold, hit radii)
//! - Ruler metrics (thickness, tick lengths, divisions)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// View transform limits and initial state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    /// Smallest allowed zoom factor
    pub min_zoom: f64,
    /// Largest allowed zoom factor
    pub max_zoom: f64,
    /// Zoom applied on startup and by reset
    pub default_zoom: f64,
    /// Initial horizontal pan in screen pixels
    pub default_offset_x: f64,
    /// Initial vertical pan in screen pixels
    pub default_offset_y: f64,
    /// Initial view rotation in degrees
    pub default_rotation: f64,
    /// Zoom multiplier per wheel notch
    pub wheel_zoom_factor: f64,
    /// Horizontal scroll padding around the document (world units)
    pub padding_x: f64,
    /// Vertical scroll padding around the document (world units)
    pub padding_y: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            min_zoom: 0.05,
            max_zoom: 50.0,
            default_zoom: 1.0,
            default_offset_x: 0.0,
            default_offset_y: 0.0,
            default_rotation: 0.0,
            wheel_zoom_factor: 1.1,
            padding_x: 100.0,
            padding_y: 100.0,
        }
    }
}

/// Document extents in world units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    pub width: f64,
    pub height: f64,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
        }
    }
}

/// Selection tool tolerances, all in screen pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    /// Pointer travel before a press becomes a lasso or drag
    pub drag_threshold_px: f64,
    /// Minimum lasso inflation for point targets
    pub min_hit_px: f64,
    /// Visual radius of an unselected point
    pub point_radius_px: f64,
    /// Visual radius of a selected point
    pub selected_point_radius_px: f64,
    /// Stroke hit width for click-picking lines
    pub line_hit_px: f64,
    /// Force-release an active gesture when the pointer leaves the surface
    pub release_on_leave: bool,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            drag_threshold_px: 4.0,
            min_hit_px: 4.0,
            point_radius_px: 6.0,
            selected_point_radius_px: 8.0,
            line_hit_px: 10.0,
            release_on_leave: false,
        }
    }
}

/// Ruler overlay metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulerSettings {
    /// Ruler band thickness in pixels
    pub thickness_px: f64,
    /// Major tick length in pixels
    pub major_length: f64,
    /// Minor tick length in pixels
    pub minor_length: f64,
    /// Sub tick length in pixels
    pub sub_length: f64,
    /// Minor ticks per major step
    pub minor_divisions: u32,
    /// Sub ticks per minor step
    pub sub_divisions: u32,
    /// Minimum on-screen distance between major ticks
    pub min_spacing_px: f64,
}

impl Default for RulerSettings {
    fn default() -> Self {
        Self {
            thickness_px: 20.0,
            major_length: 10.0,
            minor_length: 6.0,
            sub_length: 3.0,
            minor_divisions: 5,
            sub_divisions: 2,
            min_spacing_px: 50.0,
        }
    }
}

/// Complete editor configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// View transform settings
    pub viewport: ViewportSettings,
    /// Document extents
    pub document: DocumentSettings,
    /// Selection tool tolerances
    pub selection: SelectionSettings,
    /// Ruler metrics
    pub ruler: RulerSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> ConfigResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        Some(other) => Err(ConfigError::UnsupportedFormat(other.to_string())),
        None => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location: `<platform config dir>/tordie/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("tordie").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("No configuration at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring configuration {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to file (JSON or TOML)
    ///
    /// Parent directories are created as needed.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| SettingsError::ConfigDirectory(e.to_string()))?;
            }
        }

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let v = &self.viewport;
        if !(v.min_zoom > 0.0) {
            return Err(ConfigError::out_of_range("viewport.min_zoom", v.min_zoom));
        }
        if !(v.max_zoom >= v.min_zoom) {
            return Err(ConfigError::out_of_range("viewport.max_zoom", v.max_zoom));
        }
        if !(v.default_zoom >= v.min_zoom && v.default_zoom <= v.max_zoom) {
            return Err(ConfigError::out_of_range(
                "viewport.default_zoom",
                v.default_zoom,
            ));
        }
        if !(v.wheel_zoom_factor > 1.0) {
            return Err(ConfigError::out_of_range(
                "viewport.wheel_zoom_factor",
                v.wheel_zoom_factor,
            ));
        }
        if !(v.padding_x >= 0.0) || !(v.padding_y >= 0.0) {
            return Err(ConfigError::out_of_range(
                "viewport.padding",
                format!("{}x{}", v.padding_x, v.padding_y),
            ));
        }

        let d = &self.document;
        if !(d.width > 0.0) || !(d.height > 0.0) {
            return Err(ConfigError::out_of_range(
                "document.size",
                format!("{}x{}", d.width, d.height),
            ));
        }

        let s = &self.selection;
        for (key, value) in [
            ("selection.drag_threshold_px", s.drag_threshold_px),
            ("selection.min_hit_px", s.min_hit_px),
            ("selection.point_radius_px", s.point_radius_px),
            ("selection.selected_point_radius_px", s.selected_point_radius_px),
            ("selection.line_hit_px", s.line_hit_px),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::out_of_range(key, value));
            }
        }

        let r = &self.ruler;
        if r.minor_divisions == 0 {
            return Err(ConfigError::out_of_range("ruler.minor_divisions", 0));
        }
        if r.sub_divisions == 0 {
            return Err(ConfigError::out_of_range("ruler.sub_divisions", 0));
        }
        if !(r.min_spacing_px > 0.0) {
            return Err(ConfigError::out_of_range(
                "ruler.min_spacing_px",
                r.min_spacing_px,
            ));
        }

        Ok(())
    }
}
