//! Application configuration.
//!
//! Settings live in a TOML file inside the OS config directory (for example
//! `~/.config/mod-arranger/config.toml`). The `MOD_ARRANGER_CONFIG` environment variable or the
//! `--config` flag point at a different file. A missing file yields the defaults.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use egui::Color32;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::{BorderStyle, ItemStyle, ListLayout};

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const CONFIG_PATH_ENV: &str = "MOD_ARRANGER_CONFIG";

/// Errors that may occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No platform config directory could be resolved.
    #[error("No suitable config directory available")]
    NoConfigDir,
    /// Failed to read the config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`AppConfig`].
    #[error("Invalid config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// The values parse but cannot be used.
    #[error("Invalid config at {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Game data directory holding `PlayerProfiles` and `Mods`
    pub data_dir: Option<PathBuf>,
    /// Profile to open on start
    pub profile: Option<String>,
    pub list: ListConfig,
}

/// Geometry and look of the mod list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub item_width: f32,
    pub item_height: f32,
    pub item_border: BorderStyle,
    pub item_border_width: f32,
    /// RGB, the theme's widget background if unset
    pub item_background: Option<[u8; 3]>,
    pub offset_x: f32,
    pub offset_y: f32,
    pub gap: f32,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            item_width: 300.0,
            item_height: 20.0,
            item_border: BorderStyle::Groove,
            item_border_width: 1.0,
            item_background: None,
            offset_x: 10.0,
            offset_y: 10.0,
            gap: 10.0,
        }
    }
}

impl ListConfig {
    fn validate(&self) -> Result<(), String> {
        if !(self.item_width > 0.0 && self.item_height > 0.0) {
            return Err(format!(
                "item size must be positive, got {}x{}",
                self.item_width, self.item_height
            ));
        }
        let spacing = [
            ("gap", self.gap),
            ("offset_x", self.offset_x),
            ("offset_y", self.offset_y),
            ("item_border_width", self.item_border_width),
        ];
        for (name, value) in spacing {
            if !(value >= 0.0) {
                return Err(format!("{name} must not be negative, got {value}"));
            }
        }
        Ok(())
    }

    pub fn layout(&self) -> ListLayout {
        let mut item_style = ItemStyle::default()
            .with_border(self.item_border)
            .with_border_width(self.item_border_width);
        if let Some([r, g, b]) = self.item_background {
            item_style = item_style.with_background(Color32::from_rgb(r, g, b));
        }

        ListLayout {
            item_width: self.item_width,
            item_height: self.item_height,
            item_style,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            gap: self.gap,
        }
    }
}

/// Resolve the config file path: the environment override, else the OS config directory.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    ProjectDirs::from("", "", "mod-arranger")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

/// Load configuration from `path`, returning defaults if the file does not exist.
pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        info!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AppConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config
        .list
        .validate()
        .map_err(|reason| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Load from `explicit` if given, else from [`default_config_path`].
pub fn load(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match explicit {
        Some(path) => load_from(path),
        None => load_from(&default_config_path()?),
    }
}
