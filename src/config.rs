//! Overlay configuration persistence
//!
//! Stored in `~/.config/stream-overlay/config.yaml`. Every field has a
//! default, so a partial file (or none at all) is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::overlay::{
    EmbeddedFont, FontDirectory, FontProvider, OverlayType, Rgba, ToastTiming, WRAP_WIDTH,
};

/// Text style of one overlay type, fixed when the engine is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub font_size: u32,
    #[serde(default)]
    pub color: Rgba,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Font file name, looked up in `font_dirs` then the config fonts dir
    #[serde(default = "default_font_name")]
    pub font_name: String,
    /// Extra directories to search for the font, highest priority first
    #[serde(default)]
    pub font_dirs: Vec<PathBuf>,
    /// Word-wrap width in pixels
    #[serde(default = "default_wrap_width")]
    pub wrap_width: u32,
    #[serde(default = "default_debug_style")]
    pub debug: OverlayStyle,
    #[serde(default = "default_status_update_style")]
    pub status_update: OverlayStyle,
    #[serde(default)]
    pub toast: ToastTiming,
}

fn default_font_name() -> String {
    "ModeSeven.ttf".to_string()
}

fn default_wrap_width() -> u32 {
    WRAP_WIDTH
}

fn default_debug_style() -> OverlayStyle {
    OverlayStyle {
        font_size: 20,
        color: Rgba::WHITE,
    }
}

fn default_status_update_style() -> OverlayStyle {
    OverlayStyle {
        font_size: 28,
        color: Rgba::WHITE,
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            font_name: default_font_name(),
            font_dirs: Vec::new(),
            wrap_width: default_wrap_width(),
            debug: default_debug_style(),
            status_update: default_status_update_style(),
            toast: ToastTiming::default(),
        }
    }
}

impl OverlayConfig {
    /// Style for an overlay type
    pub fn style(&self, ty: OverlayType) -> OverlayStyle {
        match ty {
            OverlayType::Debug => self.debug,
            OverlayType::StatusUpdate => self.status_update,
        }
    }

    /// Font search path: configured dirs, then the user fonts dir, then `./assets`
    pub fn font_provider(&self) -> FontDirectory {
        let mut dirs = self.font_dirs.clone();
        if let Some(fonts) = crate::config_paths::fonts_dir() {
            dirs.push(fonts);
        }
        dirs.push(PathBuf::from("assets"));
        FontDirectory::new(dirs)
    }

    /// Read the configured font once and keep its bytes in memory.
    ///
    /// The result is unavailable (empty) when the font could not be found.
    pub fn resolve_font(&self) -> EmbeddedFont {
        let data = self
            .font_provider()
            .load(&self.font_name)
            .unwrap_or_else(|| Vec::<u8>::new().into());
        EmbeddedFont::new(self.font_name.clone(), data)
    }

    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from a specific file, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
