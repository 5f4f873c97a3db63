//! Overlay configuration loaded from a JSON file next to the binary

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::display::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Overlay size in pixels
    pub width: u32,
    pub height: u32,
    /// Screen position of the window's top-left corner
    pub x: i32,
    pub y: i32,
    /// Whole-window constant alpha, 255 = fully opaque
    pub opacity: u8,
    /// Let mouse and keyboard input pass through the overlay
    pub click_through: bool,
    /// Render the FPS readout in the corner
    pub show_fps: bool,
    /// Tick cue on a background thread (needs the `chime` feature)
    pub chime: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            x: 120,
            y: 120,
            opacity: 255,
            click_through: true,
            show_fps: false,
            chime: false,
        }
    }
}

impl OverlayConfig {
    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let json = fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&json).map_err(|e| e.to_string())
    }

    /// Load config, falling back to defaults when the file is missing or
    /// malformed
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path.as_ref()).unwrap_or_else(|e| {
            log::debug!("using default config ({e})");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let c = OverlayConfig::default();
        assert_eq!(c.width, DEFAULT_WIDTH);
        assert_eq!(c.opacity, 255);
        assert!(c.click_through);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let c = OverlayConfig::load_or_default("/nonexistent/overlay.json");
        assert_eq!(c.width, OverlayConfig::default().width);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let c: OverlayConfig = serde_json::from_str(r#"{"opacity": 200}"#).unwrap();
        assert_eq!(c.opacity, 200);
        assert_eq!(c.height, DEFAULT_HEIGHT);
    }
}
