//! Configuration schema types for `iconsmith.toml`

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::color::{parse_color, Pixel};
use crate::fill::DEFAULT_TOLERANCE;
use crate::history::DEFAULT_DEPTH;
use crate::raster::Resample;

/// Largest icon edge accepted from configuration.
pub const MAX_SIZE: usize = 256;

/// Editor defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Edge length of new icons
    pub size: usize,
    /// Initial drawing color
    pub default_color: String,
    /// Undo snapshots kept per session
    pub history_depth: usize,
    /// Tolerance used by the fill tool
    pub fill_tolerance: u32,
    /// Filter used when images are resampled to the icon size
    pub resample: Resample,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            size: 16,
            default_color: "#000000".to_string(),
            history_depth: DEFAULT_DEPTH,
            fill_tolerance: DEFAULT_TOLERANCE,
            resample: Resample::default(),
        }
    }
}

impl EditorConfig {
    /// The initial drawing color. Validated configs always decode.
    pub fn color(&self) -> Pixel {
        Pixel::parse(&self.default_color).unwrap_or(Pixel::BLACK)
    }
}

/// Where icons are kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub icons_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { icons_dir: PathBuf::from("saved_icons") }
    }
}

/// Complete `iconsmith.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconsmithConfig {
    pub editor: EditorConfig,
    pub storage: StorageConfig,
    /// Extra named palettes (name -> list of colors)
    pub palettes: HashMap<String, Vec<String>>,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "editor.size")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "iconsmith.toml: '{}' {}", self.field, self.message)
    }
}

impl IconsmithConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: String, message: String| {
            errors.push(ConfigValidationError { field, message });
        };

        if self.editor.size == 0 || self.editor.size > MAX_SIZE {
            push("editor.size".to_string(), format!("must be between 1 and {}", MAX_SIZE));
        }

        if let Err(e) = parse_color(&self.editor.default_color) {
            push("editor.default_color".to_string(), format!("is not a color ({})", e));
        }

        if self.editor.history_depth == 0 {
            push("editor.history_depth".to_string(), "must be a positive integer".to_string());
        }

        if self.storage.icons_dir.as_os_str().is_empty() {
            push("storage.icons_dir".to_string(), "must be a non-empty path".to_string());
        }

        // Individual palette colors are decoded leniently when used.
        for (name, colors) in &self.palettes {
            if colors.is_empty() {
                push(format!("palettes.{}", name), "must contain at least one color".to_string());
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IconsmithConfig::default();
        assert_eq!(config.editor.size, 16);
        assert_eq!(config.editor.history_depth, 50);
        assert_eq!(config.editor.fill_tolerance, 32);
        assert_eq!(config.editor.resample, Resample::Lanczos);
        assert_eq!(config.editor.color(), Pixel::BLACK);
        assert_eq!(config.storage.icons_dir, PathBuf::from("saved_icons"));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: IconsmithConfig = toml::from_str(
            r##"
[editor]
size = 32
resample = "nearest"

[palettes]
brand = ["#112233", "#445566"]
"##,
        )
        .unwrap();
        assert_eq!(config.editor.size, 32);
        assert_eq!(config.editor.resample, Resample::Nearest);
        assert_eq!(config.editor.history_depth, 50);
        assert_eq!(config.palettes["brand"].len(), 2);
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = IconsmithConfig::default();
        config.editor.size = 0;
        config.editor.default_color = "chartreuse-ish".to_string();
        config.editor.history_depth = 0;
        config.palettes.insert("empty".to_string(), Vec::new());

        let errors = config.validate();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["editor.size", "editor.default_color", "editor.history_depth", "palettes.empty"]
        );
        assert!(errors[0].to_string().starts_with("iconsmith.toml: 'editor.size'"));
    }
}
