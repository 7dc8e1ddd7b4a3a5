//! Configuration loading and discovery for `iconsmith.toml`

use super::schema::IconsmithConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for during discovery.
pub const CONFIG_FILE: &str = "iconsmith.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse iconsmith.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// Find iconsmith.toml by walking up from the current working directory,
/// then falling back to `$XDG_CONFIG_HOME/iconsmith/iconsmith.toml`
/// (or `~/.config/iconsmith/iconsmith.toml`).
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find iconsmith.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("iconsmith").join(CONFIG_FILE);
    config_path.exists().then_some(config_path)
}

/// Find iconsmith.toml by walking up from `start`.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, the discovered file is used,
/// or the defaults when nothing is found.
pub fn load_config(path: Option<&Path>) -> Result<IconsmithConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            log::debug!("loading config from {}", p.display());
            load_config_file(&p)
        }
        None => {
            log::debug!("no {} found, using defaults", CONFIG_FILE);
            Ok(IconsmithConfig::default())
        }
    }
}

fn load_config_file(path: &Path) -> Result<IconsmithConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: IconsmithConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    // Storage paths are relative to the directory holding the config file.
    if let Some(root) = path.parent() {
        config.storage.icons_dir = resolve_path(root, &config.storage.icons_dir);
    }

    Ok(config)
}

/// Resolve a path relative to the directory holding the config file.
///
/// Absolute paths are returned unchanged.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
