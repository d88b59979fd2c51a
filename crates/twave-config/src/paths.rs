//! Platform-specific configuration paths.
//!
//! - Linux: `~/.config/twave/delineator.toml`
//! - macOS: `~/Library/Application Support/twave/delineator.toml`
//! - Windows: `%APPDATA%\twave\delineator.toml`

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "twave";

/// File name of the delineator configuration.
const CONFIG_FILE: &str = "delineator.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory cannot
/// be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default location of the delineator configuration file.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}
