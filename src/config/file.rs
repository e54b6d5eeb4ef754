//! Configuration file management for ovmp.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Playback and waveform display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Audio output device. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `ovmp list-devices`
    /// - device name from `ovmp list-devices`
    #[serde(default = "default_device")]
    pub device: String,
    /// Width of one waveform bar in terminal columns
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
    /// Gap between waveform bars in terminal columns
    #[serde(default = "default_bar_margin")]
    pub bar_margin: usize,
    /// Minimum bar height (quiet passages still show a stub)
    #[serde(default = "default_bar_height_min")]
    pub bar_height_min: u64,
    /// Maximum bar height (display units)
    #[serde(default = "default_bar_height_max")]
    pub bar_height_max: u64,
    /// Automatically play the next queued message when one ends
    #[serde(default = "default_true")]
    pub autoplay: bool,
}

fn default_device() -> String {
    "default".to_string()
}

fn default_bar_width() -> usize {
    2
}

fn default_bar_margin() -> usize {
    2
}

fn default_bar_height_min() -> u64 {
    4
}

fn default_bar_height_max() -> u64 {
    23
}

fn default_true() -> bool {
    true
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            bar_width: default_bar_width(),
            bar_margin: default_bar_margin(),
            bar_height_min: default_bar_height_min(),
            bar_height_max: default_bar_height_max(),
            autoplay: default_true(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OvmpConfig {
    #[serde(default)]
    pub player: PlayerConfig,
}

impl OvmpConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        let config_content = fs::read_to_string(&config_path)?;
        let config: OvmpConfig = toml::from_str(&config_content)?;
        Ok(config)
    }

}

/// Retrieves the path to the config file.
///
/// # Errors
/// - If the config directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?
        .join(".config")
        .join("ovmp");

    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir.join("ovmp.toml"))
}

/// Retrieves the data directory where the message library lives.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".local")
        .join("share")
        .join("ovmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: OvmpConfig = toml::from_str("").unwrap();
        assert_eq!(config.player.device, "default");
        assert_eq!(config.player.bar_width, 2);
        assert_eq!(config.player.bar_height_min, 4);
        assert_eq!(config.player.bar_height_max, 23);
        assert!(config.player.autoplay);
    }

    #[test]
    fn test_partial_player_section() {
        let config: OvmpConfig =
            toml::from_str("[player]\ndevice = \"1\"\nautoplay = false\n").unwrap();
        assert_eq!(config.player.device, "1");
        assert!(!config.player.autoplay);
        assert_eq!(config.player.bar_margin, 2);
    }
}
