//! Setup module for initial application configuration.
//!
//! Handles first-run setup by writing a default config file, and config
//! migration when the binary version moves ahead of the config file.

pub mod version;

use crate::config::{get_config_path, OvmpConfig};
use anyhow::anyhow;

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runs the setup process: writes a fresh default config file.
///
/// The default config is serialized from [`OvmpConfig::default`] and prefixed
/// with a `config_version` line so later upgrades can detect stale configs.
///
/// # Errors
/// Returns an error if any file operations fail.
pub fn run_setup() -> anyhow::Result<()> {
    let config_path = get_config_path()?;

    let default_config = toml::to_string_pretty(&OvmpConfig::default())
        .map_err(|e| anyhow!("Failed to serialize default config: {e}"))?;
    let version_line = format!(r#"config_version = "{}""#, CURRENT_VERSION);
    let full_config = format!("{}\n{}", version_line, default_config);

    std::fs::write(&config_path, full_config)?;
    tracing::info!("Default config written to {}", config_path.display());

    Ok(())
}
