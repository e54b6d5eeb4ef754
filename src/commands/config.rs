//! Open the configuration file in an editor.

use crate::config;
use anyhow::anyhow;
use std::process::Command;

/// Opens `~/.config/ovmp/ovmp.toml` in `$EDITOR`, falling back to nano, then vi.
///
/// # Errors
/// - If the config file does not exist (run ovmp once to create it)
/// - If no editor can be launched
pub fn handle_config() -> Result<(), anyhow::Error> {
    let config_path = config::get_config_path()?;

    if !config_path.exists() {
        return Err(anyhow!(
            "Config file not found at {}. Run ovmp once to create it.",
            config_path.display()
        ));
    }

    let editor = std::env::var("EDITOR").unwrap_or_default();
    let candidates: Vec<&str> = if editor.is_empty() {
        vec!["nano", "vi"]
    } else {
        vec![editor.as_str(), "nano", "vi"]
    };

    for candidate in &candidates {
        let status = Command::new(candidate).arg(&config_path).status();
        match status {
            Ok(status) if status.success() => {
                tracing::info!("Edited config with {candidate}");
                return Ok(());
            }
            Ok(status) => {
                return Err(anyhow!("{candidate} exited with status {status}"));
            }
            Err(_) => continue,
        }
    }

    Err(anyhow!(
        "No editor found. Set $EDITOR or install nano or vi."
    ))
}
