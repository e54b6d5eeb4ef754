//! List available audio output devices.

use cpal::traits::{DeviceTrait, HostTrait};

/// Prints the output devices cpal can see, with the system default marked.
///
/// # Errors
/// - If the audio host cannot enumerate devices
pub fn handle_list_devices() -> Result<(), anyhow::Error> {
    let (default_name, names) = crate::player::suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        let default_name = host.default_output_device().and_then(|d| d.name().ok());
        let names: Vec<String> = host
            .output_devices()?
            .map(|d| d.name().unwrap_or_else(|_| "<unknown>".to_string()))
            .collect();
        Ok((default_name, names))
    })?;

    println!("Output devices:");
    if names.is_empty() {
        println!("  <none>");
    }
    for name in &names {
        let marker = if Some(name) == default_name.as_ref() {
            " (default)"
        } else {
            ""
        };
        println!("  {name}{marker}");
    }

    println!();
    println!("Select one in ovmp.toml:  device = \"<name>\"");

    Ok(())
}
