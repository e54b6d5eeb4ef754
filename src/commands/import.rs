//! Import a voice message into the library.
//!
//! Decodes the audio, computes its packed 5-bit loudness envelope, and stores
//! path, duration, and waveform metadata in the library database.

use crate::config;
use crate::library::MessageLibrary;
use crate::player::{format_time, loader};
use crate::waveform;
use anyhow::anyhow;
use std::path::PathBuf;

/// Imports a WAV file as a voice message.
///
/// # Arguments
/// * `file` - Path to the audio file to import
/// * `title` - Optional display title; defaults to the file name
///
/// # Errors
/// - If the file does not exist or cannot be decoded
/// - If the library database cannot be written
pub async fn handle_import(file: PathBuf, title: Option<String>) -> Result<(), anyhow::Error> {
    tracing::info!("=== ovmp Import Command ===");

    if !file.exists() {
        return Err(anyhow!("Audio file not found: {}", file.display()));
    }

    let canonical = file
        .canonicalize()
        .map_err(|e| anyhow!("Failed to resolve {}: {e}", file.display()))?;

    let title = title.unwrap_or_else(|| {
        canonical
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| canonical.display().to_string())
    });

    // Decode on a blocking task; files can be large
    let decode_path = canonical.clone();
    let audio = tokio::task::spawn_blocking(move || loader::load_wav(&decode_path, None))
        .await
        .map_err(|e| anyhow!("Decode task failed: {e}"))??;

    let envelope = waveform::envelope_from_samples(&audio.samples);
    let duration_secs = audio.duration_secs();

    let mut library = MessageLibrary::new(&config::get_data_dir()?)?;
    let id = library.add_message(&canonical, &title, duration_secs, &envelope)?;

    tracing::info!(
        "Imported '{}' as message {} ({:.1}s, {} waveform bytes)",
        title,
        id,
        duration_secs,
        envelope.len()
    );

    println!(
        "Imported '{}' ({}) as message #{}",
        title,
        format_time(duration_secs),
        id
    );

    Ok(())
}
