//! Inspect the waveform metadata of a voice message.
//!
//! Decodes the packed 5-bit envelope and prints sample statistics plus a
//! one-line unicode rendering, without starting the player.

use crate::config;
use crate::library::MessageLibrary;
use crate::player::loader;
use crate::waveform;
use anyhow::anyhow;
use std::path::PathBuf;

/// Block glyphs from empty to full, indexed by sample value scaled to 0..=8.
const BLOCKS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Prints waveform details for a library message or a standalone file.
///
/// # Arguments
/// * `index` - 1-based library index of the message to inspect
/// * `file` - Inspect a file directly by computing its envelope
///
/// # Errors
/// - If neither source yields a message
/// - If the file cannot be decoded
pub async fn handle_inspect(
    index: Option<usize>,
    file: Option<PathBuf>,
) -> Result<(), anyhow::Error> {
    let (label, bytes) = match (index, file) {
        (_, Some(path)) => {
            let audio = tokio::task::spawn_blocking({
                let path = path.clone();
                move || loader::load_wav(&path, None)
            })
            .await
            .map_err(|e| anyhow!("Decode task failed: {e}"))??;
            (
                path.display().to_string(),
                waveform::envelope_from_samples(&audio.samples),
            )
        }
        (Some(n), None) => {
            let mut library = MessageLibrary::new(&config::get_data_dir()?)?;
            let messages = library.get_all_messages()?;
            if n == 0 || n > messages.len() {
                return Err(anyhow!(
                    "Message index {n} out of range (library has {} messages)",
                    messages.len()
                ));
            }
            let message = &messages[n - 1];
            (message.title.clone(), message.waveform.clone())
        }
        (None, None) => {
            return Err(anyhow!("Specify a message index or --file <path>"));
        }
    };

    let stored = bytes.len().min(waveform::WAVEFORM_MAX_BYTES);
    let samples = waveform::decode_waveform(&bytes[..stored]);

    println!("Waveform: {label}");
    println!("  metadata bytes: {} (stored: {stored})", bytes.len());
    println!("  samples:        {}", samples.len());

    if samples.is_empty() {
        return Ok(());
    }

    let max = samples.iter().copied().max().unwrap_or(0);
    let min = samples.iter().copied().min().unwrap_or(0);
    let mean = samples.iter().map(|&s| s as f64).sum::<f64>() / samples.len() as f64;
    println!("  range:          {min}..{max} (mean {mean:.1})");

    let line: String = samples
        .iter()
        .map(|&s| BLOCKS[(s as usize * 8 + 15) / 31])
        .collect();
    println!();
    println!("  {line}");

    Ok(())
}
