//! WAV loading with progress reporting.
//!
//! Voice message audio is decoded on a blocking task while the UI polls a
//! shared counter to draw a progress gauge, then retries on failure. Multi-
//! channel files are averaged down to mono.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Fully decoded audio ready for playback.
#[derive(Debug, Clone)]
pub struct LoadedAudio {
    /// Mono i16 PCM samples
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl LoadedAudio {
    /// Returns the duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Shared progress state for an in-flight load.
#[derive(Debug)]
pub struct LoadProgress {
    /// Source frames decoded so far
    loaded: AtomicU64,
    /// Total source frames (0 until the header has been read)
    total: AtomicU64,
}

impl LoadProgress {
    fn new() -> Self {
        Self {
            loaded: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Returns the loaded fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        let total = self.total.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        (self.loaded.load(Ordering::Relaxed) as f64 / total as f64).min(1.0)
    }
}

/// Handle to a load running on a blocking task.
pub struct AudioLoader {
    progress: Arc<LoadProgress>,
    handle: tokio::task::JoinHandle<Result<LoadedAudio>>,
}

impl AudioLoader {
    /// Starts decoding the given file in the background.
    pub fn spawn(path: &Path) -> Self {
        let progress = Arc::new(LoadProgress::new());
        let worker_progress = Arc::clone(&progress);
        let path: PathBuf = path.to_path_buf();

        let handle =
            tokio::task::spawn_blocking(move || load_wav(&path, Some(&worker_progress)));

        Self { progress, handle }
    }

    /// Returns the shared progress state.
    pub fn progress(&self) -> Arc<LoadProgress> {
        Arc::clone(&self.progress)
    }

    /// Returns whether decoding has completed (successfully or not).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for decoding to finish and returns the result.
    ///
    /// # Errors
    /// - If the file cannot be read or is not a supported WAV
    /// - If the blocking task panicked
    pub async fn join(self) -> Result<LoadedAudio> {
        self.handle
            .await
            .map_err(|e| anyhow!("Audio load task failed: {e}"))?
    }
}

/// Decodes a WAV file to mono i16 PCM, optionally reporting progress.
///
/// Multi-channel audio is converted to mono by averaging all channels of
/// each frame. Float and non-16-bit integer WAVs are rescaled to i16.
///
/// # Errors
/// - If the file cannot be opened or is not a valid WAV
pub fn load_wav(path: &Path, progress: Option<&LoadProgress>) -> Result<LoadedAudio> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| anyhow!("Failed to open {}: {e}", path.display()))?;
    let spec = reader.spec();
    let num_channels = spec.channels as usize;
    let total_frames = reader.duration() as u64;

    if let Some(progress) = progress {
        progress.total.store(total_frames.max(1), Ordering::Relaxed);
    }

    tracing::debug!(
        "Loading {}: {}Hz, {} channels, {} frames",
        path.display(),
        spec.sample_rate,
        num_channels,
        total_frames
    );

    let interleaved = read_samples_as_i16(reader)?;

    let mut samples = Vec::with_capacity(interleaved.len() / num_channels.max(1));
    match num_channels {
        0 => return Err(anyhow!("WAV file reports zero channels")),
        1 => {
            // Mono: use samples directly, reporting in chunks
            for (frame_index, &sample) in interleaved.iter().enumerate() {
                samples.push(sample);
                report_progress(progress, frame_index);
            }
        }
        _ => {
            // Multi-channel: average all channels per frame
            for (frame_index, chunk) in interleaved.chunks_exact(num_channels).enumerate() {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                samples.push((sum / num_channels as i32) as i16);
                report_progress(progress, frame_index);
            }
        }
    }

    if let Some(progress) = progress {
        progress
            .loaded
            .store(total_frames.max(1), Ordering::Relaxed);
    }

    if samples.is_empty() {
        return Err(anyhow!("WAV file contains no samples"));
    }

    Ok(LoadedAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Updates the shared frame counter every 4096 frames.
fn report_progress(progress: Option<&LoadProgress>, frame_index: usize) {
    if frame_index % 4096 == 0 {
        if let Some(progress) = progress {
            progress
                .loaded
                .store(frame_index as u64, Ordering::Relaxed);
        }
    }
}

/// Reads all samples from the WAV, rescaling to i16 as needed.
fn read_samples_as_i16<R: std::io::Read>(mut reader: hound::WavReader<R>) -> Result<Vec<i16>> {
    let spec = reader.spec();

    let samples: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .samples::<i16>()
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| anyhow!("Failed to read samples: {e}"))?,
            bits if bits < 16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v << (16 - bits)))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| anyhow!("Failed to read samples: {e}"))?,
            bits => {
                let shift = bits - 16;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| (v >> shift) as i16))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| anyhow!("Failed to read samples: {e}"))?
            }
        },
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * 32767.0) as i16))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow!("Failed to read samples: {e}"))?,
    };

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_wav(path: &Path, channels: u16, samples_per_channel: usize) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..samples_per_channel {
            for ch in 0..channels {
                let value = ((i as i32 % 100) - 50 + ch as i32) as i16;
                writer.write_sample(value).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    fn temp_wav(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ovmp_loader_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_load_mono_wav() {
        let path = temp_wav("mono.wav");
        write_test_wav(&path, 1, 1600);

        let audio = load_wav(&path, None).unwrap();
        assert_eq!(audio.samples.len(), 1600);
        assert_eq!(audio.sample_rate, 16_000);
        assert!((audio.duration_secs() - 0.1).abs() < 1e-9);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_load_stereo_wav_downmixes() {
        let path = temp_wav("stereo.wav");
        write_test_wav(&path, 2, 800);

        let audio = load_wav(&path, None).unwrap();
        assert_eq!(audio.samples.len(), 800);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let result = load_wav(Path::new("/nonexistent/ovmp.wav"), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_progress_reaches_completion() {
        let path = temp_wav("progress.wav");
        write_test_wav(&path, 1, 9000);

        let progress = LoadProgress::new();
        let audio = load_wav(&path, Some(&progress)).unwrap();
        assert_eq!(audio.samples.len(), 9000);
        assert!((progress.fraction() - 1.0).abs() < 1e-9);

        let _ = std::fs::remove_file(path);
    }
}
