//! Audio playback engine.
//!
//! Plays decoded mono PCM through the system's default (or configured) output
//! device. Playback state lives in shared atomics so the UI thread can toggle
//! pause, scrub, and poll progress while the cpal callback runs.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Plays mono i16 PCM on an output device.
///
/// Features:
/// - Plays through a specified output device or the system default
/// - Fans mono samples out to the device's channel count
/// - Steps through the source at file-rate/device-rate, so playback speed is
///   correct even when the device runs at a different sample rate
/// - Pause, seek, and end-of-stream detection via shared atomics
pub struct AudioPlayer {
    /// Source samples (i16 PCM mono)
    samples: Arc<Vec<i16>>,
    /// Sample rate of the source audio
    sample_rate: u32,
    /// Current playback position in source samples
    position: Arc<AtomicUsize>,
    /// Whether playback is currently paused
    is_paused: Arc<AtomicBool>,
    /// Set by the callback once the last sample has been played
    finished: Arc<AtomicBool>,
    /// Active audio output stream (kept alive during playback)
    stream: Option<cpal::Stream>,
    /// Device name, index, or "default"
    device_name: String,
}

impl AudioPlayer {
    /// Creates a player for the given mono samples.
    ///
    /// # Arguments
    /// * `samples` - Mono i16 PCM to play
    /// * `sample_rate` - Sample rate of `samples` in Hz
    /// * `device_name` - Device name/ID to use. Use "default" for the system default
    pub fn new(samples: Vec<i16>, sample_rate: u32, device_name: String) -> Self {
        Self {
            samples: Arc::new(samples),
            sample_rate,
            position: Arc::new(AtomicUsize::new(0)),
            is_paused: Arc::new(AtomicBool::new(false)),
            finished: Arc::new(AtomicBool::new(false)),
            stream: None,
            device_name,
        }
    }

    /// Starts playback on the configured output device.
    ///
    /// # Errors
    /// - If the specified device is not available
    /// - If device configuration fails
    /// - If audio stream creation fails
    pub fn start(&mut self) -> Result<()> {
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();

            if self.device_name == "default" {
                host.default_output_device()
                    .ok_or_else(|| anyhow!("No audio output device available"))
            } else {
                find_device_by_name(&host, &self.device_name)
            }
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Playback device: {}", device_name);

        let device_config = device.default_output_config()?;
        let device_sample_rate = device_config.sample_rate().0;
        let num_channels = device_config.channels() as usize;

        tracing::debug!(
            "Device configuration: {}Hz, {} channels (source {}Hz)",
            device_sample_rate,
            num_channels,
            self.sample_rate
        );

        let samples = Arc::clone(&self.samples);
        let position = Arc::clone(&self.position);
        let pause_flag = Arc::clone(&self.is_paused);
        let finished_flag = Arc::clone(&self.finished);

        // Source samples consumed per output frame
        let step = self.sample_rate as f64 / device_sample_rate as f64;
        let mut step_remainder = 0.0f64;

        let stream = device.build_output_stream(
            &device_config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                if pause_flag.load(Ordering::Relaxed) {
                    data.fill(0.0);
                    return;
                }

                for frame in data.chunks_mut(num_channels) {
                    let pos = position.load(Ordering::Relaxed);
                    let value = match samples.get(pos) {
                        Some(&sample) => sample as f32 / 32768.0,
                        None => {
                            finished_flag.store(true, Ordering::Relaxed);
                            0.0
                        }
                    };

                    for out in frame.iter_mut() {
                        *out = value;
                    }

                    step_remainder += step;
                    let advance = step_remainder as usize;
                    if advance > 0 {
                        step_remainder -= advance as f64;
                        position.fetch_add(advance, Ordering::Relaxed);
                    }
                }
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        self.stream = Some(stream);

        tracing::debug!("Audio stream started");
        Ok(())
    }

    /// Stops playback and releases the output stream.
    pub fn stop(&mut self) {
        self.stream = None;
        tracing::debug!("Audio stream stopped");
    }

    /// Pauses playback without releasing the stream.
    pub fn pause(&self) {
        self.is_paused.store(true, Ordering::Relaxed);
        tracing::debug!("Playback paused");
    }

    /// Resumes playback from a paused state.
    pub fn resume(&self) {
        self.is_paused.store(false, Ordering::Relaxed);
        tracing::debug!("Playback resumed");
    }

    /// Toggles between paused and playing states.
    pub fn toggle_pause(&self) {
        let was_paused = self.is_paused.fetch_xor(true, Ordering::Relaxed);
        if was_paused {
            tracing::debug!("Playback resumed");
        } else {
            tracing::debug!("Playback paused");
        }
    }

    /// Returns whether playback is currently paused.
    pub fn is_paused(&self) -> bool {
        self.is_paused.load(Ordering::Relaxed)
    }

    /// Returns whether the last sample has been played.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }

    /// Returns the played fraction of the source in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.samples.is_empty() {
            return 1.0;
        }
        let pos = self.position.load(Ordering::Relaxed).min(self.samples.len());
        pos as f64 / self.samples.len() as f64
    }

    /// Returns the current playback position in seconds.
    pub fn position_secs(&self) -> f64 {
        let pos = self.position.load(Ordering::Relaxed).min(self.samples.len());
        pos as f64 / self.sample_rate as f64
    }

    /// Returns the total duration of the source in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Seeks to a fraction of the total duration (scrubbing).
    ///
    /// Clears the finished flag when seeking back from the end so playback
    /// continues from the new position.
    pub fn seek_to_fraction(&self, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0);
        let target = (self.samples.len() as f64 * fraction) as usize;
        self.position
            .store(target.min(self.samples.len()), Ordering::Relaxed);
        if target < self.samples.len() {
            self.finished.store(false, Ordering::Relaxed);
        }
        tracing::debug!("Seek to {:.0}%", fraction * 100.0);
    }

    /// Seeks relative to the current position by a fraction of the duration.
    pub fn seek_by_fraction(&self, delta: f64) {
        self.seek_to_fraction(self.progress() + delta);
    }
}

/// Finds an audio output device by name or numeric index.
///
/// # Arguments
/// * `host` - The cpal audio host
/// * `device_spec` - A device name or a numeric index (0, 1, 2, etc.)
///
/// # Errors
/// - If no device with the specified name/index is found
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    // Try to parse as a numeric index first
    if let Ok(index) = device_spec.parse::<usize>() {
        let devices: Vec<_> = host
            .output_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
            .collect();

        if index < devices.len() {
            return Ok(devices.into_iter().nth(index).unwrap());
        } else {
            return Err(anyhow!(
                "Device index {} is out of range (0-{})",
                index,
                devices.len().saturating_sub(1)
            ));
        }
    }

    // Try to find by name
    let devices = host
        .output_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;

    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(anyhow!(
        "Audio output device '{device_spec}' not found. Use 'ovmp list-devices' to see available devices."
    ))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    // Open /dev/null for writing
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    // Save the current stderr file descriptor
    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    // Redirect stderr to /dev/null
    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    // Execute the closure
    let result = f();

    // Restore the original stderr
    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_and_seek_without_stream() {
        let player = AudioPlayer::new(vec![0i16; 16_000], 16_000, "default".to_string());
        assert_eq!(player.progress(), 0.0);
        assert_eq!(player.duration_secs(), 1.0);

        player.seek_to_fraction(0.5);
        assert!((player.progress() - 0.5).abs() < 1e-9);
        assert!((player.position_secs() - 0.5).abs() < 1e-9);

        player.seek_by_fraction(-2.0);
        assert_eq!(player.progress(), 0.0);

        player.seek_to_fraction(2.0);
        assert!((player.progress() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pause_toggle() {
        let player = AudioPlayer::new(Vec::new(), 16_000, "default".to_string());
        assert!(!player.is_paused());
        player.toggle_pause();
        assert!(player.is_paused());
        player.resume();
        assert!(!player.is_paused());
    }
}
