//! Voice message playback feature for ovmp.
//!
//! Provides the audio output engine, background WAV loading with progress,
//! the autoplay queue, and the playback TUI.

pub mod audio;
pub mod loader;
pub mod queue;
pub mod ui;

pub use audio::AudioPlayer;
pub(crate) use audio::suppress_alsa_warnings;
pub use loader::{AudioLoader, LoadedAudio};
pub use queue::PlayQueue;
pub use ui::{format_time, PlayerCommand, PlayerStatus, PlayerTui};
