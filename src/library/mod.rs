//! Voice message library for ovmp.
//!
//! Persistent storage of imported voice messages and their waveform metadata.

pub mod storage;

pub use storage::{MessageLibrary, VoiceMessage};
