//! Application command handlers for ovmp.
//!
//! This module organizes command handling into separate submodules, each responsible for a specific
//! application command (playback, library management, diagnostics).
//!
//! # Commands
//! - `play`: Play voice messages with the waveform TUI (default command)
//! - `import`: Import an audio file into the message library
//! - `list`: List library messages with their unlistened markers
//! - `inspect`: Decode and print a message's waveform metadata
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available audio output devices
//! - `logs`: Display recent log entries

pub mod play;
pub mod import;
pub mod list;
pub mod inspect;
pub mod config;
pub mod list_devices;
pub mod logs;

pub use play::handle_play;
pub use import::handle_import;
pub use list::handle_list;
pub use inspect::handle_inspect;
pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
