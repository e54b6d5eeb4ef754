//! ovmp - a terminal voice message player.
//!
//! Plays voice messages with a scrubbable waveform rendered from packed
//! 5-bit metadata, tracks which messages have been listened to, and
//! autoplays through the unlistened queue.

mod app;
mod commands;
mod config;
mod library;
mod logging;
mod player;
mod setup;
mod ui;
mod waveform;

use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        tracing::error!("Fatal error: {e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
