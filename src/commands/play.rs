//! Voice message playback.
//!
//! Drives the playback TUI over the message queue: loading with a progress
//! gauge and retry, waveform display with scrubbing, autoplay advancement,
//! and listened-state tracking. Supports external pause toggling via SIGUSR1.

use crate::config::{self, OvmpConfig};
use crate::library::{MessageLibrary, VoiceMessage};
use crate::player::{AudioLoader, AudioPlayer, PlayQueue, PlayerCommand, PlayerStatus, PlayerTui};
use crate::ui::ErrorScreen;
use crate::waveform;
use anyhow::anyhow;
use chrono::Local;
use std::path::PathBuf;

/// What the inner per-message loop decided to do next.
enum NextAction {
    /// Leave the player
    Quit,
    /// Move to the next queued message
    Advance,
    /// Move to the previous queued message
    Previous,
    /// Stay on the current message (e.g. load retry exhausted a skip)
    Skip,
}

/// Plays voice messages from the library, or a single file directly.
///
/// # Arguments
/// * `index` - 1-based library index to start at (defaults to the first
///   unlistened message)
/// * `file` - Play this WAV file instead of the library queue
pub async fn handle_play(index: Option<usize>, file: Option<PathBuf>) -> Result<(), anyhow::Error> {
    tracing::info!("=== ovmp Player Started ===");

    let config_data = match OvmpConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let error_message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/ovmp/ovmp.toml file and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&error_message)?;
            error_screen.cleanup()?;
            return Err(anyhow!("Configuration error: {err}"));
        }
    };

    tracing::info!(
        "Configuration loaded: device={}, bars={}x{}+{} ({}..{}), autoplay={}",
        config_data.player.device,
        config_data.player.bar_width,
        config_data.player.bar_height_max,
        config_data.player.bar_margin,
        config_data.player.bar_height_min,
        config_data.player.bar_height_max,
        config_data.player.autoplay
    );

    let mut library = if file.is_none() {
        Some(MessageLibrary::new(&config::get_data_dir()?)?)
    } else {
        None
    };

    let mut queue = build_queue(library.as_mut(), index, file)?;
    if queue.current().is_none() {
        return Err(anyhow!(
            "No voice messages in the library. Import one with 'ovmp import <file.wav>'."
        ));
    }

    let mut tui = PlayerTui::new(
        config_data.player.bar_width,
        config_data.player.bar_margin,
        config_data.player.bar_height_min,
        config_data.player.bar_height_max,
    )
    .map_err(|e| anyhow!("Failed to initialize UI: {e}"))?;

    let external_toggle = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, external_toggle.clone())
        .map_err(|e| anyhow!("Failed to register signal handler: {e}"))?;

    let result = run_queue(
        &mut tui,
        &mut queue,
        library.as_mut(),
        &config_data,
        &external_toggle,
    )
    .await;

    tui.cleanup()
        .map_err(|e| anyhow!("Cleanup failed: {e}"))?;

    result?;
    tracing::info!("=== ovmp Player Exited Successfully ===");
    Ok(())
}

/// Builds the playback queue from the library, or wraps a single file.
fn build_queue(
    library: Option<&mut MessageLibrary>,
    index: Option<usize>,
    file: Option<PathBuf>,
) -> Result<PlayQueue, anyhow::Error> {
    if let Some(path) = file {
        if !path.exists() {
            return Err(anyhow!("Audio file not found: {}", path.display()));
        }
        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        // Synthetic message outside the library: no metadata, the waveform
        // is computed from the decoded samples instead
        let message = VoiceMessage {
            id: 0,
            path,
            title,
            duration_secs: 0.0,
            waveform: Vec::new(),
            listened: true,
            created_at: Local::now(),
        };
        return Ok(PlayQueue::new(vec![message], 0));
    }

    let library = library.ok_or_else(|| anyhow!("Message library unavailable"))?;
    let messages = library.get_all_messages()?;

    let start_index = match index {
        Some(n) => {
            if n < 1 || n > messages.len().max(1) {
                return Err(anyhow!(
                    "Message index out of range. Available messages: 1-{}",
                    messages.len()
                ));
            }
            n - 1
        }
        // Default to the first unlistened message, like an unread chat
        None => messages
            .iter()
            .position(|m| !m.listened)
            .unwrap_or(0),
    };

    Ok(PlayQueue::new(messages, start_index))
}

/// Runs the queue until the user quits or playback runs out of messages.
async fn run_queue(
    tui: &mut PlayerTui,
    queue: &mut PlayQueue,
    mut library: Option<&mut MessageLibrary>,
    config_data: &OvmpConfig,
    external_toggle: &std::sync::Arc<std::sync::atomic::AtomicBool>,
) -> Result<(), anyhow::Error> {
    loop {
        let message = match queue.current() {
            Some(message) => message.clone(),
            None => return Ok(()),
        };

        let action = play_message(
            tui,
            queue,
            &message,
            library.as_deref_mut(),
            config_data,
            external_toggle,
        )
        .await?;

        match action {
            NextAction::Quit => return Ok(()),
            NextAction::Advance | NextAction::Skip => {
                if queue.next().is_none() {
                    tracing::debug!("Reached end of queue");
                    return Ok(());
                }
            }
            NextAction::Previous => {
                // Stays put at the start of the queue
                queue.prev();
            }
        }
    }
}

/// Loads and plays one message; returns how to move through the queue.
async fn play_message(
    tui: &mut PlayerTui,
    queue: &mut PlayQueue,
    message: &VoiceMessage,
    mut library: Option<&mut MessageLibrary>,
    config_data: &OvmpConfig,
    external_toggle: &std::sync::Arc<std::sync::atomic::AtomicBool>,
) -> Result<NextAction, anyhow::Error> {
    // Load phase: decode in the background while showing progress; a failed
    // load offers retry/skip/quit
    let audio = loop {
        match load_with_progress(tui, message).await? {
            LoadOutcome::Loaded(audio) => break audio,
            LoadOutcome::Quit => return Ok(NextAction::Quit),
            LoadOutcome::Skip => return Ok(NextAction::Skip),
            LoadOutcome::Retry => continue,
        }
    };

    // Prefer the message's waveform metadata; fall back to an envelope
    // computed from the decoded samples
    let decoded = if message.waveform.is_empty() {
        waveform::decode_waveform(&waveform::envelope_from_samples(&audio.samples))
    } else {
        let capped = &message.waveform[..message.waveform.len().min(waveform::WAVEFORM_MAX_BYTES)];
        waveform::decode_waveform(capped)
    };
    tui.set_waveform(decoded);

    let duration_secs = audio.duration_secs();
    let sample_rate = audio.sample_rate;
    let mut player = AudioPlayer::new(audio.samples, sample_rate, config_data.player.device.clone());

    if let Err(e) = player.start() {
        tracing::error!("Failed to start playback: {}", e);
        return Err(anyhow!("Playback error: {e}"));
    }

    // Playing marks the message as read, like opening a voice message in chat
    if message.id > 0 && !message.listened {
        if let Some(library) = library.as_deref_mut() {
            if let Err(e) = library.mark_listened(message.id) {
                tracing::warn!("Failed to mark message {} listened: {}", message.id, e);
            }
        }
        queue.mark_current_listened();
    }

    tracing::info!(
        "Playing message '{}' ({:.1}s at {}Hz)",
        message.title,
        duration_secs,
        sample_rate
    );

    loop {
        if external_toggle.swap(false, std::sync::atomic::Ordering::Relaxed) {
            tracing::info!("Received SIGUSR1: toggling pause");
            player.toggle_pause();
        }

        let command = tui
            .handle_input()
            .map_err(|e| anyhow!("Input handling error: {e}"))?;

        match command {
            PlayerCommand::Continue | PlayerCommand::Confirm => {}
            PlayerCommand::TogglePause => player.toggle_pause(),
            PlayerCommand::SeekForward => player.seek_by_fraction(0.05),
            PlayerCommand::SeekBackward => player.seek_by_fraction(-0.05),
            PlayerCommand::JumpTo(fraction) => player.seek_to_fraction(fraction),
            PlayerCommand::Next => {
                player.stop();
                return Ok(NextAction::Advance);
            }
            PlayerCommand::Prev => {
                player.stop();
                return Ok(NextAction::Previous);
            }
            PlayerCommand::Quit => {
                player.stop();
                return Ok(NextAction::Quit);
            }
        }

        if player.is_finished() {
            player.stop();
            tracing::debug!("Message '{}' finished", message.title);
            if config_data.player.autoplay && !queue.at_end() {
                return Ok(NextAction::Advance);
            }
            // Hold the final frame; the user can still scrub back or quit
        }

        let unread = queue.current().map(|m| !m.listened).unwrap_or(false);
        let status = PlayerStatus {
            title: message.title.clone(),
            position_secs: player.position_secs(),
            duration_secs,
            is_paused: player.is_paused(),
            unread,
            queue_position: queue.position(),
        };
        tui.render_player(&status)
            .map_err(|e| anyhow!("Render failed: {e}"))?;
    }
}

/// Result of the loading phase for one message.
enum LoadOutcome {
    Loaded(crate::player::LoadedAudio),
    Retry,
    Skip,
    Quit,
}

/// Decodes the message's audio while rendering a progress gauge.
async fn load_with_progress(
    tui: &mut PlayerTui,
    message: &VoiceMessage,
) -> Result<LoadOutcome, anyhow::Error> {
    let loader = AudioLoader::spawn(&message.path);
    let progress = loader.progress();

    while !loader.is_finished() {
        tui.render_loading(&message.title, progress.fraction())
            .map_err(|e| anyhow!("Render failed: {e}"))?;

        match tui
            .handle_input()
            .map_err(|e| anyhow!("Input handling error: {e}"))?
        {
            PlayerCommand::Quit => return Ok(LoadOutcome::Quit),
            PlayerCommand::Next => return Ok(LoadOutcome::Skip),
            _ => {}
        }
    }

    match loader.join().await {
        Ok(audio) => Ok(LoadOutcome::Loaded(audio)),
        Err(e) => {
            tracing::warn!("Failed to load '{}': {}", message.path.display(), e);
            // Wait for an explicit decision before touching the queue
            loop {
                tui.render_load_error(&message.title, &e.to_string())
                    .map_err(|e| anyhow!("Render failed: {e}"))?;

                match tui
                    .handle_input()
                    .map_err(|e| anyhow!("Input handling error: {e}"))?
                {
                    PlayerCommand::Confirm => return Ok(LoadOutcome::Retry),
                    PlayerCommand::Next => return Ok(LoadOutcome::Skip),
                    PlayerCommand::Quit => return Ok(LoadOutcome::Quit),
                    _ => {}
                }
            }
        }
    }
}
