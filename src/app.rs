//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::config;
use crate::logging;
use anyhow::anyhow;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;

/// Checks if setup is needed (version mismatch or missing config) and runs setup if required.
///
/// This is called early in the startup sequence, before command handling.
/// It checks:
/// 1. If config file doesn't exist, runs full setup
/// 2. If config version is older than app version, runs setup and logs migration
/// 3. If config version matches app version, does nothing
async fn check_and_run_setup() -> Result<(), anyhow::Error> {
    let config_path = config::get_config_path()?;

    match crate::setup::version::check_setup_needed(&config_path)? {
        Some(old_version) => {
            // Setup is needed - either config doesn't exist or version is older
            tracing::info!(
                "Setup needed - migrating from version {} to {}",
                old_version,
                env!("CARGO_PKG_VERSION")
            );
            crate::setup::run_setup().map_err(|e| {
                tracing::error!("Setup failed: {e}");
                anyhow!("Setup failed: {e}")
            })?;
            crate::setup::version::update_config_version(&config_path).map_err(|e| {
                tracing::error!("Failed to update config version: {e}");
                anyhow!("Failed to update config version: {e}")
            })?;
            tracing::info!(
                "Setup completed successfully - migrated to version {}",
                env!("CARGO_PKG_VERSION")
            );
        }
        None => {
            // Config exists and version matches, no setup needed
            tracing::debug!(
                "Config version up to date ({})",
                env!("CARGO_PKG_VERSION")
            );
        }
    }

    Ok(())
}

/// A terminal voice message player with waveform scrubbing
#[derive(Parser)]
#[command(name = "ovmp")]
#[command(version)]
#[command(about = "\n\n ┏┓┓┏┳┳┓┏┓ \n ┗┛┗┛┛┗┗┣┛")]
#[command(long_about = "\n\n ┏┓┓┏┳┳┓┏┓ \n ┗┛┗┛┛┗┗┣┛\n\nA terminal voice message player with waveform scrubbing,\nunlistened tracking, and autoplay queues.\n\nDEFAULT COMMAND:\n    If no command is specified, 'play' is used by default.\n    Play options (N, --file) can be used without explicitly saying 'play'.\n\nEXAMPLES:\n    # Play unlistened messages from the library\n    $ ovmp\n    $ ovmp play\n    \n    # Play message #3 and continue from there\n    $ ovmp 3\n    $ ovmp play 3\n    \n    # Play a file directly, without touching the library\n    $ ovmp --file memo.wav\n    \n    # Import a recording into the library\n    $ ovmp import memo.wav --title \"Standup notes\"\n    \n    # List the library with unlistened markers\n    $ ovmp list\n    \n    # Print the decoded waveform of message #3\n    $ ovmp inspect 3\n    \n    # Edit configuration file\n    $ ovmp config")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/ovmp/ovmp.toml\n    Library:            ~/.local/share/ovmp/messages.db\n    Logs:               ~/.local/state/ovmp/ovmp.log.*"
)]
struct Cli {
    /// Message index to start from (play default command)
    #[arg(value_name = "N")]
    index: Option<usize>,

    /// Play an audio file directly instead of the library (play default command)
    #[arg(short, long, value_name = "FILE", global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play voice messages with the waveform TUI (default)
    ///
    /// Space pauses, Left/Right seek, digits jump to a tenth of the message,
    /// n/p switch messages, q quits. Without an index, playback starts at the
    /// first unlistened message and autoplays through the rest.
    #[command(visible_alias = "p")]
    Play {
        /// Message index to start from (1 = oldest)
        #[arg(value_name = "N")]
        index: Option<usize>,

        /// Play an audio file directly instead of the library
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Import an audio file into the message library
    ///
    /// Decodes the file, computes its waveform metadata, and stores it.
    /// The file itself stays where it is; only its path is recorded.
    #[command(visible_alias = "i")]
    Import {
        /// Path to the audio file to import
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Display title (defaults to the file name)
        #[arg(short, long, value_name = "TITLE")]
        title: Option<String>,
    },

    /// List voice messages in the library
    ///
    /// Shows index, date, duration, and title, with unlistened messages
    /// marked. Indexes here are the ones play and inspect accept.
    #[command(visible_alias = "ls")]
    List,

    /// Print the decoded waveform of a message
    ///
    /// Decodes the packed 5-bit waveform metadata and prints sample
    /// statistics plus a one-line rendering.
    Inspect {
        /// Message index (1 = oldest)
        #[arg(value_name = "N")]
        index: Option<usize>,

        /// Inspect an audio file directly by computing its envelope
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Edit device selection, waveform bar geometry, and autoplay behavior.
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio output devices
    ///
    /// Shows device names to help configure the correct output device
    /// in ovmp.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    ///
    /// Examples:
    ///   ovmp completions bash > ovmp.bash
    ///   ovmp completions zsh > _ovmp
    ///   ovmp completions fish > ovmp.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If setup fails
/// - If logging initialization fails
/// - If command execution fails (e.g., playback, import, library access)
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "ovmp", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Check if setup is needed (version check or missing config)
    check_and_run_setup().await?;

    // Route to appropriate command handler
    match cli.command {
        None | Some(Commands::Play { .. }) => {
            // Default command is play
            // Merge top-level options with explicit play command options
            // If both are specified, the explicit play command options take precedence
            let (index, file) = match cli.command {
                Some(Commands::Play { index, file }) => (index, file),
                None => (cli.index, cli.file),
                _ => unreachable!(),
            };
            commands::handle_play(index, file).await?;
        }
        Some(Commands::Import { file, title }) => {
            commands::handle_import(file, title).await?;
        }
        Some(Commands::List) => {
            commands::handle_list().await?;
        }
        Some(Commands::Inspect { index, file }) => {
            commands::handle_inspect(index, file).await?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
