//! File-based logging.
//!
//! The player owns the terminal, so logs never go to stdout/stderr. Instead
//! a non-blocking appender writes daily-rotated files under the XDG state
//! directory, with old rotations pruned at startup. Verbosity follows
//! `RUST_LOG` and defaults to `info`.

use anyhow::anyhow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

/// Number of daily rotations kept on disk.
const KEPT_ROTATIONS: usize = 7;

/// Keeps the non-blocking writer's flush thread alive until exit.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Installs the global tracing subscriber writing to `ovmp.log.*`.
///
/// Must be called once, before any command that logs; calling it twice is an
/// error.
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If a subscriber is already installed
pub fn init_logging() -> Result<(), anyhow::Error> {
    let log_dir = get_log_dir()?;

    if let Err(e) = prune_old_rotations(&log_dir) {
        eprintln!("Warning: Failed to cleanup old logs: {e}");
    }

    let file_appender = rolling::daily(&log_dir, "ovmp.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow!("Logging already initialized"))?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_ansi(false),
        )
        .init();

    tracing::debug!("Logging initialized. Log directory: {}", log_dir.display());
    Ok(())
}

/// Resolves (and creates) the log directory.
///
/// `$XDG_STATE_HOME/ovmp` when the variable is set, `~/.local/state/ovmp`
/// otherwise.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the directory cannot be created
pub fn get_log_dir() -> Result<PathBuf, anyhow::Error> {
    let log_dir = match std::env::var("XDG_STATE_HOME") {
        Ok(xdg_state) => PathBuf::from(xdg_state).join("ovmp"),
        Err(_) => dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not determine home directory"))?
            .join(".local/state/ovmp"),
    };

    fs::create_dir_all(&log_dir)?;

    Ok(log_dir)
}

/// Deletes dated rotations beyond the newest [`KEPT_ROTATIONS`].
///
/// The daily appender names files `ovmp.log.YYYY-MM-DD`; anything else in
/// the directory is left alone. Deletion failures are logged and skipped so
/// a stray permission problem can't block startup.
fn prune_old_rotations(log_dir: &Path) -> Result<(), anyhow::Error> {
    let mut rotations: Vec<(PathBuf, std::time::SystemTime)> = fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_string_lossy().into_owned();
            if !is_rotation_name(&name) {
                return None;
            }
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((path, modified))
        })
        .collect();

    rotations.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in rotations.iter().skip(KEPT_ROTATIONS) {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to delete old log file {}: {}", path.display(), e);
        }
    }

    Ok(())
}

/// Matches the `ovmp.log.YYYY-MM-DD` names the daily appender produces.
fn is_rotation_name(name: &str) -> bool {
    let Some(suffix) = name.strip_prefix("ovmp.log.") else {
        return false;
    };
    let parts: Vec<&str> = suffix.split('-').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_name_matching() {
        assert!(is_rotation_name("ovmp.log.2026-08-30"));
        assert!(!is_rotation_name("ovmp.log"));
        assert!(!is_rotation_name("ovmp.log.backup"));
        assert!(!is_rotation_name("other.log.2026-08-30"));
    }

    #[test]
    fn test_prune_keeps_newest_rotations() {
        let dir = std::env::temp_dir().join(format!("ovmp_logs_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        for day in 1..=9 {
            fs::write(dir.join(format!("ovmp.log.2026-08-{day:02}")), "x").unwrap();
        }
        fs::write(dir.join("unrelated.txt"), "x").unwrap();

        prune_old_rotations(&dir).unwrap();

        let remaining = fs::read_dir(&dir).unwrap().count();
        // 7 rotations survive, plus the unrelated file
        assert_eq!(remaining, KEPT_ROTATIONS + 1);
        assert!(dir.join("unrelated.txt").exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
