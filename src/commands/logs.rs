//! Show recent log output.

use crate::logging;
use anyhow::anyhow;
use std::fs;

/// How many trailing log lines to print.
const TAIL_LINES: usize = 50;

/// Prints the last lines of the newest log file.
///
/// # Errors
/// - If the log directory does not exist yet
/// - If no log files are present
pub fn handle_logs() -> Result<(), anyhow::Error> {
    let log_dir = logging::get_log_dir()?;

    if !log_dir.exists() {
        return Err(anyhow!(
            "No logs yet. The log directory {} does not exist.",
            log_dir.display()
        ));
    }

    let mut log_files: Vec<_> = fs::read_dir(&log_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with("ovmp.log")
        })
        .collect();

    log_files.sort_by_key(|entry| entry.file_name());

    let Some(newest) = log_files.last() else {
        return Err(anyhow!("No log files found in {}", log_dir.display()));
    };

    let contents = fs::read_to_string(newest.path())?;
    let lines: Vec<&str> = contents.lines().collect();
    let start = lines.len().saturating_sub(TAIL_LINES);

    println!("=== {} ===", newest.path().display());
    for line in &lines[start..] {
        println!("{line}");
    }

    Ok(())
}
