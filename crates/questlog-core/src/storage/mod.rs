mod config;
pub mod journal_db;
pub mod migrations;

pub use config::Config;
pub use journal_db::{EventRecord, JournalDb, LogStats};

use std::path::PathBuf;

/// Returns `~/.config/questlog[-dev]/` based on QUESTLOG_ENV.
///
/// Set QUESTLOG_ENV=dev to use the development data directory, or
/// QUESTLOG_DATA_DIR to point somewhere else entirely (used by the CLI
/// test suite to stay out of the real home directory).
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(overridden) = std::env::var("QUESTLOG_DATA_DIR") {
        let dir = PathBuf::from(overridden);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("QUESTLOG_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("questlog-dev")
    } else {
        base_dir.join("questlog")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
