pub mod completions;
pub mod config;
pub mod day;
pub mod habit;
pub mod log;
pub mod mission;
pub mod profile;
pub mod raid;
pub mod stats;
pub mod tick;

use chrono::Utc;
use questlog_core::{Config, Difficulty, Event, Journal, JournalDb};

/// Open the database, journal and config without settling anything.
pub(crate) fn open() -> Result<(JournalDb, Journal, Config), Box<dyn std::error::Error>> {
    let db = JournalDb::open()?;
    let journal = db.load_or_default()?;
    let config = Config::load()?;
    Ok((db, journal, config))
}

/// Open and bring the journal up to date with the clock.
///
/// Every command that reads or mutates the journal goes through here so
/// that pending day boundaries are settled before the command acts.
pub(crate) fn open_settled() -> Result<(JournalDb, Journal, Config), Box<dyn std::error::Error>> {
    let (db, mut journal, config) = open()?;
    let events = journal.tick(Utc::now(), &config);
    if !events.is_empty() {
        emit_events(&db, &events)?;
        db.save_journal(&journal)?;
    }
    Ok((db, journal, config))
}

/// Record each event in the log and print it.
pub(crate) fn emit_events(
    db: &JournalDb,
    events: &[Event],
) -> Result<(), Box<dyn std::error::Error>> {
    for event in events {
        db.record_event(event)?;
        println!("{}", serde_json::to_string_pretty(event)?);
    }
    Ok(())
}

/// Lenient difficulty parsing; anything unrecognized maps to Normal.
pub(crate) fn parse_difficulty(s: &str) -> Difficulty {
    match s.to_lowercase().as_str() {
        "easy" => Difficulty::Easy,
        "hard" => Difficulty::Hard,
        _ => Difficulty::Normal,
    }
}
