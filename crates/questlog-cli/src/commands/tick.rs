use chrono::{DateTime, Utc};

use super::{emit_events, open};

pub fn run(now: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let now = match now {
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map_err(|e| format!("invalid --now timestamp: {e}"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let (db, mut journal, config) = open()?;
    let events = journal.tick(now, &config);
    if events.is_empty() {
        println!("Nothing to settle");
    } else {
        emit_events(&db, &events)?;
    }
    db.save_journal(&journal)?;
    Ok(())
}
