//! SQLite-based journal storage and event log.
//!
//! Provides persistent storage for:
//! - The journal document (habits, missions, raids, profile) as a single
//!   versioned JSON blob in a key-value table
//! - An append-only event log for settlement and command outcomes
//! - Aggregate statistics over the event log (daily and all-time)

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::journal::Journal;

use super::{data_dir, migrations};

/// Key under which the journal document is stored in the kv table.
const JOURNAL_KEY: &str = "journal";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub kind: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LogStats {
    pub total_events: u64,
    pub completions: u64,
    pub misses: u64,
    pub shields_spent: u64,
    pub days_settled: u64,
}

/// SQLite database for journal storage.
///
/// Stores the journal document plus the event log behind it.
pub struct JournalDb {
    conn: Connection,
}

impl JournalDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/questlog/questlog.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("questlog.db");
        let conn = Connection::open(path)?;
        migrations::migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        migrations::migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Load the journal document, upgrading legacy shapes on the way in.
    ///
    /// Returns `None` when no journal has been saved yet.
    ///
    /// # Errors
    /// Returns an error if the stored blob is not valid JSON.
    pub fn load_journal(&self) -> Result<Option<Journal>, Box<dyn std::error::Error>> {
        match self.kv_get(JOURNAL_KEY)? {
            Some(raw) => {
                let value: serde_json::Value = serde_json::from_str(&raw)?;
                Ok(Some(Journal::from_raw(value)))
            }
            None => Ok(None),
        }
    }

    /// Load the journal, falling back to an empty one for a fresh database.
    ///
    /// # Errors
    /// Returns an error if the stored blob is not valid JSON.
    pub fn load_or_default(&self) -> Result<Journal, Box<dyn std::error::Error>> {
        Ok(self.load_journal()?.unwrap_or_default())
    }

    /// Persist the journal document.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save_journal(&self, journal: &Journal) -> Result<(), Box<dyn std::error::Error>> {
        let raw = serde_json::to_string(journal)?;
        self.kv_set(JOURNAL_KEY, &raw)?;
        Ok(())
    }

    /// Append an event to the log.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_event(&self, event: &Event) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO events (kind, message, at) VALUES (?1, ?2, ?3)",
            params![event.kind(), event.message(), event.at().to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Fetch the most recent events, newest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn recent_events(&self, limit: u32) -> Result<Vec<EventRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, message, at FROM events
             ORDER BY id DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit], |row| {
            let at_raw: String = row.get(3)?;
            let at = DateTime::parse_from_rfc3339(&at_raw)
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?
                .with_timezone(&Utc);
            Ok(EventRecord {
                id: row.get(0)?,
                kind: row.get(1)?,
                message: row.get(2)?,
                at,
            })
        })?;

        rows.collect()
    }

    pub fn stats_today(&self) -> Result<LogStats, rusqlite::Error> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(
            "SELECT kind, COUNT(*)
             FROM events
             WHERE at >= ?1
             GROUP BY kind",
        )?;

        let rows = stmt.query_map(params![format!("{today}T00:00:00+00:00")], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
        })?;

        Self::fold_stats(rows)
    }

    pub fn stats_all(&self) -> Result<LogStats, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, COUNT(*)
             FROM events
             GROUP BY kind",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
        })?;

        Self::fold_stats(rows)
    }

    fn fold_stats(
        rows: impl Iterator<Item = rusqlite::Result<(String, u64)>>,
    ) -> Result<LogStats, rusqlite::Error> {
        let mut stats = LogStats::default();
        for row in rows {
            let (kind, count) = row?;
            stats.total_events += count;
            match kind.as_str() {
                "habit_completed" => stats.completions += count,
                "habit_missed" => stats.misses += count,
                "shield_consumed" => stats.shields_spent += count,
                "day_settled" => stats.days_settled += count,
                _ => {}
            }
        }
        Ok(stats)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::Habit;
    use chrono::TimeZone;

    fn make_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn journal_roundtrip() {
        let db = JournalDb::open_memory().unwrap();
        assert!(db.load_journal().unwrap().is_none());

        let mut journal = Journal::default();
        journal.add_habit(Habit::new("Stretch", make_now()));
        db.save_journal(&journal).unwrap();

        let loaded = db.load_journal().unwrap().unwrap();
        assert_eq!(loaded.habits.len(), 1);
        assert_eq!(loaded.habits[0].title, "Stretch");
    }

    #[test]
    fn load_or_default_on_fresh_database() {
        let db = JournalDb::open_memory().unwrap();
        let journal = db.load_or_default().unwrap();
        assert!(journal.habits.is_empty());
        assert!(journal.last_settled_at.is_none());
    }

    #[test]
    fn legacy_document_upgrades_on_load() {
        let db = JournalDb::open_memory().unwrap();
        db.kv_set(
            JOURNAL_KEY,
            r#"{"habits":[{"id":"habit-1","title":"Old runner","description":"","created_at":"2024-01-01T12:00:00Z","stat":"vitality","reminder_minutes":[540]}]}"#,
        )
        .unwrap();

        let journal = db.load_journal().unwrap().unwrap();
        let habit = &journal.habits[0];
        assert_eq!(habit.stats, vec![crate::profile::StatKind::Vitality]);
        assert_eq!(habit.reminders[0].time, "09:00");
        assert_eq!(habit.daily_target, 1);
    }

    #[test]
    fn record_event_and_stats() {
        let db = JournalDb::open_memory().unwrap();
        let now = Utc::now();

        db.record_event(&Event::HabitCompleted {
            habit_id: "habit-1".into(),
            title: "Stretch".into(),
            streak: 3,
            xp: 25,
            gold: 10,
            at: now,
        })
        .unwrap();
        db.record_event(&Event::HabitMissed {
            habit_id: "habit-2".into(),
            title: "Run".into(),
            streak_before: 10,
            streak_after: 8,
            stats: vec![crate::profile::StatKind::Vitality],
            at: now,
        })
        .unwrap();
        db.record_event(&Event::DaySettled {
            date: now.date_naive(),
            missed: 1,
            shields_spent: 0,
            at: now,
        })
        .unwrap();

        let all = db.stats_all().unwrap();
        assert_eq!(all.total_events, 3);
        assert_eq!(all.completions, 1);
        assert_eq!(all.misses, 1);
        assert_eq!(all.days_settled, 1);
        assert_eq!(all.shields_spent, 0);

        let today = db.stats_today().unwrap();
        assert_eq!(today.total_events, 3);
    }

    #[test]
    fn recent_events_newest_first() {
        let db = JournalDb::open_memory().unwrap();
        let now = Utc::now();
        for n in 0..3 {
            db.record_event(&Event::ShieldPurchased {
                shields: n + 1,
                gold_remaining: 200 - 50 * u64::from(n + 1),
                at: now,
            })
            .unwrap();
        }

        let events = db.recent_events(2).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].id > events[1].id);
        assert_eq!(events[0].kind, "shield_purchased");
    }

    #[test]
    fn kv_store() {
        let db = JournalDb::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }
}
