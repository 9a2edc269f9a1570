//! Database schema migrations for questlog.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    // Ensure schema_version table exists
    create_schema_version_table(conn)?;

    // Get current version
    let current_version = get_schema_version(conn);

    // Apply migrations sequentially
    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT version FROM schema_version",
        [],
        |row| row.get::<_, i32>(0),
    )
    .unwrap_or_else(|e| {
        // If table doesn't exist or query fails, return 0
        if matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            0
        } else {
            eprintln!("Warning: failed to read schema_version: {}", e);
            0
        }
    })
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    // Delete any existing version
    conn.execute("DELETE FROM schema_version", [])?;

    // Insert new version
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;

    Ok(())
}

/// Migration v1: Initial schema (baseline).
///
/// Creates the kv store that holds the serialized journal document.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    set_schema_version(conn, 1)?;
    Ok(())
}

/// Migration v2: Add the events log.
///
/// Settlement and command outcomes are appended here so `log` and `stats`
/// can answer without replaying the journal.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS events (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            kind    TEXT NOT NULL,
            message TEXT NOT NULL DEFAULT '',
            at      TEXT NOT NULL
        );

        -- Create indexes for common query patterns
        CREATE INDEX IF NOT EXISTS idx_events_at ON events(at);
        CREATE INDEX IF NOT EXISTS idx_events_kind ON events(kind);",
    )?;

    // Mark as v2
    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [2],
    )?;

    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test migration from scratch (v0 -> v2)
    #[test]
    fn test_migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();

        // Run migrations
        migrate(&conn).unwrap();

        // Check version
        let version = get_schema_version(&conn);
        assert_eq!(version, 2);

        // Both tables should exist and accept writes
        conn.execute(
            "INSERT INTO kv (key, value) VALUES ('journal', '{}')",
            [],
        )
        .unwrap();

        conn.execute(
            "INSERT INTO events (kind, message, at)
             VALUES ('day_settled', 'Settled 2024-01-01', '2024-01-02T04:00:00+00:00')",
            [],
        )
        .unwrap();

        let kind: String = conn
            .query_row("SELECT kind FROM events WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(kind, "day_settled");
    }

    /// Test that migrations are idempotent
    #[test]
    fn test_migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        // Run migrations twice
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();

        // Should still be at version 2
        let version = get_schema_version(&conn);
        assert_eq!(version, 2);
    }

    /// Test incremental migration (v1 -> v2)
    #[test]
    fn test_incremental_migration() {
        let conn = Connection::open_in_memory().unwrap();

        // Create schema_version table at v1
        conn.execute(
            "CREATE TABLE schema_version (version INTEGER PRIMARY KEY)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (1)",
            [],
        )
        .unwrap();

        // Create kv table (v1)
        conn.execute_batch(
            "CREATE TABLE kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .unwrap();
        conn.execute(
            "INSERT INTO kv (key, value) VALUES ('journal', '{\"habits\":[]}')",
            [],
        )
        .unwrap();

        // Run migrations
        migrate(&conn).unwrap();

        // Should be at version 2
        let version = get_schema_version(&conn);
        assert_eq!(version, 2);

        // Existing kv data must survive
        let value: String = conn
            .query_row("SELECT value FROM kv WHERE key = 'journal'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(value, "{\"habits\":[]}");

        // Events table should exist
        let stmt = conn
            .prepare("SELECT id, kind, message, at FROM events")
            .unwrap();
        // Query should not fail (columns exist)
        drop(stmt);
    }
}
