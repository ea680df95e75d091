//! SQLite-backed event log.
//!
//! One row per status change, keyed by the RFC 3339 timestamp of the poll
//! that observed it. Rows are only ever inserted.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

use super::migrations;
use crate::error::StoreError;
use crate::events::{Event, EventStore};
use crate::status::Status;

/// File name of the event log inside the data directory.
pub const DB_FILE: &str = "history.db";

/// SQLite database holding the event log.
pub struct SqliteEventStore {
    conn: Connection,
}

impl SqliteEventStore {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open (creating if needed) the database at `path` and migrate it.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        migrations::migrate(&conn).map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> Result<u64, StoreError> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get::<_, u64>(0))?;
        Ok(n)
    }
}

fn row_to_event(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, Option<f64>)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode(
    (id, recorded_at, status, power_w): (i64, String, String, Option<f64>),
) -> Result<Event, StoreError> {
    let timestamp = DateTime::parse_from_rfc3339(&recorded_at)
        .map_err(|e| StoreError::Corrupt {
            row: id,
            message: format!("bad timestamp '{recorded_at}': {e}"),
        })?
        .with_timezone(&Utc);
    let status = status
        .parse::<Status>()
        .map_err(|message| StoreError::Corrupt { row: id, message })?;
    Ok(Event {
        timestamp,
        status,
        power_watts: power_w,
    })
}

impl EventStore for SqliteEventStore {
    fn append(&self, event: &Event) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO events (recorded_at, status, power_w) VALUES (?1, ?2, ?3)",
            params![
                event.timestamp.to_rfc3339(),
                event.status.as_str(),
                event.power_watts,
            ],
        )?;
        Ok(())
    }

    fn last(&self) -> Result<Option<Event>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, recorded_at, status, power_w FROM events
                 ORDER BY recorded_at DESC LIMIT 1",
                [],
                row_to_event,
            )
            .optional()?;
        row.map(decode).transpose()
    }

    fn all(&self) -> Result<Vec<Event>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, recorded_at, status, power_w FROM events ORDER BY recorded_at ASC",
        )?;
        let rows = stmt.query_map([], row_to_event)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(decode(row?)?);
        }
        Ok(events)
    }
}
