//! Database layer for the surveillance store.

mod animals;
mod cases;
mod filter;
mod schema;

#[allow(unused_imports)]
pub use animals::*;
#[allow(unused_imports)]
pub use cases::*;
pub use filter::*;
pub use schema::*;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, Transaction};
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Malformed stored value: {0}")]
    Malformed(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction through a shared reference.
    ///
    /// Callers must not nest these; the store is used from one thread at a
    /// time behind the FFI mutex.
    pub fn transaction(&self) -> DbResult<Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Advance a named sequence and return the new value.
    fn next_sequence(&self, name: &str) -> DbResult<i64> {
        self.conn.execute(
            "UPDATE id_sequences SET value = value + 1 WHERE name = ?",
            [name],
        )?;
        let value = self.conn.query_row(
            "SELECT value FROM id_sequences WHERE name = ?",
            [name],
            |row| row.get(0),
        )?;
        Ok(value)
    }
}

/// Timestamp format used in every TEXT timestamp column.
///
/// Fixed-width UTC so lexical order equals chronological order.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DbError::Malformed(format!("timestamp {:?}: {}", raw, e)))
}

pub(crate) fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_date(raw: &str) -> DbResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| DbError::Malformed(format!("date {:?}: {}", raw, e)))
}
