use crate::model::{StorageError, Summary};
use chrono::NaiveDate;
use rusqlite::{params, Connection};

/// Ledger of delivered summaries. Indicators themselves are never stored.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database and creates the schema if needed.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        Self::init(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS notified (
                symbol TEXT NOT NULL,
                as_of TEXT NOT NULL,
                lower REAL,
                upper REAL,
                notified_at TEXT NOT NULL,
                PRIMARY KEY (symbol, as_of)
            );
            ",
        )?;
        Ok(Self { conn })
    }

    /// Whether the summary for this symbol and trading day was already delivered.
    pub fn is_notified(&self, symbol: &str, as_of: NaiveDate) -> Result<bool, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM notified WHERE symbol = ?1 AND as_of = ?2")?;
        let mut rows = stmt.query(params![symbol, as_of.to_string()])?;
        Ok(rows.next()?.is_some())
    }

    /// Records a delivered summary with the current timestamp.
    pub fn mark_notified(&self, symbol: &str, summary: &Summary) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO notified (symbol, as_of, lower, upper, notified_at)
             VALUES (?1, ?2, ?3, ?4, datetime('now'))",
            params![
                symbol,
                summary.snapshot.date.to_string(),
                summary.buy_range.lower,
                summary.buy_range.upper,
            ],
        )?;
        Ok(())
    }

    #[cfg(test)]
    fn notification_count(&self, symbol: &str) -> Result<usize, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM notified WHERE symbol = ?1",
            params![symbol],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
