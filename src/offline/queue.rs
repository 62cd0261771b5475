//! Durable offline punch queue.
//!
//! When the primary store cannot be reached, punches are written to an
//! embedded SQLite file and replayed later by the sync worker. The queue is
//! bounded (the oldest entry is evicted when full), idempotent (a content
//! hash of the punch reference and timestamp is unique), and self-cleaning
//! (entries past the retention window are purged).
//!
//! One queue exists per application instance. Every access goes through a
//! single connection guarded by a mutex.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, Row, params};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::OfflineQueueConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{GeoLocation, NewQueueEntry, OfflineQueueEntry, PunchType};

/// Fixed-width layout so stored timestamps sort lexicographically.
const DB_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const DB_TIMESTAMP_PARSE: &str = "%Y-%m-%d %H:%M:%S%.f";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS offline_punches (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id   TEXT,
        card_token    TEXT,
        punch_type    TEXT NOT NULL,
        timestamp     TEXT NOT NULL,
        device_type   TEXT NOT NULL,
        latitude      REAL,
        longitude     REAL,
        note          TEXT,
        created_at    TEXT NOT NULL,
        retry_count   INTEGER NOT NULL DEFAULT 0,
        last_retry_at TEXT,
        last_error    TEXT,
        content_hash  TEXT NOT NULL UNIQUE
    );
    CREATE INDEX IF NOT EXISTS idx_offline_punches_timestamp
        ON offline_punches (timestamp);
    CREATE INDEX IF NOT EXISTS idx_offline_punches_created_at
        ON offline_punches (created_at);
";

const SELECT_COLUMNS: &str = "id, employee_id, card_token, punch_type, timestamp, device_type, \
     latitude, longitude, note, created_at, retry_count, last_retry_at, last_error, content_hash";

/// Outcome of [`OfflineQueue::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// A new entry was stored.
    Queued(i64),
    /// An entry with the same content hash already exists.
    AlreadyQueued(i64),
}

impl EnqueueOutcome {
    /// The id of the stored entry.
    pub fn id(&self) -> i64 {
        match self {
            EnqueueOutcome::Queued(id) | EnqueueOutcome::AlreadyQueued(id) => *id,
        }
    }
}

/// Returns the idempotency key for a queued punch.
///
/// # Example
///
/// ```
/// use punch_engine::offline::content_hash;
/// use chrono::NaiveDate;
///
/// let ts = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// assert_eq!(content_hash("emp_001", ts), content_hash("emp_001", ts));
/// assert_ne!(content_hash("emp_001", ts), content_hash("emp_002", ts));
/// ```
pub fn content_hash(reference: &str, timestamp: NaiveDateTime) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}|{}", reference, timestamp).as_bytes());
    hex::encode(hasher.finalize())
}

/// The offline punch queue.
pub struct OfflineQueue {
    conn: Mutex<Connection>,
    config: OfflineQueueConfig,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for OfflineQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineQueue")
            .field("database_path", &self.config.database_path)
            .field("capacity", &self.config.capacity)
            .finish_non_exhaustive()
    }
}

impl OfflineQueue {
    /// Opens (or creates) the queue file at `config.database_path`.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the parent directory cannot be created and
    /// `QueueStorage` if SQLite fails.
    pub fn open(config: OfflineQueueConfig, clock: Arc<dyn Clock>) -> EngineResult<Self> {
        let path = config.database_path.clone();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EngineError::Storage {
                message: format!("cannot create {}: {}", parent.display(), e),
            })?;
        }

        let conn = Connection::open(Path::new(&path))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        info!(path = %path.display(), "Offline queue opened");
        Self::with_connection(conn, config, clock)
    }

    /// Opens a queue that lives only in memory.
    pub fn open_in_memory(config: OfflineQueueConfig, clock: Arc<dyn Clock>) -> EngineResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, config, clock)
    }

    fn with_connection(
        conn: Connection,
        config: OfflineQueueConfig,
        clock: Arc<dyn Clock>,
    ) -> EngineResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            config,
            clock,
        })
    }

    /// The queue settings.
    pub fn config(&self) -> &OfflineQueueConfig {
        &self.config
    }

    /// Stores a punch for later synchronization.
    ///
    /// Re-submitting the same reference and timestamp returns the existing
    /// entry. At capacity the oldest entry is evicted first.
    pub fn enqueue(&self, entry: &NewQueueEntry) -> EngineResult<EnqueueOutcome> {
        let hash = content_hash(entry.reference(), entry.timestamp);
        let now = self.clock.now();

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM offline_punches WHERE content_hash = ?1",
                [&hash],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            debug!(entry_id = id, "Punch already queued");
            return Ok(EnqueueOutcome::AlreadyQueued(id));
        }

        let count: i64 = tx.query_row("SELECT COUNT(*) FROM offline_punches", [], |row| {
            row.get(0)
        })?;
        let capacity = self.config.capacity as i64;
        if count >= capacity {
            let excess = count - capacity + 1;
            let evicted = tx.execute(
                "DELETE FROM offline_punches WHERE id IN (
                     SELECT id FROM offline_punches ORDER BY created_at ASC, id ASC LIMIT ?1
                 )",
                [excess],
            )?;
            warn!(
                evicted = evicted,
                capacity = self.config.capacity,
                "Offline queue full, evicted oldest entry"
            );
        }

        tx.execute(
            "INSERT INTO offline_punches (
                 employee_id, card_token, punch_type, timestamp, device_type,
                 latitude, longitude, note, created_at, retry_count, content_hash
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10)",
            params![
                entry.employee_id,
                entry.card_token,
                entry.punch_type.as_str(),
                format_ts(entry.timestamp),
                entry.device_type,
                entry.location.map(|l| l.latitude),
                entry.location.map(|l| l.longitude),
                entry.note,
                format_ts(now),
                hash,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!(
            entry_id = id,
            punch_type = %entry.punch_type,
            resolved = entry.employee_id.is_some(),
            "Punch queued offline"
        );
        Ok(EnqueueOutcome::Queued(id))
    }

    /// Returns up to `limit` entries still below the retry ceiling,
    /// in punch-time order.
    pub fn pending(&self, limit: usize) -> EngineResult<Vec<OfflineQueueEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM offline_punches
             WHERE retry_count < ?1
             ORDER BY timestamp ASC, id ASC
             LIMIT ?2"
        ))?;
        let rows = stmt.query_map(
            params![self.config.max_retries, limit as i64],
            map_row,
        )?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Removes a synchronized entry. Returns false if it was already gone.
    pub fn mark_synced(&self, id: i64) -> EngineResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM offline_punches WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    /// Records a failed sync attempt.
    ///
    /// Entries reaching the retry ceiling stay in the store but are no
    /// longer returned by [`OfflineQueue::pending`].
    pub fn record_failure(&self, id: i64, error: &str) -> EngineResult<()> {
        let now = self.clock.now();
        let conn = self.lock()?;
        conn.execute(
            "UPDATE offline_punches
             SET retry_count = retry_count + 1, last_error = ?2, last_retry_at = ?3
             WHERE id = ?1",
            params![id, error, format_ts(now)],
        )?;

        let retry_count: Option<u32> = conn
            .query_row(
                "SELECT retry_count FROM offline_punches WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        if retry_count.is_some_and(|c| c >= self.config.max_retries) {
            warn!(
                entry_id = id,
                max_retries = self.config.max_retries,
                last_error = %error,
                "Offline entry reached the retry ceiling"
            );
        }
        Ok(())
    }

    /// Deletes entries queued longer ago than the retention window.
    pub fn purge_expired(&self) -> EngineResult<usize> {
        let cutoff = self.clock.now() - self.config.retention();
        let conn = self.lock()?;
        let purged = conn.execute(
            "DELETE FROM offline_punches WHERE created_at < ?1",
            [format_ts(cutoff)],
        )?;
        if purged > 0 {
            info!(purged = purged, "Purged expired offline entries");
        }
        Ok(purged)
    }

    /// Number of entries in the queue, stuck ones included.
    pub fn len(&self) -> EngineResult<usize> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM offline_punches", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Looks up one entry.
    pub fn get(&self, id: i64) -> EngineResult<Option<OfflineQueueEntry>> {
        let conn = self.lock()?;
        let entry = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM offline_punches WHERE id = ?1"),
                [id],
                map_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// Entries at or beyond the retry ceiling, oldest first.
    pub fn stuck_entries(&self) -> EngineResult<Vec<OfflineQueueEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM offline_punches
             WHERE retry_count >= ?1
             ORDER BY created_at ASC, id ASC"
        ))?;
        let rows = stmt.query_map([self.config.max_retries], map_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Resets the retry count so a stuck entry is synchronized again.
    pub fn retry_entry(&self, id: i64) -> EngineResult<bool> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE offline_punches SET retry_count = 0 WHERE id = ?1",
            [id],
        )?;
        Ok(updated > 0)
    }

    /// Deletes an entry without synchronizing it.
    pub fn remove(&self, id: i64) -> EngineResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM offline_punches WHERE id = ?1", [id])?;
        if deleted > 0 {
            warn!(entry_id = id, "Offline entry removed without sync");
        }
        Ok(deleted > 0)
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| EngineError::Internal {
            message: "offline queue lock poisoned".to_string(),
        })
    }
}

fn format_ts(ts: NaiveDateTime) -> String {
    ts.format(DB_TIMESTAMP_FORMAT).to_string()
}

fn parse_ts(column: usize, value: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DB_TIMESTAMP_PARSE).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn map_row(row: &Row) -> rusqlite::Result<OfflineQueueEntry> {
    let punch_type_str: String = row.get("punch_type")?;
    let punch_type = PunchType::from_db_str(&punch_type_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::new(EngineError::Internal {
                message: format!("Invalid punch type: {}", punch_type_str),
            }),
        )
    })?;

    let timestamp: String = row.get("timestamp")?;
    let created_at: String = row.get("created_at")?;
    let last_retry_at: Option<String> = row.get("last_retry_at")?;
    let latitude: Option<f64> = row.get("latitude")?;
    let longitude: Option<f64> = row.get("longitude")?;

    Ok(OfflineQueueEntry {
        id: row.get("id")?,
        employee_id: row.get("employee_id")?,
        card_token: row.get("card_token")?,
        punch_type,
        timestamp: parse_ts(4, &timestamp)?,
        device_type: row.get("device_type")?,
        location: latitude
            .zip(longitude)
            .map(|(latitude, longitude)| GeoLocation {
                latitude,
                longitude,
            }),
        note: row.get("note")?,
        created_at: parse_ts(9, &created_at)?,
        retry_count: row.get("retry_count")?,
        last_retry_at: last_retry_at.as_deref().map(|s| parse_ts(11, s)).transpose()?,
        last_error: row.get("last_error")?,
        content_hash: row.get("content_hash")?,
    })
}
