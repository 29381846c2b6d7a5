//! Shared service state: the database location and the audit trail.
//!
//! One `CoreState` is built at startup and shared behind `Arc`. Handlers
//! open a short-lived connection per request through [`CoreState::open_db`];
//! migrations are version-guarded, so the per-open check is one cheap
//! SELECT.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::db::{self, DatabaseError};

/// Mutations stay this long in the audit trail.
pub const AUDIT_RETENTION_DAYS: i64 = 90;

/// Maximum audit buffer size before flush.
const AUDIT_BUFFER_CAPACITY: usize = 100;

// ═══════════════════════════════════════════════════════════
// CoreState — shared by every request handler
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    /// The SQLite file each request-scoped connection opens.
    pub db_path: PathBuf,
    /// Mutation trail, buffered in memory and flushed in batches.
    audit: AuditLogger,
}

impl CoreState {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            audit: AuditLogger::new(),
        }
    }

    /// Open a request-scoped database connection.
    pub fn open_db(&self) -> Result<rusqlite::Connection, DatabaseError> {
        db::open_database(&self.db_path)
    }

    /// Record a mutation in the audit trail. Flushes to the database on
    /// its own once the buffer fills.
    pub fn log_action(
        &self,
        actor: &str,
        action: &str,
        entity: &str,
        entity_id: Option<&str>,
        detail: Option<String>,
    ) {
        let needs_flush = self.audit.log(actor, action, entity, entity_id, detail);
        if needs_flush {
            if let Err(e) = self.flush_and_prune_audit() {
                tracing::warn!("Audit auto-flush failed: {e}");
            }
        }
    }

    /// Buffered entries not yet flushed.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.entries()
    }

    /// Flush the buffer to the database and drop entries past retention.
    pub fn flush_and_prune_audit(&self) -> Result<(), DatabaseError> {
        let conn = self.open_db()?;
        self.audit.flush_to_db(&conn)?;
        if let Err(e) = db::prune_audit_log(&conn, AUDIT_RETENTION_DAYS) {
            tracing::warn!("Failed to prune audit log: {e}");
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Audit logger
// ═══════════════════════════════════════════════════════════

/// In-memory audit buffer. Entries are flushed to SQLite when the buffer
/// reaches capacity, on the boot sweep, and at shutdown.
pub struct AuditLogger {
    buffer: Mutex<Vec<AuditEntry>>,
}

/// A single audit trail entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// "login - name" of the acting user, or "system" for boot tasks.
    pub actor: String,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<String>,
    pub detail: Option<String>,
}

impl AuditLogger {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(Vec::with_capacity(AUDIT_BUFFER_CAPACITY)),
        }
    }

    /// Log one mutation to the in-memory buffer.
    /// Returns `true` once the buffer reaches the flush threshold.
    pub fn log(
        &self,
        actor: &str,
        action: &str,
        entity: &str,
        entity_id: Option<&str>,
        detail: Option<String>,
    ) -> bool {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.push(AuditEntry {
                timestamp: chrono::Utc::now(),
                actor: actor.to_string(),
                action: action.to_string(),
                entity: entity.to_string(),
                entity_id: entity_id.map(str::to_string),
                detail,
            });
            buf.len() >= AUDIT_BUFFER_CAPACITY
        } else {
            false
        }
    }

    /// All buffered entries, preserved in the buffer.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.buffer
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default()
    }

    /// Drain all buffered entries for a flush.
    pub fn drain(&self) -> Vec<AuditEntry> {
        self.buffer
            .lock()
            .map(|mut buf| buf.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.lock().map(|buf| buf.len()).unwrap_or(0)
    }

    /// Flush buffered entries to SQLite. Returns how many were written.
    pub fn flush_to_db(&self, conn: &rusqlite::Connection) -> Result<usize, DatabaseError> {
        let entries = self.drain();
        if entries.is_empty() {
            return Ok(0);
        }

        let rows: Vec<(String, String, String, String, Option<String>, Option<String>)> = entries
            .iter()
            .map(|e| {
                (
                    e.timestamp.to_rfc3339(),
                    e.actor.clone(),
                    e.action.clone(),
                    e.entity.clone(),
                    e.entity_id.clone(),
                    e.detail.clone(),
                )
            })
            .collect();

        let count = rows.len();
        db::insert_audit_entries(conn, &rows)?;

        tracing::debug!(count, "Flushed audit entries to database");
        Ok(count)
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
