use rusqlite::{params, Connection};

use crate::db::DatabaseError;

/// Insert a batch of audit entries into the audit_log table.
/// Tuples are (timestamp, actor, action, entity, entity_id, detail).
pub fn insert_audit_entries(
    conn: &Connection,
    entries: &[(String, String, String, String, Option<String>, Option<String>)],
) -> Result<(), DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO audit_log (timestamp, actor, action, entity, entity_id, detail)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for (timestamp, actor, action, entity, entity_id, detail) in entries {
        stmt.execute(params![timestamp, actor, action, entity, entity_id, detail])?;
    }
    Ok(())
}

/// Prune audit entries older than the given number of days.
pub fn prune_audit_log(conn: &Connection, retention_days: i64) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM audit_log WHERE timestamp < datetime('now', ?1)",
        params![format!("-{retention_days} days")],
    )?;
    Ok(deleted)
}

/// Query the trail for one record within the last N days, newest first.
/// Returns (timestamp, actor, action, detail) tuples.
pub fn query_audit_by_entity(
    conn: &Connection,
    entity: &str,
    entity_id: &str,
    days: i64,
) -> Result<Vec<(String, String, String, Option<String>)>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT timestamp, actor, action, detail FROM audit_log
         WHERE entity = ?1 AND entity_id = ?2 AND timestamp >= datetime('now', ?3)
         ORDER BY timestamp DESC",
    )?;
    let rows = stmt
        .query_map(params![entity, entity_id, format!("-{days} days")], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn entry(
        timestamp: &str,
        action: &str,
        entity_id: &str,
    ) -> (String, String, String, String, Option<String>, Option<String>) {
        (
            timestamp.into(),
            "5669 - MA Desenvolvedor".into(),
            action.into(),
            "patient".into(),
            Some(entity_id.into()),
            None,
        )
    }

    #[test]
    fn insert_batch_persists_all_rows() {
        let conn = test_db();
        insert_audit_entries(
            &conn,
            &[
                entry("2026-03-10 08:00:00", "create", "p-1"),
                entry("2026-03-10 08:05:00", "update", "p-1"),
            ],
        )
        .unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM audit_log", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn query_by_entity_is_newest_first() {
        let conn = test_db();
        let now = chrono::Utc::now();
        let earlier = (now - chrono::Duration::hours(1))
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        let later = now.format("%Y-%m-%d %H:%M:%S").to_string();
        insert_audit_entries(
            &conn,
            &[
                entry(&earlier, "create", "p-1"),
                entry(&later, "update", "p-1"),
                entry(&later, "update", "p-2"),
            ],
        )
        .unwrap();

        let trail = query_audit_by_entity(&conn, "patient", "p-1", 7).unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].2, "update");
        assert_eq!(trail[1].2, "create");
    }

    #[test]
    fn prune_drops_only_old_entries() {
        let conn = test_db();
        let now = chrono::Utc::now();
        let stale = (now - chrono::Duration::days(120))
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        let fresh = now.format("%Y-%m-%d %H:%M:%S").to_string();
        insert_audit_entries(
            &conn,
            &[entry(&stale, "create", "p-1"), entry(&fresh, "update", "p-1")],
        )
        .unwrap();

        let pruned = prune_audit_log(&conn, 90).unwrap();
        assert_eq!(pruned, 1);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM audit_log", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
