use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::LeanPatient;

/// Insert or replace a flow-timing record.
pub fn upsert_lean_patient(
    conn: &Connection,
    patient: &LeanPatient,
) -> Result<(), DatabaseError> {
    let data = serde_json::to_string(patient)?;
    conn.execute(
        "INSERT OR REPLACE INTO lean_patients (id, data) VALUES (?1, ?2)",
        params![patient.id, data],
    )?;
    Ok(())
}

/// Get a flow-timing record by ID.
pub fn get_lean_patient(
    conn: &Connection,
    id: &str,
) -> Result<Option<LeanPatient>, DatabaseError> {
    let result = conn.query_row(
        "SELECT data FROM lean_patients WHERE id = ?1",
        params![id],
        |row| row.get::<_, String>(0),
    );
    match result {
        Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// List all flow-timing records in arrival order.
pub fn list_lean_patients(conn: &Connection) -> Result<Vec<LeanPatient>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT data FROM lean_patients")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut patients = Vec::new();
    for data in rows {
        patients.push(serde_json::from_str::<LeanPatient>(&data?)?);
    }
    patients.sort_by_key(|p| p.reception_time);
    Ok(patients)
}

/// Delete a flow-timing record by ID.
pub fn delete_lean_patient(conn: &Connection, id: &str) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM lean_patients WHERE id = ?1", params![id])?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "lean_patient".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Delete a batch of flow-timing records in a single transaction.
/// Returns how many rows were actually removed.
pub fn delete_lean_patients(conn: &Connection, ids: &[String]) -> Result<usize, DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    let mut deleted = 0;
    {
        let mut stmt = tx.prepare("DELETE FROM lean_patients WHERE id = ?1")?;
        for id in ids {
            deleted += stmt.execute(params![id])?;
        }
    }
    tx.commit()?;
    Ok(deleted)
}
