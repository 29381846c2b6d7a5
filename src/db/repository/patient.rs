use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::Patient;

/// Insert or replace a patient record. Records are stored whole, one JSON
/// document per row, so a save always carries the full record.
pub fn upsert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let data = serde_json::to_string(patient)?;
    conn.execute(
        "INSERT OR REPLACE INTO patients (id, data) VALUES (?1, ?2)",
        params![patient.id, data],
    )?;
    Ok(())
}

/// Get a patient by ID.
pub fn get_patient(conn: &Connection, id: &str) -> Result<Option<Patient>, DatabaseError> {
    let result = conn.query_row(
        "SELECT data FROM patients WHERE id = ?1",
        params![id],
        |row| row.get::<_, String>(0),
    );
    match result {
        Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// List all patient records, ordered by name.
pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT data FROM patients")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut patients = Vec::new();
    for data in rows {
        patients.push(serde_json::from_str::<Patient>(&data?)?);
    }
    patients.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(patients)
}

/// Delete a patient by ID.
pub fn delete_patient(conn: &Connection, id: &str) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM patients WHERE id = ?1", params![id])?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "patient".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Delete a batch of patients in a single transaction.
/// Returns how many rows were actually removed; IDs with no matching
/// row are skipped, never errors.
pub fn delete_patients(conn: &Connection, ids: &[String]) -> Result<usize, DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    let mut deleted = 0;
    {
        let mut stmt = tx.prepare("DELETE FROM patients WHERE id = ?1")?;
        for id in ids {
            deleted += stmt.execute(params![id])?;
        }
    }
    tx.commit()?;
    Ok(deleted)
}
