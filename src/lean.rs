//! Lean monitoring — the parallel time-in-process records kept alongside
//! the main board.
//!
//! These records carry no version counter and no authorship: the stage
//! list is edited as a whole and re-saved, last write wins, exactly like
//! the paper form it replaced. Only bulk deletion is supervised.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::{LeanPatient, LeanSpecialty, StaffProfile};

#[derive(Debug, Error)]
pub enum LeanError {
    #[error("Registro Lean não encontrado.")]
    RecordNotFound,

    #[error("ACESSO NEGADO: Esta operação exige um perfil com mais permissões.")]
    Forbidden,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// What the lean registration form submits. Identity and `createdAt` are
/// assigned on the server; the stage stamps may already be backfilled
/// when the form is caught up after the fact.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeanIntake {
    pub name: String,
    pub age: u16,
    pub medical_record: String,
    pub specialty: LeanSpecialty,
    pub reception_time: DateTime<Utc>,
    #[serde(default)]
    pub triage_start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub md_start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub md_end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lab_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ct_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub xray_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub medication_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reevaluation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub discharge_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hospitalization_time: Option<DateTime<Utc>>,
}

/// Open a new lean passage.
pub fn register_lean_patient(
    conn: &Connection,
    intake: LeanIntake,
) -> Result<LeanPatient, LeanError> {
    let record = LeanPatient {
        id: Uuid::new_v4().to_string(),
        name: intake.name,
        age: intake.age,
        medical_record: intake.medical_record,
        specialty: intake.specialty,
        reception_time: intake.reception_time,
        triage_start_time: intake.triage_start_time,
        md_start_time: intake.md_start_time,
        md_end_time: intake.md_end_time,
        lab_time: intake.lab_time,
        ct_time: intake.ct_time,
        xray_time: intake.xray_time,
        medication_time: intake.medication_time,
        reevaluation_time: intake.reevaluation_time,
        discharge_time: intake.discharge_time,
        hospitalization_time: intake.hospitalization_time,
        created_at: Utc::now(),
    };
    db::upsert_lean_patient(conn, &record)?;
    Ok(record)
}

/// Re-save an edited passage, typically to stamp the stage that just
/// happened. Plain upsert: no version check on these records.
pub fn save_lean_patient(
    conn: &Connection,
    record: LeanPatient,
) -> Result<LeanPatient, LeanError> {
    db::upsert_lean_patient(conn, &record)?;
    Ok(record)
}

/// Remove one passage. The stage list prunes its own entries, so this is
/// open to every role.
pub fn remove_lean_patient(conn: &Connection, id: &str) -> Result<(), LeanError> {
    match db::delete_lean_patient(conn, id) {
        Err(DatabaseError::NotFound { .. }) => Err(LeanError::RecordNotFound),
        other => Ok(other?),
    }
}

/// Remove a batch in a single transaction. Supervisor action.
pub fn remove_lean_patients(
    conn: &Connection,
    actor: &StaffProfile,
    ids: &[String],
) -> Result<usize, LeanError> {
    if !actor.is_supervisor() {
        return Err(LeanError::Forbidden);
    }
    Ok(db::delete_lean_patients(conn, ids)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::Role;
    use chrono::TimeZone;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn staff(role: Role) -> StaffProfile {
        StaffProfile {
            id: "s-1".into(),
            name: "Plantonista".into(),
            login: "3030".into(),
            role,
            failed_attempts: 0,
            is_blocked: false,
            is_deleted: false,
        }
    }

    fn intake(name: &str, hour: u32) -> LeanIntake {
        LeanIntake {
            name: name.into(),
            age: 33,
            medical_record: "445566".into(),
            specialty: LeanSpecialty::Vascular,
            reception_time: Utc.with_ymd_and_hms(2026, 6, 2, hour, 0, 0).unwrap(),
            triage_start_time: None,
            md_start_time: None,
            md_end_time: None,
            lab_time: None,
            ct_time: None,
            xray_time: None,
            medication_time: None,
            reevaluation_time: None,
            discharge_time: None,
            hospitalization_time: None,
        }
    }

    #[test]
    fn register_assigns_identity() {
        let conn = test_db();
        let record = register_lean_patient(&conn, intake("MARIA", 8)).unwrap();

        assert!(Uuid::parse_str(&record.id).is_ok());
        assert_eq!(record.name, "MARIA");
        assert!(record.triage_start_time.is_none());

        let stored = db::get_lean_patient(&conn, &record.id).unwrap().unwrap();
        assert_eq!(stored.reception_time, record.reception_time);
    }

    #[test]
    fn save_stamps_stages_in_place() {
        let conn = test_db();
        let mut record = register_lean_patient(&conn, intake("MARIA", 8)).unwrap();

        record.md_start_time = Some(Utc.with_ymd_and_hms(2026, 6, 2, 8, 40, 0).unwrap());
        save_lean_patient(&conn, record.clone()).unwrap();

        let stored = db::get_lean_patient(&conn, &record.id).unwrap().unwrap();
        assert_eq!(stored.md_start_time, record.md_start_time);
        assert_eq!(stored.wait_for_doctor().unwrap().num_minutes(), 40);
        assert_eq!(db::list_lean_patients(&conn).unwrap().len(), 1);
    }

    #[test]
    fn single_removal_is_open_to_all_roles() {
        let conn = test_db();
        let record = register_lean_patient(&conn, intake("MARIA", 8)).unwrap();

        remove_lean_patient(&conn, &record.id).unwrap();
        assert!(db::list_lean_patients(&conn).unwrap().is_empty());

        assert!(matches!(
            remove_lean_patient(&conn, "ghost"),
            Err(LeanError::RecordNotFound)
        ));
    }

    #[test]
    fn bulk_removal_is_supervised() {
        let conn = test_db();
        let a = register_lean_patient(&conn, intake("MARIA", 8)).unwrap();
        let b = register_lean_patient(&conn, intake("PEDRO", 9)).unwrap();
        let _c = register_lean_patient(&conn, intake("RITA", 10)).unwrap();

        let ids = vec![a.id, b.id];
        assert!(matches!(
            remove_lean_patients(&conn, &staff(Role::Tecnico), &ids),
            Err(LeanError::Forbidden)
        ));
        assert_eq!(db::list_lean_patients(&conn).unwrap().len(), 3);

        let removed = remove_lean_patients(&conn, &staff(Role::Enfermeiro), &ids).unwrap();
        assert_eq!(removed, 2);

        let remaining = db::list_lean_patients(&conn).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "RITA");
    }
}
