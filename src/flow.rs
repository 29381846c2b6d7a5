//! Patient flow — intake, full-record saves, and the board's bulk actions.
//!
//! Every patient write runs through this module so the bookkeeping stays
//! consistent: each stamp is set on the transition that earns it, saves
//! carry an optimistic version check, and authorship is recorded on every
//! write as "login - name".

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::{
    Corridor, DietType, Mobility, Patient, PatientStatus, PendencyType, Sex, Situation, Specialty,
    StaffProfile, VitalSigns,
};

// ═══════════════════════════════════════════════════════════
// Errors — messages are shown verbatim on the ward terminals
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Paciente não encontrado.")]
    PatientNotFound,

    #[error("O registro foi alterado por outra pessoa enquanto você editava. Recarregue a lista e tente novamente.")]
    StaleVersion { current: Box<Patient> },

    #[error("Por favor, informe o destino da transferência.")]
    MissingDestination,

    #[error("O paciente {name} possui pendência de Aguardando Assistente Social. É necessário concluir esta pendência antes de finalizar a alta física.")]
    SocialWorkPendency { name: String },

    #[error("ACESSO NEGADO: Esta operação exige um perfil com mais permissões.")]
    Forbidden,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Authorship string recorded on every write, as the board displays it.
pub fn signature(actor: &StaffProfile) -> String {
    format!("{} - {}", actor.login, actor.name)
}

/// Discharge, mark-viewed and deletion are for nurses and coordination;
/// technicians work the board read-write but cannot use the bulk paths.
fn require_supervisor(actor: &StaffProfile) -> Result<(), FlowError> {
    if actor.is_supervisor() {
        Ok(())
    } else {
        Err(FlowError::Forbidden)
    }
}

// ═══════════════════════════════════════════════════════════
// Intake
// ═══════════════════════════════════════════════════════════

/// What the admission form submits. Identity, authorship, version and
/// every bookkeeping stamp are assigned here, never by the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientIntake {
    pub name: String,
    #[serde(default)]
    pub social_name: Option<String>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub age: Option<u16>,
    pub medical_record: String,
    pub corridor: Corridor,
    pub specialty: Specialty,
    pub status: PatientStatus,
    #[serde(default, rename = "hasAIH")]
    pub has_aih: bool,
    pub pendencies: PendencyType,
    #[serde(default)]
    pub diagnosis: String,
    pub mobility: Mobility,
    #[serde(default)]
    pub has_allergy: bool,
    #[serde(default)]
    pub allergy_details: String,
    #[serde(default)]
    pub venous_access: String,
    #[serde(default)]
    pub venous_access_date: Option<NaiveDate>,
    #[serde(default)]
    pub has_prescription: bool,
    #[serde(default)]
    pub diet: Vec<DietType>,
    #[serde(default)]
    pub disabilities: Option<Vec<String>>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub vitals: Option<VitalSigns>,
    #[serde(default)]
    pub has_bracelet: bool,
    #[serde(default)]
    pub has_bed_identification: bool,
    pub situation: Situation,
    #[serde(default)]
    pub has_lesion: bool,
    #[serde(default)]
    pub lesion_description: String,
}

/// Admit a patient. A record admitted directly on a transfer status opens
/// its transfer request on the spot, with the sector taken from the status
/// and a placeholder bed ("UPA", or "AGUARDANDO" for external) until one
/// is assigned.
pub fn admit_patient(
    conn: &Connection,
    actor: &StaffProfile,
    intake: PatientIntake,
) -> Result<Patient, FlowError> {
    let now = Utc::now();
    let is_upa = intake.status == PatientStatus::TransferenciaUpa;
    let is_external = intake.status == PatientStatus::TransferenciaExterna;
    let auto_transfer = is_upa || is_external;
    let signed = signature(actor);

    let destination_sector = auto_transfer.then(|| intake.status.as_str().to_string());
    let destination_bed = if is_upa {
        Some("UPA".to_string())
    } else if is_external {
        Some("AGUARDANDO".to_string())
    } else {
        None
    };
    let resolved_at = (intake.pendencies == PendencyType::Nenhuma).then_some(now);

    let patient = Patient {
        id: Uuid::new_v4().to_string(),
        name: intake.name,
        social_name: intake.social_name,
        sex: intake.sex,
        age: intake.age,
        medical_record: intake.medical_record,
        corridor: intake.corridor,
        specialty: intake.specialty,
        status: intake.status,
        has_aih: intake.has_aih,
        pendencies: intake.pendencies,
        diagnosis: intake.diagnosis,
        mobility: intake.mobility,
        has_allergy: intake.has_allergy,
        allergy_details: intake.allergy_details,
        venous_access: intake.venous_access,
        venous_access_date: intake.venous_access_date,
        has_prescription: intake.has_prescription,
        diet: intake.diet,
        disabilities: intake.disabilities,
        notes: intake.notes,
        vitals: intake.vitals,
        has_bracelet: intake.has_bracelet,
        has_bed_identification: intake.has_bed_identification,
        situation: intake.situation,
        has_lesion: intake.has_lesion,
        lesion_description: intake.lesion_description,
        is_transfer_requested: auto_transfer,
        transfer_destination_sector: destination_sector,
        transfer_destination_bed: destination_bed,
        is_transferred: false,
        transfer_requested_at: auto_transfer.then_some(now),
        upa_transfer_requested_at: is_upa.then_some(now),
        external_transfer_requested_at: is_external.then_some(now),
        pendencies_resolved_at: resolved_at,
        transferred_at: None,
        is_new: true,
        created_at: now,
        created_by: signed.clone(),
        last_modified_by: signed,
        version: 1,
    };
    db::upsert_patient(conn, &patient)?;
    Ok(patient)
}

// ═══════════════════════════════════════════════════════════
// Full-record saves
// ═══════════════════════════════════════════════════════════

/// Save an edited record, presented with the version the editor read.
///
/// A version mismatch means someone else saved in between: nothing is
/// written and the error carries the current record so the editor can
/// reload. Stamps fire on the transition this save performs and only
/// then — a record already at "Nenhuma" keeps its resolution stamp on
/// later saves, and cancelling a transfer request retains every stamp
/// already earned.
pub fn save_patient(
    conn: &Connection,
    actor: &StaffProfile,
    mut incoming: Patient,
) -> Result<Patient, FlowError> {
    let Some(stored) = db::get_patient(conn, &incoming.id)? else {
        return Err(FlowError::PatientNotFound);
    };
    if incoming.version != stored.version {
        return Err(FlowError::StaleVersion {
            current: Box::new(stored),
        });
    }

    apply_transition_rules(&stored, &mut incoming, Utc::now())?;
    incoming.last_modified_by = signature(actor);
    incoming.version = stored.version + 1;
    db::upsert_patient(conn, &incoming)?;
    Ok(incoming)
}

/// The field-diff bookkeeping: compare the stored record with the incoming
/// one and stamp each transition exactly once. Finalizing an external
/// transfer additionally requires a destination, stored uppercase.
fn apply_transition_rules(
    stored: &Patient,
    incoming: &mut Patient,
    now: DateTime<Utc>,
) -> Result<(), FlowError> {
    if stored.pendencies != PendencyType::Nenhuma && incoming.pendencies == PendencyType::Nenhuma {
        incoming.pendencies_resolved_at = Some(now);
    }
    if !stored.is_transfer_requested && incoming.is_transfer_requested {
        incoming.transfer_requested_at = Some(now);
    }
    if stored.status != PatientStatus::TransferenciaUpa
        && incoming.status == PatientStatus::TransferenciaUpa
    {
        incoming.upa_transfer_requested_at = Some(now);
    }
    if stored.status != PatientStatus::TransferenciaExterna
        && incoming.status == PatientStatus::TransferenciaExterna
    {
        incoming.external_transfer_requested_at = Some(now);
    }
    if !stored.is_transferred && incoming.is_transferred {
        if incoming.status == PatientStatus::TransferenciaExterna {
            let destination = incoming
                .transfer_destination_bed
                .as_deref()
                .map(str::trim)
                .unwrap_or("");
            if destination.is_empty() {
                return Err(FlowError::MissingDestination);
            }
            incoming.transfer_destination_bed = Some(destination.to_uppercase());
        }
        incoming.transferred_at = Some(now);
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Bulk actions
// ═══════════════════════════════════════════════════════════

/// The partial shape the bulk path accepts: only the fields the board's
/// bulk actions touch. Anything richer goes through [`save_patient`] so
/// the transition stamps stay truthful.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatientUpdate {
    #[serde(default)]
    pub status: Option<PatientStatus>,
    #[serde(default)]
    pub is_transferred: Option<bool>,
    #[serde(default)]
    pub transferred_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_new: Option<bool>,
}

/// Apply a partial update to a batch of records — the discharge and
/// mark-viewed actions. Merges the fields present, keeps authorship and
/// version bookkeeping, and deliberately skips the transition stamps:
/// the bulk caller supplies any timestamp it wants recorded. Ids with no
/// matching record are skipped.
///
/// A discharge (anything setting `isTransferred`) is refused outright
/// while any selected patient still waits on the social worker.
pub fn update_patients(
    conn: &Connection,
    actor: &StaffProfile,
    ids: &[String],
    update: &PatientUpdate,
) -> Result<Vec<Patient>, FlowError> {
    require_supervisor(actor)?;

    let mut selected = Vec::new();
    for id in ids {
        if let Some(patient) = db::get_patient(conn, id)? {
            selected.push(patient);
        }
    }

    if update.is_transferred == Some(true) {
        if let Some(waiting) = selected
            .iter()
            .find(|p| p.pendencies == PendencyType::AguardandoAssistenteSocial)
        {
            return Err(FlowError::SocialWorkPendency {
                name: waiting.name.clone(),
            });
        }
    }

    let signed = signature(actor);
    let mut updated = Vec::with_capacity(selected.len());
    for mut patient in selected {
        if let Some(status) = &update.status {
            patient.status = status.clone();
        }
        if let Some(flag) = update.is_transferred {
            patient.is_transferred = flag;
        }
        if let Some(at) = update.transferred_at {
            patient.transferred_at = Some(at);
        }
        if let Some(flag) = update.is_new {
            patient.is_new = flag;
        }
        patient.last_modified_by = signed.clone();
        patient.version += 1;
        db::upsert_patient(conn, &patient)?;
        updated.push(patient);
    }
    Ok(updated)
}

// ═══════════════════════════════════════════════════════════
// Removal
// ═══════════════════════════════════════════════════════════

/// Delete one record outright.
pub fn remove_patient(
    conn: &Connection,
    actor: &StaffProfile,
    id: &str,
) -> Result<(), FlowError> {
    require_supervisor(actor)?;
    match db::delete_patient(conn, id) {
        Err(DatabaseError::NotFound { .. }) => Err(FlowError::PatientNotFound),
        other => Ok(other?),
    }
}

/// Delete a batch in a single transaction. Returns how many records
/// actually existed; unknown ids are skipped.
pub fn remove_patients(
    conn: &Connection,
    actor: &StaffProfile,
    ids: &[String],
) -> Result<usize, FlowError> {
    require_supervisor(actor)?;
    Ok(db::delete_patients(conn, ids)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::patient::tests::sample_patient;
    use crate::models::Role;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn nurse() -> StaffProfile {
        StaffProfile {
            id: "n-1".into(),
            name: "Enfermeira Clara".into(),
            login: "2211".into(),
            role: Role::Enfermeiro,
            failed_attempts: 0,
            is_blocked: false,
            is_deleted: false,
        }
    }

    fn technician() -> StaffProfile {
        StaffProfile {
            id: "t-1".into(),
            name: "Técnico Exemplo".into(),
            login: "456".into(),
            role: Role::Tecnico,
            failed_attempts: 0,
            is_blocked: false,
            is_deleted: false,
        }
    }

    fn intake(name: &str, status: PatientStatus, pendencies: PendencyType) -> PatientIntake {
        PatientIntake {
            name: name.into(),
            social_name: None,
            sex: Some(Sex::Feminino),
            age: Some(40),
            medical_record: "900123".into(),
            corridor: Corridor::Principal,
            specialty: Specialty::ClinicaMedica,
            status,
            has_aih: false,
            pendencies,
            diagnosis: String::new(),
            mobility: Mobility::Deambula,
            has_allergy: false,
            allergy_details: String::new(),
            venous_access: String::new(),
            venous_access_date: None,
            has_prescription: true,
            diet: vec![],
            disabilities: None,
            notes: String::new(),
            vitals: None,
            has_bracelet: true,
            has_bed_identification: true,
            situation: Situation::Maca,
            has_lesion: false,
            lesion_description: String::new(),
        }
    }

    fn discharge() -> PatientUpdate {
        PatientUpdate {
            status: Some(PatientStatus::Alta),
            is_transferred: Some(true),
            transferred_at: Some(Utc::now()),
            is_new: None,
        }
    }

    #[test]
    fn intake_assigns_identity_and_authorship() {
        let conn = test_db();
        let p = admit_patient(
            &conn,
            &nurse(),
            intake("ANA", PatientStatus::Internado, PendencyType::Nenhuma),
        )
        .unwrap();

        assert!(Uuid::parse_str(&p.id).is_ok());
        assert_eq!(p.version, 1);
        assert!(p.is_new);
        assert!(!p.is_transferred);
        assert_eq!(p.created_by, "2211 - Enfermeira Clara");
        assert_eq!(p.last_modified_by, p.created_by);
        assert!(db::get_patient(&conn, &p.id).unwrap().is_some());
    }

    #[test]
    fn intake_without_pendency_is_born_resolved() {
        let conn = test_db();
        let clear = admit_patient(
            &conn,
            &nurse(),
            intake("ANA", PatientStatus::Internado, PendencyType::Nenhuma),
        )
        .unwrap();
        assert!(clear.pendencies_resolved_at.is_some());

        let open = admit_patient(
            &conn,
            &nurse(),
            intake("BRUNO", PatientStatus::Internado, PendencyType::SemDieta),
        )
        .unwrap();
        assert!(open.pendencies_resolved_at.is_none());
    }

    #[test]
    fn upa_intake_opens_a_transfer_request() {
        let conn = test_db();
        let p = admit_patient(
            &conn,
            &nurse(),
            intake("ANA", PatientStatus::TransferenciaUpa, PendencyType::Nenhuma),
        )
        .unwrap();

        assert!(p.is_transfer_requested);
        assert!(p.transfer_requested_at.is_some());
        assert!(p.upa_transfer_requested_at.is_some());
        assert!(p.external_transfer_requested_at.is_none());
        assert_eq!(
            p.transfer_destination_sector.as_deref(),
            Some("Transferência UPA")
        );
        assert_eq!(p.transfer_destination_bed.as_deref(), Some("UPA"));
    }

    #[test]
    fn external_intake_waits_for_a_bed() {
        let conn = test_db();
        let p = admit_patient(
            &conn,
            &nurse(),
            intake(
                "ANA",
                PatientStatus::TransferenciaExterna,
                PendencyType::Nenhuma,
            ),
        )
        .unwrap();

        assert!(p.is_transfer_requested);
        assert!(p.external_transfer_requested_at.is_some());
        assert!(p.upa_transfer_requested_at.is_none());
        assert_eq!(
            p.transfer_destination_sector.as_deref(),
            Some("Transferência Externa")
        );
        assert_eq!(p.transfer_destination_bed.as_deref(), Some("AGUARDANDO"));
    }

    #[test]
    fn plain_intake_requests_nothing() {
        let conn = test_db();
        let p = admit_patient(
            &conn,
            &nurse(),
            intake("ANA", PatientStatus::Observacao, PendencyType::Nenhuma),
        )
        .unwrap();

        assert!(!p.is_transfer_requested);
        assert!(p.transfer_requested_at.is_none());
        assert!(p.transfer_destination_sector.is_none());
        assert!(p.transfer_destination_bed.is_none());
    }

    #[test]
    fn save_bumps_version_and_signature() {
        let conn = test_db();
        let p = admit_patient(
            &conn,
            &nurse(),
            intake("ANA", PatientStatus::Internado, PendencyType::SemDieta),
        )
        .unwrap();

        let mut edit = p.clone();
        edit.diagnosis = "Pneumonia".into();
        let saved = save_patient(&conn, &technician(), edit).unwrap();

        assert_eq!(saved.version, 2);
        assert_eq!(saved.last_modified_by, "456 - Técnico Exemplo");
        let stored = db::get_patient(&conn, &p.id).unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.diagnosis, "Pneumonia");
    }

    #[test]
    fn stale_save_is_rejected_without_writing() {
        let conn = test_db();
        let p = admit_patient(
            &conn,
            &nurse(),
            intake("ANA", PatientStatus::Internado, PendencyType::Nenhuma),
        )
        .unwrap();
        let id = p.id.clone();

        let mut first = p.clone();
        first.notes = "primeiro".into();
        save_patient(&conn, &nurse(), first).unwrap();

        let mut stale = p;
        stale.notes = "segundo".into();
        match save_patient(&conn, &nurse(), stale).unwrap_err() {
            FlowError::StaleVersion { current } => {
                assert_eq!(current.version, 2);
                assert_eq!(current.notes, "primeiro");
            }
            other => panic!("unexpected error: {other}"),
        }

        let kept = db::get_patient(&conn, &id).unwrap().unwrap();
        assert_eq!(kept.notes, "primeiro");
        assert_eq!(kept.version, 2);
    }

    #[test]
    fn unknown_record_save_is_refused() {
        let conn = test_db();
        let result = save_patient(&conn, &nurse(), sample_patient());
        assert!(matches!(result, Err(FlowError::PatientNotFound)));
    }

    #[test]
    fn resolving_a_pendency_stamps_resolution_once() {
        let conn = test_db();
        let p = admit_patient(
            &conn,
            &nurse(),
            intake(
                "ANA",
                PatientStatus::Internado,
                PendencyType::AguardandoTomografia,
            ),
        )
        .unwrap();
        assert!(p.pendencies_resolved_at.is_none());

        let mut resolve = p.clone();
        resolve.pendencies = PendencyType::Nenhuma;
        let resolved = save_patient(&conn, &nurse(), resolve).unwrap();
        let stamp = resolved.pendencies_resolved_at.expect("transition stamps");

        // a later save already at "Nenhuma" keeps the original stamp
        let mut touch = resolved.clone();
        touch.notes = "revisado".into();
        let touched = save_patient(&conn, &nurse(), touch).unwrap();
        assert_eq!(touched.pendencies_resolved_at, Some(stamp));

        // reopening keeps the old stamp; resolving again earns a new one
        let mut reopen = touched.clone();
        reopen.pendencies = PendencyType::SemDieta;
        let reopened = save_patient(&conn, &nurse(), reopen).unwrap();
        assert_eq!(reopened.pendencies_resolved_at, Some(stamp));

        let mut again = reopened.clone();
        again.pendencies = PendencyType::Nenhuma;
        let again = save_patient(&conn, &nurse(), again).unwrap();
        assert!(again.pendencies_resolved_at.unwrap() > stamp);
    }

    #[test]
    fn requesting_a_transfer_stamps_the_clock() {
        let conn = test_db();
        let p = admit_patient(
            &conn,
            &nurse(),
            intake("ANA", PatientStatus::Internado, PendencyType::Nenhuma),
        )
        .unwrap();

        let mut request = p.clone();
        request.is_transfer_requested = true;
        request.transfer_destination_sector = Some("UTI".into());
        let requested = save_patient(&conn, &nurse(), request).unwrap();
        let stamp = requested.transfer_requested_at.expect("transition stamps");

        // the flag staying on does not move the clock
        let mut touch = requested.clone();
        touch.notes = "aguardando vaga".into();
        let touched = save_patient(&conn, &nurse(), touch).unwrap();
        assert_eq!(touched.transfer_requested_at, Some(stamp));
    }

    #[test]
    fn status_moves_stamp_their_own_clocks() {
        let conn = test_db();
        let p = admit_patient(
            &conn,
            &nurse(),
            intake("ANA", PatientStatus::Internado, PendencyType::Nenhuma),
        )
        .unwrap();

        let mut to_upa = p.clone();
        to_upa.status = PatientStatus::TransferenciaUpa;
        to_upa.is_transfer_requested = true;
        let upa = save_patient(&conn, &nurse(), to_upa).unwrap();
        assert!(upa.upa_transfer_requested_at.is_some());
        assert!(upa.external_transfer_requested_at.is_none());

        let mut to_external = upa.clone();
        to_external.status = PatientStatus::TransferenciaExterna;
        let external = save_patient(&conn, &nurse(), to_external).unwrap();
        assert!(external.external_transfer_requested_at.is_some());
        assert!(external.upa_transfer_requested_at.is_some());
    }

    #[test]
    fn finalizing_stamps_the_transfer_time() {
        let conn = test_db();
        let p = admit_patient(
            &conn,
            &nurse(),
            intake("ANA", PatientStatus::TransferenciaUpa, PendencyType::Nenhuma),
        )
        .unwrap();

        let mut finish = p.clone();
        finish.is_transferred = true;
        let done = save_patient(&conn, &nurse(), finish).unwrap();

        assert!(done.transferred_at.is_some());
        assert!(!done.is_active());
    }

    #[test]
    fn external_finalize_requires_a_destination() {
        let conn = test_db();
        let p = admit_patient(
            &conn,
            &nurse(),
            intake(
                "ANA",
                PatientStatus::TransferenciaExterna,
                PendencyType::Nenhuma,
            ),
        )
        .unwrap();
        let id = p.id.clone();

        let mut blank = p.clone();
        blank.is_transferred = true;
        blank.transfer_destination_bed = Some("   ".into());
        let err = save_patient(&conn, &nurse(), blank).unwrap_err();
        assert!(matches!(err, FlowError::MissingDestination));
        assert_eq!(db::get_patient(&conn, &id).unwrap().unwrap().version, 1);

        let mut finish = p;
        finish.is_transferred = true;
        finish.transfer_destination_bed = Some("hospital geral".into());
        let done = save_patient(&conn, &nurse(), finish).unwrap();
        assert_eq!(
            done.transfer_destination_bed.as_deref(),
            Some("HOSPITAL GERAL")
        );
        assert!(done.transferred_at.is_some());
    }

    #[test]
    fn cancelling_keeps_the_stamps() {
        let conn = test_db();
        let p = admit_patient(
            &conn,
            &nurse(),
            intake("ANA", PatientStatus::TransferenciaUpa, PendencyType::Nenhuma),
        )
        .unwrap();

        let mut cancel = p.clone();
        cancel.is_transfer_requested = false;
        let cancelled = save_patient(&conn, &nurse(), cancel).unwrap();

        assert!(!cancelled.is_transfer_requested);
        assert_eq!(cancelled.transfer_requested_at, p.transfer_requested_at);
        assert_eq!(
            cancelled.upa_transfer_requested_at,
            p.upa_transfer_requested_at
        );
    }

    #[test]
    fn bulk_update_merges_without_stamping() {
        let conn = test_db();
        let p = admit_patient(
            &conn,
            &nurse(),
            intake("ANA", PatientStatus::Internado, PendencyType::Nenhuma),
        )
        .unwrap();

        let update = PatientUpdate {
            is_transferred: Some(true),
            ..Default::default()
        };
        let updated = update_patients(&conn, &nurse(), &[p.id.clone()], &update).unwrap();

        assert_eq!(updated.len(), 1);
        assert!(updated[0].is_transferred);
        assert!(updated[0].transferred_at.is_none());
        assert_eq!(updated[0].version, 2);
        assert_eq!(updated[0].last_modified_by, "2211 - Enfermeira Clara");
    }

    #[test]
    fn discharge_archives_the_selected_records() {
        let conn = test_db();
        let a = admit_patient(
            &conn,
            &nurse(),
            intake("ANA", PatientStatus::Internado, PendencyType::Nenhuma),
        )
        .unwrap();
        let b = admit_patient(
            &conn,
            &nurse(),
            intake("BRUNO", PatientStatus::Observacao, PendencyType::Nenhuma),
        )
        .unwrap();

        let update = discharge();
        let ids = vec![a.id, b.id, "ghost".to_string()];
        let updated = update_patients(&conn, &nurse(), &ids, &update).unwrap();

        assert_eq!(updated.len(), 2);
        for p in &updated {
            assert_eq!(p.status, PatientStatus::Alta);
            assert!(p.is_transferred);
            assert_eq!(p.transferred_at, update.transferred_at);
        }
    }

    #[test]
    fn discharge_waits_for_the_social_worker() {
        let conn = test_db();
        let a = admit_patient(
            &conn,
            &nurse(),
            intake(
                "ANA",
                PatientStatus::Internado,
                PendencyType::AguardandoAssistenteSocial,
            ),
        )
        .unwrap();
        let b = admit_patient(
            &conn,
            &nurse(),
            intake("BRUNO", PatientStatus::Internado, PendencyType::Nenhuma),
        )
        .unwrap();

        let ids = vec![a.id, b.id.clone()];
        match update_patients(&conn, &nurse(), &ids, &discharge()).unwrap_err() {
            FlowError::SocialWorkPendency { name } => assert_eq!(name, "ANA"),
            other => panic!("unexpected error: {other}"),
        }

        // the batch is refused whole; the clear patient stays untouched
        let kept = db::get_patient(&conn, &b.id).unwrap().unwrap();
        assert!(!kept.is_transferred);
        assert_eq!(kept.version, 1);
    }

    #[test]
    fn mark_viewed_clears_the_flag() {
        let conn = test_db();
        let p = admit_patient(
            &conn,
            &nurse(),
            intake("ANA", PatientStatus::Internado, PendencyType::Nenhuma),
        )
        .unwrap();
        assert!(p.is_new);

        let update = PatientUpdate {
            is_new: Some(false),
            ..Default::default()
        };
        let updated = update_patients(&conn, &nurse(), &[p.id], &update).unwrap();
        assert!(!updated[0].is_new);
    }

    #[test]
    fn technicians_cannot_use_the_bulk_paths() {
        let conn = test_db();
        let p = admit_patient(
            &conn,
            &technician(),
            intake("ANA", PatientStatus::Internado, PendencyType::Nenhuma),
        )
        .unwrap();

        let update = PatientUpdate {
            is_new: Some(false),
            ..Default::default()
        };
        assert!(matches!(
            update_patients(&conn, &technician(), &[p.id.clone()], &update),
            Err(FlowError::Forbidden)
        ));
        assert!(matches!(
            remove_patient(&conn, &technician(), &p.id),
            Err(FlowError::Forbidden)
        ));
        assert!(matches!(
            remove_patients(&conn, &technician(), &[p.id.clone()]),
            Err(FlowError::Forbidden)
        ));
        assert!(db::get_patient(&conn, &p.id).unwrap().is_some());
    }

    #[test]
    fn removal_takes_exactly_the_given_set() {
        let conn = test_db();
        let a = admit_patient(
            &conn,
            &nurse(),
            intake("ANA", PatientStatus::Internado, PendencyType::Nenhuma),
        )
        .unwrap();
        let _b = admit_patient(
            &conn,
            &nurse(),
            intake("BRUNO", PatientStatus::Internado, PendencyType::Nenhuma),
        )
        .unwrap();
        let c = admit_patient(
            &conn,
            &nurse(),
            intake("CARLOS", PatientStatus::Internado, PendencyType::Nenhuma),
        )
        .unwrap();

        let removed = remove_patients(&conn, &nurse(), &[a.id, c.id]).unwrap();
        assert_eq!(removed, 2);

        let remaining = db::list_patients(&conn).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "BRUNO");

        assert!(matches!(
            remove_patient(&conn, &nurse(), "ghost"),
            Err(FlowError::PatientNotFound)
        ));
    }
}
