//! Patient record endpoints — the corridor board.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, StaffContext};
use crate::db;
use crate::flow::{self, signature, PatientIntake, PatientUpdate};
use crate::models::Patient;

/// Batch payload for the bulk routes.
#[derive(Deserialize)]
pub struct BulkIds {
    pub ids: Vec<String>,
}

#[derive(Deserialize)]
pub struct BulkUpdateRequest {
    pub ids: Vec<String>,
    pub updates: PatientUpdate,
}

#[derive(Serialize)]
pub struct RemovedResponse {
    pub removed: usize,
}

/// `GET /api/patients` — every record, active and archived, ordered by
/// name. The terminals filter views client-side.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_staff): Extension<StaffContext>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(db::list_patients(&conn)?))
}

/// `POST /api/patients` — an intake form (no id) admits a new patient; a
/// full record (id + version) is an edit-screen save, checked against the
/// stored version.
pub async fn save(
    State(ctx): State<ApiContext>,
    Extension(staff): Extension<StaffContext>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Patient>, ApiError> {
    let conn = ctx.core.open_db()?;
    let actor = &staff.profile;

    let saved = if body.get("id").is_some() {
        let record: Patient = serde_json::from_value(body)
            .map_err(|e| ApiError::BadRequest(format!("Registro de paciente inválido: {e}")))?;
        let saved = flow::save_patient(&conn, actor, record)?;
        ctx.core.log_action(
            &signature(actor),
            "save_patient",
            "patient",
            Some(&saved.id),
            None,
        );
        saved
    } else {
        let intake: PatientIntake = serde_json::from_value(body)
            .map_err(|e| ApiError::BadRequest(format!("Ficha de admissão inválida: {e}")))?;
        let admitted = flow::admit_patient(&conn, actor, intake)?;
        ctx.core.log_action(
            &signature(actor),
            "admit_patient",
            "patient",
            Some(&admitted.id),
            None,
        );
        admitted
    };

    Ok(Json(saved))
}

/// `DELETE /api/patients/:id` — supervisor removal of a single record.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(staff): Extension<StaffContext>,
    Path(id): Path<String>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    flow::remove_patient(&conn, &staff.profile, &id)?;

    ctx.core.log_action(
        &signature(&staff.profile),
        "delete_patient",
        "patient",
        Some(&id),
        None,
    );

    Ok(Json(RemovedResponse { removed: 1 }))
}

/// `POST /api/patients/bulk-delete` — remove a selection in one
/// transaction. Unknown ids are skipped, not errors.
pub async fn bulk_delete(
    State(ctx): State<ApiContext>,
    Extension(staff): Extension<StaffContext>,
    Json(body): Json<BulkIds>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let removed = flow::remove_patients(&conn, &staff.profile, &body.ids)?;

    ctx.core.log_action(
        &signature(&staff.profile),
        "bulk_delete_patients",
        "patient",
        None,
        Some(format!("removed {removed} of {} selected", body.ids.len())),
    );

    Ok(Json(RemovedResponse { removed }))
}

/// `POST /api/patients/bulk-update` — merge the same partial update into
/// a selection (bulk discharge, mark-viewed). No transition stamping on
/// this path.
pub async fn bulk_update(
    State(ctx): State<ApiContext>,
    Extension(staff): Extension<StaffContext>,
    Json(body): Json<BulkUpdateRequest>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let updated = flow::update_patients(&conn, &staff.profile, &body.ids, &body.updates)?;

    ctx.core.log_action(
        &signature(&staff.profile),
        "bulk_update_patients",
        "patient",
        None,
        Some(format!("{} records", updated.len())),
    );

    Ok(Json(updated))
}
