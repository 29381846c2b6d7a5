//! Lean monitoring endpoints — the time-in-process stage list.

use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, StaffContext};
use crate::db;
use crate::flow::signature;
use crate::lean::{self, LeanIntake};
use crate::models::LeanPatient;

use super::patients::{BulkIds, RemovedResponse};

/// `GET /api/lean-patients` — every tracked passage.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_staff): Extension<StaffContext>,
) -> Result<Json<Vec<LeanPatient>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(db::list_lean_patients(&conn)?))
}

/// `POST /api/lean-patients` — a new passage (no id) or an in-place
/// stage-stamp save (id present). No version check on these records.
pub async fn save(
    State(ctx): State<ApiContext>,
    Extension(staff): Extension<StaffContext>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<LeanPatient>, ApiError> {
    let conn = ctx.core.open_db()?;

    let saved = if body.get("id").is_some() {
        let record: LeanPatient = serde_json::from_value(body)
            .map_err(|e| ApiError::BadRequest(format!("Registro Lean inválido: {e}")))?;
        let saved = lean::save_lean_patient(&conn, record)?;
        ctx.core.log_action(
            &signature(&staff.profile),
            "save_lean_patient",
            "lean_patient",
            Some(&saved.id),
            None,
        );
        saved
    } else {
        let intake: LeanIntake = serde_json::from_value(body)
            .map_err(|e| ApiError::BadRequest(format!("Ficha Lean inválida: {e}")))?;
        let registered = lean::register_lean_patient(&conn, intake)?;
        ctx.core.log_action(
            &signature(&staff.profile),
            "register_lean_patient",
            "lean_patient",
            Some(&registered.id),
            None,
        );
        registered
    };

    Ok(Json(saved))
}

/// `DELETE /api/lean-patients/:id` — prune one passage. Open to every
/// role; the stage list cleans up after itself.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(staff): Extension<StaffContext>,
    Path(id): Path<String>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    lean::remove_lean_patient(&conn, &id)?;

    ctx.core.log_action(
        &signature(&staff.profile),
        "delete_lean_patient",
        "lean_patient",
        Some(&id),
        None,
    );

    Ok(Json(RemovedResponse { removed: 1 }))
}

/// `POST /api/lean-patients/bulk-delete` — supervisor batch removal in
/// one transaction.
pub async fn bulk_delete(
    State(ctx): State<ApiContext>,
    Extension(staff): Extension<StaffContext>,
    Json(body): Json<BulkIds>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let removed = lean::remove_lean_patients(&conn, &staff.profile, &body.ids)?;

    ctx.core.log_action(
        &signature(&staff.profile),
        "bulk_delete_lean_patients",
        "lean_patient",
        None,
        Some(format!("removed {removed} of {} selected", body.ids.len())),
    );

    Ok(Json(RemovedResponse { removed }))
}
