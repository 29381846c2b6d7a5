//! Staff account administration endpoints.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, StaffContext};
use crate::auth;
use crate::flow::signature;
use crate::models::{Role, StaffProfile};

use super::patients::RemovedResponse;

/// Admin mutation accepted by `POST /api/collaborators`: a new account
/// (no id) or one of the sanctioned edits on an existing one. Arbitrary
/// field rewrites are not accepted — the password hash and counters form
/// on the server only.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorUpsert {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub role: Option<Role>,
    /// Put the account back on the default PIN and clear the block.
    #[serde(default)]
    pub reset_password: bool,
    /// Soft delete: hidden from rosters, login refused, row kept.
    #[serde(default)]
    pub is_deleted: bool,
}

/// `GET /api/collaborators` — the staff roster as the caller may see it.
/// Deleted accounts only show up for the master developer.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(staff): Extension<StaffContext>,
) -> Result<Json<Vec<StaffProfile>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(auth::visible_collaborators(&conn, &staff.profile)?))
}

/// `POST /api/collaborators` — create / reset / soft-delete.
pub async fn upsert(
    State(ctx): State<ApiContext>,
    Extension(staff): Extension<StaffContext>,
    Json(body): Json<CollaboratorUpsert>,
) -> Result<Json<StaffProfile>, ApiError> {
    let conn = ctx.core.open_db()?;
    let actor = &staff.profile;

    let result = match body.id {
        None => {
            if body.name.trim().is_empty() {
                return Err(ApiError::BadRequest(
                    "Informe o nome do colaborador.".into(),
                ));
            }
            let role = body.role.ok_or_else(|| {
                ApiError::BadRequest("Informe o perfil do novo colaborador.".into())
            })?;
            let created =
                auth::register_collaborator(&conn, actor, &body.name, &body.login, role)?;
            ctx.core.log_action(
                &signature(actor),
                "register_collaborator",
                "collaborator",
                Some(&created.id),
                Some(format!("login {}", created.login)),
            );
            StaffProfile::from(&created)
        }
        Some(ref id) if body.reset_password => {
            let reset = auth::reset_password(&conn, actor, id)?;
            ctx.core.log_action(
                &signature(actor),
                "reset_password",
                "collaborator",
                Some(id),
                None,
            );
            StaffProfile::from(&reset)
        }
        Some(ref id) if body.is_deleted => {
            let gone = auth::deactivate_collaborator(&conn, actor, id)?;
            ctx.core.log_action(
                &signature(actor),
                "deactivate_collaborator",
                "collaborator",
                Some(id),
                None,
            );
            StaffProfile::from(&gone)
        }
        Some(_) => {
            return Err(ApiError::BadRequest(
                "Nenhuma alteração reconhecida para este colaborador.".into(),
            ))
        }
    };

    Ok(Json(result))
}

/// `DELETE /api/collaborators/:id` — hard removal of an account row.
/// The master developer row (id "1") is always refused.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(staff): Extension<StaffContext>,
    Path(id): Path<String>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    auth::remove_collaborator(&conn, &staff.profile, &id)?;

    ctx.core.log_action(
        &signature(&staff.profile),
        "delete_collaborator",
        "collaborator",
        Some(&id),
        None,
    );

    Ok(Json(RemovedResponse { removed: 1 }))
}
