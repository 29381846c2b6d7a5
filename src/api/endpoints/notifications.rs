//! Badge counters and the pendency reminder.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, StaffContext};
use crate::census::{self, BadgeCounts};
use crate::db;

#[derive(Serialize)]
pub struct NotificationsResponse {
    #[serde(flatten)]
    pub counts: BadgeCounts,
    /// Whether this session's role gets the pendency nag. The 30-minute
    /// cadence stays on the terminal.
    pub remind: bool,
}

/// `GET /api/notifications` — badge counters over the active board.
pub async fn badges(
    State(ctx): State<ApiContext>,
    Extension(staff): Extension<StaffContext>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let patients = db::list_patients(&conn)?;

    let counts = census::badge_counts(&patients);
    let remind = census::pendency_reminder(&staff.profile.role, &counts);

    Ok(Json(NotificationsResponse { counts, remind }))
}
