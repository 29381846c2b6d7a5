//! Ward occupancy dashboard.

use axum::extract::State;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, StaffContext};
use crate::census::{self, WardCensus};
use crate::db;

/// `GET /api/census` — occupancy, pendency and bottleneck aggregates
/// over the active board.
pub async fn snapshot(
    State(ctx): State<ApiContext>,
    Extension(_staff): Extension<StaffContext>,
) -> Result<Json<WardCensus>, ApiError> {
    let conn = ctx.core.open_db()?;
    let patients = db::list_patients(&conn)?;
    Ok(Json(census::ward_census(&patients)))
}
