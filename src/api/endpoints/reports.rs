//! Monthly flow report.

use axum::extract::{Query, State};
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, StaffContext};
use crate::census::{self, MonthlyReport};
use crate::db;

#[derive(Deserialize)]
pub struct MonthParams {
    pub month: String,
}

/// `GET /api/reports/monthly?month=YYYY-MM` — aggregates over the
/// patients created in that month.
pub async fn monthly(
    State(ctx): State<ApiContext>,
    Extension(_staff): Extension<StaffContext>,
    Query(params): Query<MonthParams>,
) -> Result<Json<MonthlyReport>, ApiError> {
    // Strict YYYY-MM: chrono alone would admit unpadded months, which
    // could never match a created-at bucket.
    let well_formed = params.month.len() == 7
        && NaiveDate::parse_from_str(&format!("{}-01", params.month), "%Y-%m-%d").is_ok();
    if !well_formed {
        return Err(ApiError::BadRequest(
            "Mês inválido. Use o formato YYYY-MM.".into(),
        ));
    }

    let conn = ctx.core.open_db()?;
    let patients = db::list_patients(&conn)?;
    Ok(Json(census::monthly_report(&patients, &params.month)))
}
