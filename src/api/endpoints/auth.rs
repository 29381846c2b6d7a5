//! Authentication endpoints: terminal sign-in, sign-out and the
//! password-change flow.
//!
//! `POST /api/auth/login` — unprotected: issues the bearer token
//! `POST /api/auth/logout` — any token scope: revokes it
//! `POST /api/auth/password` — any token scope: sets a new PIN

use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, StaffContext};
use crate::auth::{self, LoginOutcome};
use crate::flow::signature;
use crate::models::{Role, StaffProfile};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub role: Role,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub must_change_password: bool,
    pub profile: StaffProfile,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub ok: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

/// `POST /api/auth/login` — sign in under the role selected on the
/// terminal.
///
/// A correct password that is still the default PIN comes back with
/// `mustChangePassword: true` and a token only the password-change
/// endpoint accepts.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let outcome = auth::login(&conn, &request.login, request.role, &request.password)?;

    let (collaborator, must_change) = match outcome {
        LoginOutcome::Authenticated(c) => (c, false),
        LoginOutcome::PasswordChangeRequired(c) => (c, true),
    };
    let profile = StaffProfile::from(&collaborator);

    let token = {
        let mut sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session registry lock".into()))?;
        sessions.issue(profile.clone(), must_change)
    };

    ctx.core.log_action(
        &signature(&profile),
        "login",
        "collaborator",
        Some(&profile.id),
        None,
    );

    Ok(Json(SessionResponse {
        token,
        must_change_password: must_change,
        profile,
    }))
}

/// `POST /api/auth/logout` — revoke the presented token.
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(staff): Extension<StaffContext>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, ApiError> {
    let token = bearer_token(&headers).ok_or(ApiError::Unauthorized)?;
    {
        let mut sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session registry lock".into()))?;
        sessions.revoke(token);
    }

    ctx.core.log_action(
        &signature(&staff.profile),
        "logout",
        "collaborator",
        Some(&staff.profile.id),
        None,
    );

    Ok(Json(LogoutResponse { ok: true }))
}

/// `POST /api/auth/password` — set a new PIN for the calling account.
///
/// Accepts both full and change-scoped tokens; afterwards every other
/// session of the account is revoked and a fresh full token issued, so
/// the forced-change flow lands straight on the main surface.
pub async fn change_password(
    State(ctx): State<ApiContext>,
    Extension(staff): Extension<StaffContext>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let updated = auth::change_password(&conn, &staff.profile.id, &request.new_password)?;
    let profile = StaffProfile::from(&updated);

    let token = {
        let mut sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session registry lock".into()))?;
        sessions.revoke_all_for(&profile.id);
        sessions.issue(profile.clone(), false)
    };

    ctx.core.log_action(
        &signature(&profile),
        "change_password",
        "collaborator",
        Some(&profile.id),
        None,
    );

    Ok(Json(SessionResponse {
        token,
        must_change_password: false,
        profile,
    }))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
