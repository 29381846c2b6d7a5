//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, validates it against the
//! session registry, and injects `StaffContext` into request extensions
//! for downstream handlers.

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

/// Require a full session token. Change-scoped tokens — the ones issued
/// for the forced password change — are turned away with their own code
/// so the terminal knows to stay on the change screen.
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match authenticate(req, next, false).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

/// Like [`require_auth`] but admits change-scoped tokens. Only the
/// password-change and logout routes sit behind this variant.
pub async fn require_auth_any_scope(req: Request<axum::body::Body>, next: Next) -> Response {
    match authenticate(req, next, true).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn authenticate(
    mut req: Request<axum::body::Body>,
    next: Next,
    allow_change_scoped: bool,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    // 1. Extract bearer token
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    // 2. Validate against the session registry
    let staff = {
        let mut sessions = ctx
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session registry lock".into()))?;
        sessions.validate(&token).ok_or(ApiError::Unauthorized)?
    }; // MutexGuard dropped here, before any .await

    if staff.change_scoped && !allow_change_scoped {
        return Err(ApiError::PasswordChangeRequired);
    }

    // 3. Inject staff identity for downstream handlers
    req.extensions_mut().insert(staff);

    // 4. Process request
    let mut response = next.run(req).await;

    // 5. Authenticated responses must not be cached on shared terminals
    response
        .headers_mut()
        .insert("Cache-Control", HeaderValue::from_static("no-store"));

    Ok(response)
}
