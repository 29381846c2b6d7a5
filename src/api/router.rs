//! Ward API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Rate limiter → 2. Auth validator → Handler

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the ward API router.
///
/// Three route groups, all nested under `/api/`:
/// - the main surface, behind full-session bearer auth;
/// - the account routes (logout, password change), which also admit
///   change-scoped tokens;
/// - the public routes (health, login).
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost
/// layer); endpoint handlers use `State<ApiContext>`.
pub fn ward_api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);
    build_router(ctx)
}

/// Build router from a pre-constructed `ApiContext`.
///
/// Used by tests that need access to the shared context (e.g. to issue
/// sessions directly).
#[cfg(test)]
pub(crate) fn ward_api_router_with_ctx(ctx: ApiContext) -> Router {
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::save),
        )
        .route("/patients/bulk-delete", post(endpoints::patients::bulk_delete))
        .route("/patients/bulk-update", post(endpoints::patients::bulk_update))
        .route("/patients/:id", delete(endpoints::patients::remove))
        .route(
            "/lean-patients",
            get(endpoints::lean_patients::list).post(endpoints::lean_patients::save),
        )
        .route(
            "/lean-patients/bulk-delete",
            post(endpoints::lean_patients::bulk_delete),
        )
        .route("/lean-patients/:id", delete(endpoints::lean_patients::remove))
        .route(
            "/collaborators",
            get(endpoints::collaborators::list).post(endpoints::collaborators::upsert),
        )
        .route("/collaborators/:id", delete(endpoints::collaborators::remove))
        .route("/notifications", get(endpoints::notifications::badges))
        .route("/census", get(endpoints::census::snapshot))
        .route("/reports/monthly", get(endpoints::reports::monthly))
        .with_state(ctx.clone())
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Account routes — reachable with a change-scoped token, so the
    // forced password change (and backing out of it) can happen.
    let account = Router::new()
        .route("/auth/logout", post(endpoints::auth::logout))
        .route("/auth/password", post(endpoints::auth::change_password))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(
            middleware::auth::require_auth_any_scope,
        ))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::Extension(ctx.clone()));

    // Public routes (rate-limited only, no auth required)
    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::Extension(ctx));

    // The terminals are served from another origin on the ward LAN.
    Router::new()
        .nest("/api", protected)
        .nest("/api", account)
        .nest("/api", public)
        .layer(CorsLayer::permissive())
}
