//! Ward HTTP API.
//!
//! Exposes the unit's business logic as JSON endpoints for the bedside
//! terminals. Routes are nested under `/api/` and the main surface is
//! protected by a middleware stack: Auth → Rate Limit → Handler.
//!
//! The router is composable — `ward_api_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::ward_api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
