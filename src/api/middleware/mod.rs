//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Rate limiter — reject early, save resources
//! 2. Auth validator — token check, staff identity injection
//!
//! Audit logging is not a layer here: mutations log themselves through
//! `CoreState::log_action` so reads stay out of the trail.

pub mod auth;
pub mod rate;
