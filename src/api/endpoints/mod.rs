//! API endpoint handlers.
//!
//! Each module corresponds to a terminal screen or feature.
//! Handlers reuse the business logic of the domain modules.

pub mod auth;
pub mod census;
pub mod collaborators;
pub mod health;
pub mod lean_patients;
pub mod notifications;
pub mod patients;
pub mod reports;
