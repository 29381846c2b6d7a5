//! Repository layer — entity-scoped database operations.
//!
//! Ward records are stored whole, one JSON document per row, in the exact
//! shape the clients exchange. Only keys that SQL needs (the primary key,
//! the staff login) are lifted into their own columns.

mod audit;
mod collaborator;
mod lean_patient;
mod patient;

// Re-export all public items from sub-modules
pub use audit::*;
pub use collaborator::*;
pub use lean_patient::*;
pub use patient::*;
