pub mod collaborator;
pub mod enums;
pub mod lean_patient;
pub mod patient;

pub use collaborator::*;
pub use enums::*;
pub use lean_patient::*;
pub use patient::*;
