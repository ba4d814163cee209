//! Prescription domain entities.

pub mod model;
pub mod status;

pub use model::Prescription;
pub use status::PrescriptionStatus;
