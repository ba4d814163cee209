//! Patient domain entities.

pub mod model;
pub mod status;

pub use model::Patient;
pub use status::PatientStatus;
