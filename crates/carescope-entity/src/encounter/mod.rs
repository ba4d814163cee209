//! Encounter domain entities.

pub mod kind;
pub mod model;

pub use kind::EncounterKind;
pub use model::Encounter;
