//! # carescope-entity
//!
//! Clinical record models for CareScope. Every struct in this crate
//! represents a database table row. All records derive `Debug`, `Clone`,
//! `Serialize`, `Deserialize`, and `sqlx::FromRow`, implement the
//! `Entity` persistence contract, and declare their tenant attributes
//! through `TenantBound`.

pub mod catalog;
pub mod department;
pub mod encounter;
pub mod hospital;
pub mod patient;
pub mod prescription;
pub mod referral;
pub mod registry;

pub use catalog::DrugCatalogEntry;
pub use department::Department;
pub use encounter::{Encounter, EncounterKind};
pub use hospital::Hospital;
pub use patient::{Patient, PatientStatus};
pub use prescription::{Prescription, PrescriptionStatus};
pub use referral::{Referral, ReferralStatus};
pub use registry::clinical_registry;
