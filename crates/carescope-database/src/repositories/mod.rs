//! Repository implementations for all clinical records.
//!
//! Each repository wraps a [`ScopedRepository`](crate::scoped::ScopedRepository)
//! and adds the domain queries for its record type. The default store is
//! PostgreSQL; tests plug in the in-memory store.

pub mod department;
pub mod drug_catalog;
pub mod encounter;
pub mod hospital;
pub mod patient;
pub mod prescription;
pub mod referral;

pub use department::DepartmentRepository;
pub use drug_catalog::DrugCatalogRepository;
pub use encounter::EncounterRepository;
pub use hospital::HospitalRepository;
pub use patient::PatientRepository;
pub use prescription::PrescriptionRepository;
pub use referral::ReferralRepository;
