//! Startup registration of the tenant-scoped clinical records.

use carescope_core::AppResult;
use carescope_tenant::scope::ScopeRegistry;

use crate::{Department, Encounter, Hospital, Patient, Prescription, Referral};

/// Build the registry of every tenant-scoped clinical record type.
///
/// `DrugCatalogEntry` is shared across tenants and deliberately absent.
pub fn clinical_registry() -> AppResult<ScopeRegistry> {
    Ok(ScopeRegistry::builder()
        .register::<Hospital>()?
        .register::<Department>()?
        .register::<Patient>()?
        .register::<Encounter>()?
        .register::<Prescription>()?
        .register::<Referral>()?
        .build())
}
