//! Prescription repository implementation.

use std::ops::Deref;

use sqlx::PgPool;
use uuid::Uuid;

use carescope_core::result::AppResult;
use carescope_core::types::filter::FilterField;
use carescope_core::types::predicate::Predicate;
use carescope_core::types::sorting::SortField;
use carescope_entity::{Prescription, PrescriptionStatus};

use crate::scoped::{ScopeEnforcer, ScopedRepository};
use crate::store::{EntityStore, PgEntityStore};

/// Repository for prescriptions. Visibility follows the issuing department.
#[derive(Debug, Clone)]
pub struct PrescriptionRepository<S = PgEntityStore<Prescription>> {
    base: ScopedRepository<Prescription, S>,
}

impl PrescriptionRepository {
    /// Create a PostgreSQL-backed repository.
    pub fn postgres(pool: PgPool, enforcer: ScopeEnforcer) -> Self {
        Self::new(PgEntityStore::new(pool), enforcer)
    }
}

impl<S: EntityStore<Prescription>> PrescriptionRepository<S> {
    pub fn new(store: S, enforcer: ScopeEnforcer) -> Self {
        Self {
            base: ScopedRepository::new(store, enforcer),
        }
    }

    /// Active prescriptions of a patient, newest first.
    pub async fn find_active_for_patient(&self, patient_id: Uuid) -> AppResult<Vec<Prescription>> {
        let filter = Predicate::all([
            FilterField::eq("patient_id", patient_id).into(),
            FilterField::eq("status", PrescriptionStatus::Active.as_str()).into(),
        ]);
        self.base
            .find_all(filter, vec![SortField::desc("prescribed_at")])
            .await
    }

    /// Cancel a visible prescription.
    pub async fn cancel(&self, id: Uuid) -> AppResult<Prescription> {
        let prescription = self.base.get_reference(id).await?;
        self.base
            .update(Prescription {
                status: PrescriptionStatus::Cancelled,
                ..prescription
            })
            .await
    }
}

impl<S> Deref for PrescriptionRepository<S> {
    type Target = ScopedRepository<Prescription, S>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
