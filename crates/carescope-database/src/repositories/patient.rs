//! Patient repository implementation.

use std::ops::Deref;

use sqlx::PgPool;

use carescope_core::result::AppResult;
use carescope_core::types::filter::FilterField;
use carescope_core::types::pagination::{PageRequest, PageResponse};
use carescope_core::types::predicate::Predicate;
use carescope_core::types::sorting::SortField;
use carescope_entity::{Patient, PatientStatus, Prescription, PrescriptionStatus};

use crate::scoped::{ScopeEnforcer, ScopedRepository};
use crate::store::{EntityStore, PgEntityStore};

/// Repository for patient records.
#[derive(Debug, Clone)]
pub struct PatientRepository<S = PgEntityStore<Patient>> {
    base: ScopedRepository<Patient, S>,
}

impl PatientRepository {
    /// Create a PostgreSQL-backed repository.
    pub fn postgres(pool: PgPool, enforcer: ScopeEnforcer) -> Self {
        Self::new(PgEntityStore::new(pool), enforcer)
    }
}

impl<S: EntityStore<Patient>> PatientRepository<S> {
    pub fn new(store: S, enforcer: ScopeEnforcer) -> Self {
        Self {
            base: ScopedRepository::new(store, enforcer),
        }
    }

    /// Find a visible patient by medical record number.
    pub async fn find_by_mrn(&self, medical_record_number: &str) -> AppResult<Option<Patient>> {
        self.base
            .find_one(FilterField::eq("medical_record_number", medical_record_number).into())
            .await
    }

    /// Search visible patients by name, case-insensitively.
    pub async fn search_by_name(
        &self,
        fragment: &str,
        page: PageRequest,
    ) -> AppResult<PageResponse<Patient>> {
        let filter = FilterField::ilike("full_name", format!("%{fragment}%"));
        self.base
            .find_page(filter.into(), page, vec![SortField::asc("full_name")])
            .await
    }

    /// Visible patients with the given status.
    pub async fn find_by_status(&self, status: PatientStatus) -> AppResult<Vec<Patient>> {
        self.base
            .find_all(
                FilterField::eq("status", status.as_str()).into(),
                vec![SortField::asc("full_name")],
            )
            .await
    }

    /// Visible patients holding an active prescription for `drug_code`
    /// that is itself visible through `prescriptions`.
    pub async fn find_on_drug<P: EntityStore<Prescription>>(
        &self,
        prescriptions: &ScopedRepository<Prescription, P>,
        drug_code: &str,
    ) -> AppResult<Vec<Patient>> {
        let active = Predicate::all([
            FilterField::eq("drug_code", drug_code).into(),
            FilterField::eq("status", PrescriptionStatus::Active.as_str()).into(),
        ]);
        let subquery = prescriptions.subquery("patient_id", active)?;
        self.base
            .find_all(
                Predicate::in_subquery("id", subquery),
                vec![SortField::asc("full_name")],
            )
            .await
    }
}

impl<S> Deref for PatientRepository<S> {
    type Target = ScopedRepository<Patient, S>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
