//! Department repository implementation.

use std::ops::Deref;

use sqlx::PgPool;

use carescope_core::result::AppResult;
use carescope_core::types::filter::FilterField;
use carescope_core::types::id::HospitalId;
use carescope_core::types::predicate::Predicate;
use carescope_core::types::sorting::SortField;
use carescope_entity::Department;

use crate::scoped::{ScopeEnforcer, ScopedRepository};
use crate::store::{EntityStore, PgEntityStore};

#[derive(Debug, Clone)]
pub struct DepartmentRepository<S = PgEntityStore<Department>> {
    base: ScopedRepository<Department, S>,
}

impl DepartmentRepository {
    /// Create a PostgreSQL-backed repository.
    pub fn postgres(pool: PgPool, enforcer: ScopeEnforcer) -> Self {
        Self::new(PgEntityStore::new(pool), enforcer)
    }
}

impl<S: EntityStore<Department>> DepartmentRepository<S> {
    pub fn new(store: S, enforcer: ScopeEnforcer) -> Self {
        Self {
            base: ScopedRepository::new(store, enforcer),
        }
    }

    /// Visible departments of one hospital, by name.
    pub async fn find_by_hospital(&self, hospital_id: HospitalId) -> AppResult<Vec<Department>> {
        self.base
            .find_all(
                FilterField::eq("hospital_id", hospital_id).into(),
                vec![SortField::asc("name")],
            )
            .await
    }

    /// Visible departments with the given specialty.
    pub async fn find_by_specialty(&self, specialty: &str) -> AppResult<Vec<Department>> {
        let filter: Predicate = FilterField::ilike("specialty", specialty).into();
        self.base
            .find_all(filter, vec![SortField::asc("name")])
            .await
    }
}

impl<S> Deref for DepartmentRepository<S> {
    type Target = ScopedRepository<Department, S>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
