//! Hospital repository implementation.

use std::ops::Deref;

use sqlx::PgPool;

use carescope_core::result::AppResult;
use carescope_core::types::filter::FilterField;
use carescope_core::types::sorting::SortField;
use carescope_entity::Hospital;

use crate::scoped::{ScopeEnforcer, ScopedRepository};
use crate::store::{EntityStore, PgEntityStore};

/// Repository for hospitals, visible organization-wide.
#[derive(Debug, Clone)]
pub struct HospitalRepository<S = PgEntityStore<Hospital>> {
    base: ScopedRepository<Hospital, S>,
}

impl HospitalRepository {
    /// Create a PostgreSQL-backed repository.
    pub fn postgres(pool: PgPool, enforcer: ScopeEnforcer) -> Self {
        Self::new(PgEntityStore::new(pool), enforcer)
    }
}

impl<S: EntityStore<Hospital>> HospitalRepository<S> {
    pub fn new(store: S, enforcer: ScopeEnforcer) -> Self {
        Self {
            base: ScopedRepository::new(store, enforcer),
        }
    }

    /// Find a visible hospital by its short code.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<Hospital>> {
        self.base
            .find_one(FilterField::eq("code", code).into())
            .await
    }

    /// Visible hospitals accepting encounters, by name.
    pub async fn find_active(&self) -> AppResult<Vec<Hospital>> {
        self.base
            .find_all(
                FilterField::eq("active", true).into(),
                vec![SortField::asc("name")],
            )
            .await
    }
}

impl<S> Deref for HospitalRepository<S> {
    type Target = ScopedRepository<Hospital, S>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
