//! Drug catalog repository implementation.
//!
//! The catalog is shared across tenants; it has no scope registration, so
//! the scoped base applies no tenant filter.

use std::ops::Deref;

use sqlx::PgPool;

use carescope_core::result::AppResult;
use carescope_core::types::filter::FilterField;
use carescope_core::types::pagination::{PageRequest, PageResponse};
use carescope_core::types::predicate::Predicate;
use carescope_core::types::sorting::SortField;
use carescope_entity::DrugCatalogEntry;

use crate::scoped::{ScopeEnforcer, ScopedRepository};
use crate::store::{EntityStore, PgEntityStore};

#[derive(Debug, Clone)]
pub struct DrugCatalogRepository<S = PgEntityStore<DrugCatalogEntry>> {
    base: ScopedRepository<DrugCatalogEntry, S>,
}

impl DrugCatalogRepository {
    /// Create a PostgreSQL-backed repository.
    pub fn postgres(pool: PgPool, enforcer: ScopeEnforcer) -> Self {
        Self::new(PgEntityStore::new(pool), enforcer)
    }
}

impl<S: EntityStore<DrugCatalogEntry>> DrugCatalogRepository<S> {
    pub fn new(store: S, enforcer: ScopeEnforcer) -> Self {
        Self {
            base: ScopedRepository::new(store, enforcer),
        }
    }

    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<DrugCatalogEntry>> {
        self.base
            .find_one(FilterField::eq("code", code).into())
            .await
    }

    /// Active entries whose name contains `fragment`.
    pub async fn search(
        &self,
        fragment: &str,
        page: PageRequest,
    ) -> AppResult<PageResponse<DrugCatalogEntry>> {
        let filter = Predicate::all([
            FilterField::ilike("name", format!("%{fragment}%")).into(),
            FilterField::eq("active", true).into(),
        ]);
        self.base
            .find_page(filter, page, vec![SortField::asc("name")])
            .await
    }
}

impl<S> Deref for DrugCatalogRepository<S> {
    type Target = ScopedRepository<DrugCatalogEntry, S>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
