//! Encounter repository implementation.

use std::ops::Deref;

use sqlx::PgPool;
use uuid::Uuid;

use carescope_core::result::AppResult;
use carescope_core::types::filter::FilterField;
use carescope_core::types::predicate::Predicate;
use carescope_core::types::sorting::SortField;
use carescope_entity::Encounter;

use crate::scoped::{ScopeEnforcer, ScopedRepository};
use crate::store::{EntityStore, PgEntityStore};

/// Repository for encounters.
#[derive(Debug, Clone)]
pub struct EncounterRepository<S = PgEntityStore<Encounter>> {
    base: ScopedRepository<Encounter, S>,
}

impl EncounterRepository {
    /// Create a PostgreSQL-backed repository.
    pub fn postgres(pool: PgPool, enforcer: ScopeEnforcer) -> Self {
        Self::new(PgEntityStore::new(pool), enforcer)
    }
}

impl<S: EntityStore<Encounter>> EncounterRepository<S> {
    pub fn new(store: S, enforcer: ScopeEnforcer) -> Self {
        Self {
            base: ScopedRepository::new(store, enforcer),
        }
    }

    /// Ongoing encounters of a patient.
    pub async fn find_open_for_patient(&self, patient_id: Uuid) -> AppResult<Vec<Encounter>> {
        let filter = Predicate::all([
            FilterField::eq("patient_id", patient_id).into(),
            FilterField::is_null("ended_at").into(),
        ]);
        self.base
            .find_all(filter, vec![SortField::asc("started_at")])
            .await
    }

    /// Close a visible encounter now.
    pub async fn close(&self, id: Uuid) -> AppResult<Encounter> {
        let encounter = self.base.get_reference(id).await?;
        self.base.update(encounter.close()).await
    }
}

impl<S> Deref for EncounterRepository<S> {
    type Target = ScopedRepository<Encounter, S>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
