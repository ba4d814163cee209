//! Storage backends for entity rows.
//!
//! An [`EntityStore`] executes already-built predicates and knows nothing
//! about tenants. Scope enforcement happens one layer up, in
//! [`ScopedRepository`](crate::scoped::ScopedRepository), so every backend
//! gets it for free.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use carescope_core::result::AppResult;
use carescope_core::traits::entity::Entity;
use carescope_core::types::predicate::Predicate;
use carescope_core::types::sorting::SortField;

pub use memory::{MemoryDatabase, MemoryEntityStore};
pub use postgres::PgEntityStore;

/// A filtered, ordered, optionally windowed row selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub predicate: Predicate,
    pub sort: Vec<SortField>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl SelectQuery {
    /// Select every row matching `predicate`.
    pub fn filter(predicate: Predicate) -> Self {
        Self {
            predicate,
            sort: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Order the result.
    pub fn sorted(mut self, sort: Vec<SortField>) -> Self {
        self.sort = sort;
        self
    }

    /// Return at most `limit` rows after skipping `offset`.
    pub fn window(mut self, limit: u64, offset: u64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// Row storage for one entity type.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Fetch rows.
    async fn select(&self, query: &SelectQuery) -> AppResult<Vec<E>>;

    /// Count rows matching `predicate`.
    async fn count(&self, predicate: &Predicate) -> AppResult<u64>;

    /// Insert a new row and return it as stored.
    async fn insert(&self, entity: &E) -> AppResult<E>;

    /// Replace the row with `entity`'s id, provided it also matches
    /// `predicate`. Returns `None` when no such row exists.
    async fn update(&self, entity: &E, predicate: &Predicate) -> AppResult<Option<E>>;

    /// Delete rows matching `predicate`, returning how many were removed.
    async fn delete(&self, predicate: &Predicate) -> AppResult<u64>;
}
