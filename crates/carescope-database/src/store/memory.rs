//! In-process entity store.
//!
//! Rows live as [`Record`]s in a shared [`MemoryDatabase`] and predicates are
//! evaluated directly, sub-queries included. Intended for single-node tooling
//! and tests; there are no transactions.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use carescope_core::error::AppError;
use carescope_core::result::AppResult;
use carescope_core::traits::entity::Entity;
use carescope_core::types::filter::FilterValue;
use carescope_core::types::predicate::{Predicate, TableSource};
use carescope_core::types::record::Record;
use carescope_core::types::sorting::compare_by;

use super::{EntityStore, SelectQuery};

const WRITE_ATTEMPTS: usize = 3;

/// Shared table storage keyed by table name.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<DashMap<String, Vec<Record>>>,
}

impl MemoryDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw rows to `table`.
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Record>) {
        self.tables.entry(table.to_string()).or_default().extend(rows);
    }

    /// Append entities to their table, bypassing every check.
    pub fn seed_entities<E: Entity>(&self, entities: &[E]) {
        self.seed(E::TABLE, entities.iter().map(Entity::to_record));
    }

    /// Number of rows in `table`.
    pub fn len(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |rows| rows.len())
    }

    /// Whether every table is empty.
    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(|entry| entry.value().is_empty())
    }

    /// Create a store for `E` over this database.
    pub fn store<E: Entity>(&self) -> MemoryEntityStore<E> {
        MemoryEntityStore::new(self.clone())
    }
}

impl TableSource for MemoryDatabase {
    fn rows(&self, table: &str) -> Vec<Record> {
        self.tables
            .get(table)
            .map(|rows| rows.value().clone())
            .unwrap_or_default()
    }
}

/// [`EntityStore`] over a [`MemoryDatabase`].
pub struct MemoryEntityStore<E> {
    db: MemoryDatabase,
    _entity: PhantomData<fn() -> E>,
}

impl<E> MemoryEntityStore<E> {
    pub fn new(db: MemoryDatabase) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// The underlying database.
    pub fn database(&self) -> &MemoryDatabase {
        &self.db
    }
}

impl<E> Clone for MemoryEntityStore<E> {
    fn clone(&self) -> Self {
        Self::new(self.db.clone())
    }
}

impl<E> std::fmt::Debug for MemoryEntityStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEntityStore")
            .field("entity", &std::any::type_name::<E>())
            .finish()
    }
}

impl<E: Entity> MemoryEntityStore<E> {
    /// Snapshot of rows matching `predicate`.
    ///
    /// Rows are copied out before evaluation so sub-queries can read any
    /// table without holding a map guard.
    fn matching(&self, predicate: &Predicate) -> Vec<Record> {
        self.db
            .rows(E::TABLE)
            .into_iter()
            .filter(|row| predicate.evaluate(row, &self.db))
            .collect()
    }

    fn row_id(row: &Record) -> Option<Uuid> {
        match row.get(E::ID_COLUMN) {
            FilterValue::Uuid(id) => Some(*id),
            _ => None,
        }
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for MemoryEntityStore<E> {
    async fn select(&self, query: &SelectQuery) -> AppResult<Vec<E>> {
        let mut rows = self.matching(&query.predicate);
        rows.sort_by(|a, b| compare_by(&query.sort, a, b));

        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |limit| limit as usize);

        rows.iter()
            .skip(offset)
            .take(limit)
            .map(E::from_record)
            .collect()
    }

    async fn count(&self, predicate: &Predicate) -> AppResult<u64> {
        Ok(self.matching(predicate).len() as u64)
    }

    async fn insert(&self, entity: &E) -> AppResult<E> {
        let record = entity.to_record();
        let id = entity.id();
        let mut table = self.db.tables.entry(E::TABLE.to_string()).or_default();
        if table.iter().any(|row| Self::row_id(row) == Some(id)) {
            return Err(AppError::conflict(format!("{} {id} already exists", E::NAME)));
        }
        table.push(record.clone());
        drop(table);

        debug!(entity = E::NAME, %id, "Inserted row");
        E::from_record(&record)
    }

    async fn update(&self, entity: &E, predicate: &Predicate) -> AppResult<Option<E>> {
        let id = entity.id();
        let record = entity.to_record();

        for _ in 0..WRITE_ATTEMPTS {
            let Some(seen) = self
                .matching(predicate)
                .into_iter()
                .find(|row| Self::row_id(row) == Some(id))
            else {
                return Ok(None);
            };

            let Some(mut table) = self.db.tables.get_mut(E::TABLE) else {
                return Ok(None);
            };
            // Only replace the exact row the predicate was evaluated on.
            if let Some(slot) = table.iter_mut().find(|row| **row == seen) {
                *slot = record.clone();
                drop(table);
                return E::from_record(&record).map(Some);
            }
        }

        Err(AppError::conflict(format!(
            "{} {id} changed concurrently",
            E::NAME
        )))
    }

    async fn delete(&self, predicate: &Predicate) -> AppResult<u64> {
        let doomed = self.matching(predicate);
        if doomed.is_empty() {
            return Ok(0);
        }

        let Some(mut table) = self.db.tables.get_mut(E::TABLE) else {
            return Ok(0);
        };
        let before = table.len();
        table.retain(|row| !doomed.contains(row));
        Ok((before - table.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use carescope_core::error::ErrorKind;
    use carescope_core::types::filter::FilterField;
    use carescope_core::types::sorting::SortField;
    use carescope_entity::DrugCatalogEntry;

    use super::*;

    fn catalog(db: &MemoryDatabase) -> MemoryEntityStore<DrugCatalogEntry> {
        db.store()
    }

    #[tokio::test]
    async fn test_select_sorts_and_windows() {
        let db = MemoryDatabase::new();
        db.seed_entities(&[
            DrugCatalogEntry::new("C", "Codeine"),
            DrugCatalogEntry::new("A", "Aspirin"),
            DrugCatalogEntry::new("B", "Bisoprolol"),
        ]);

        let query = SelectQuery::filter(Predicate::Always)
            .sorted(vec![SortField::asc("code")])
            .window(2, 1);
        let rows = catalog(&db).select(&query).await.expect("select");
        let codes: Vec<_> = rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["B", "C"]);
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let db = MemoryDatabase::new();
        let entry = DrugCatalogEntry::new("A", "Aspirin");
        let store = catalog(&db);
        store.insert(&entry).await.expect("first insert");
        let err = store.insert(&entry).await.expect_err("duplicate");
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_update_respects_predicate() {
        let db = MemoryDatabase::new();
        let entry = DrugCatalogEntry::new("A", "Aspirin");
        let store = catalog(&db);
        store.insert(&entry).await.expect("insert");

        let renamed = DrugCatalogEntry {
            name: "Acetylsalicylic acid".into(),
            ..entry.clone()
        };
        let blocked = store
            .update(&renamed, &Predicate::Never)
            .await
            .expect("update");
        assert!(blocked.is_none());

        let updated = store
            .update(&renamed, &Predicate::Always)
            .await
            .expect("update");
        assert_eq!(updated.map(|e| e.name), Some("Acetylsalicylic acid".to_string()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_update_never_replaces_a_row_swapped_in_concurrently() {
        let db = MemoryDatabase::new();
        let original = DrugCatalogEntry::new("A", "Aspirin");
        let swapped = DrugCatalogEntry {
            code: "B".into(),
            name: "Bisoprolol".into(),
            ..original.clone()
        };
        let renamed = DrugCatalogEntry {
            name: "Acetylsalicylic acid".into(),
            ..original.clone()
        };
        db.seed_entities(std::slice::from_ref(&original));

        let updater = {
            let store = catalog(&db);
            tokio::spawn(async move {
                let only_a: Predicate = FilterField::eq("code", "A").into();
                for _ in 0..500 {
                    let _ = store.update(&renamed, &only_a).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        let store = catalog(&db);
        let by_id: Predicate = FilterField::eq("id", original.id).into();
        let only_b: Predicate = FilterField::eq("code", "B").into();
        for _ in 0..500 {
            assert_eq!(store.delete(&by_id).await.expect("delete"), 1);
            store.insert(&swapped).await.expect("insert swapped");
            tokio::task::yield_now().await;
            assert_eq!(store.delete(&only_b).await.expect("delete swapped"), 1);
            store.insert(&original).await.expect("insert original");
        }

        updater.await.expect("updater");
    }

    #[tokio::test]
    async fn test_delete_matching() {
        let db = MemoryDatabase::new();
        db.seed_entities(&[
            DrugCatalogEntry::new("A", "Aspirin"),
            DrugCatalogEntry::new("B", "Bisoprolol"),
        ]);
        let removed = catalog(&db)
            .delete(&FilterField::eq("code", "A").into())
            .await
            .expect("delete");
        assert_eq!(removed, 1);
        assert_eq!(db.len("drug_catalog"), 1);
    }
}
