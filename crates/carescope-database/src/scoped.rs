//! The tenant-scoped data-access base every repository is built on.
//!
//! Each public read or write conjoins the caller's predicate with a scope
//! predicate built fresh from the current call chain's tenant context. A row
//! outside the caller's scope is indistinguishable from a row that does not
//! exist: lists omit it, counts exclude it, lookups return `None`, and
//! reference resolution, updates, and deletes fail with "not found".

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use carescope_core::config::ScopeConfig;
use carescope_core::error::AppError;
use carescope_core::result::AppResult;
use carescope_core::types::filter::FilterField;
use carescope_core::types::pagination::{PageRequest, PageResponse};
use carescope_core::types::predicate::{Predicate, SubQuery};
use carescope_core::types::sorting::SortField;
use carescope_tenant::context::{ContextStore, TenantContext};
use carescope_tenant::entity::TenantBound;
use carescope_tenant::scope::{ScopePredicateBuilder, ScopeRegistry};
use carescope_tenant::stamping::ScopeStamper;

use crate::sql::identifier;
use crate::store::{EntityStore, SelectQuery};

/// Predicate builder and stamper sharing one registry.
#[derive(Debug, Clone)]
pub struct ScopeEnforcer {
    predicates: ScopePredicateBuilder,
    stamper: ScopeStamper,
}

impl ScopeEnforcer {
    pub fn new(registry: Arc<ScopeRegistry>, config: &ScopeConfig) -> Self {
        Self {
            predicates: ScopePredicateBuilder::new(registry.clone(), config.tables.clone()),
            stamper: ScopeStamper::new(registry),
        }
    }

    pub fn predicates(&self) -> &ScopePredicateBuilder {
        &self.predicates
    }

    pub fn stamper(&self) -> &ScopeStamper {
        &self.stamper
    }
}

/// Tenant-scoped repository over any [`EntityStore`].
pub struct ScopedRepository<E, S> {
    store: S,
    enforcer: ScopeEnforcer,
    _entity: PhantomData<fn() -> E>,
}

impl<E, S: Clone> Clone for ScopedRepository<E, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            enforcer: self.enforcer.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E, S> std::fmt::Debug for ScopedRepository<E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedRepository")
            .field("entity", &std::any::type_name::<E>())
            .finish()
    }
}

impl<E, S> ScopedRepository<E, S>
where
    E: TenantBound,
    S: EntityStore<E>,
{
    pub fn new(store: S, enforcer: ScopeEnforcer) -> Self {
        Self {
            store,
            enforcer,
            _entity: PhantomData,
        }
    }

    /// The underlying store, without any scope applied.
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    /// Scope predicate for the current call chain.
    pub fn scope_predicate(&self) -> Predicate {
        self.enforcer.predicates.build_current::<E>()
    }

    /// Validate `filter` and conjoin it with a fresh scope predicate.
    ///
    /// Sub-queries inside `filter` are scoped as well: each one over a
    /// registered table gets that table's scope predicate for the same
    /// context, however the sub-query was built.
    pub fn scoped(&self, filter: Predicate) -> AppResult<Predicate> {
        if let Some(column) = filter.columns().into_iter().find(|c| !E::has_column(c)) {
            return Err(AppError::validation(format!(
                "{} has no column '{column}'",
                E::NAME
            )));
        }
        let ctx = ContextStore::get_or_empty();
        let filter = self.scope_subqueries(filter, &ctx);
        Ok(filter.and(self.enforcer.predicates.build::<E>(&ctx)))
    }

    fn scope_subqueries(&self, predicate: Predicate, ctx: &TenantContext) -> Predicate {
        match predicate {
            Predicate::InSubquery { column, subquery } => {
                let SubQuery {
                    table,
                    select,
                    predicate: inner,
                } = *subquery;
                let inner = self.scope_subqueries(inner, ctx);
                let inner = match self.enforcer.predicates.registry().find_by_table(&table) {
                    Some(desc) => {
                        let scope = self.enforcer.predicates.build_for(desc, ctx);
                        if conjoins(&inner, &scope) {
                            inner
                        } else {
                            inner.and(scope)
                        }
                    }
                    None => inner,
                };
                Predicate::in_subquery(
                    column,
                    SubQuery {
                        table,
                        select,
                        predicate: inner,
                    },
                )
            }
            Predicate::And(branches) => {
                Predicate::all(branches.into_iter().map(|b| self.scope_subqueries(b, ctx)))
            }
            Predicate::Or(branches) => {
                Predicate::any(branches.into_iter().map(|b| self.scope_subqueries(b, ctx)))
            }
            other => other,
        }
    }

    fn check_sort(sort: &[SortField]) -> AppResult<()> {
        match sort.iter().find(|s| !E::has_column(&s.field)) {
            Some(s) => Err(AppError::validation(format!(
                "{} cannot be sorted by unknown column '{}'",
                E::NAME,
                s.field
            ))),
            None => Ok(()),
        }
    }

    fn id_filter(id: Uuid) -> Predicate {
        FilterField::eq(E::ID_COLUMN, id).into()
    }

    fn not_found(id: Uuid) -> AppError {
        AppError::not_found(format!("{} {id} not found", E::NAME))
    }

    /// All visible rows matching `filter`, ordered by `sort`.
    pub async fn find_all(&self, filter: Predicate, sort: Vec<SortField>) -> AppResult<Vec<E>> {
        Self::check_sort(&sort)?;
        let predicate = self.scoped(filter)?;
        if predicate.is_never() {
            return Ok(Vec::new());
        }
        self.store
            .select(&SelectQuery::filter(predicate).sorted(sort))
            .await
    }

    /// One page of visible rows matching `filter`.
    pub async fn find_page(
        &self,
        filter: Predicate,
        page: PageRequest,
        sort: Vec<SortField>,
    ) -> AppResult<PageResponse<E>> {
        Self::check_sort(&sort)?;
        let predicate = self.scoped(filter)?;
        if predicate.is_never() {
            return Ok(PageResponse::empty(&page));
        }

        let total = self.store.count(&predicate).await?;
        let items = self
            .store
            .select(
                &SelectQuery::filter(predicate)
                    .sorted(sort)
                    .window(page.limit(), page.offset()),
            )
            .await?;
        Ok(PageResponse::new(items, &page, total))
    }

    /// Number of visible rows matching `filter`.
    pub async fn count(&self, filter: Predicate) -> AppResult<u64> {
        let predicate = self.scoped(filter)?;
        if predicate.is_never() {
            return Ok(0);
        }
        self.store.count(&predicate).await
    }

    /// First visible row matching `filter`.
    pub async fn find_one(&self, filter: Predicate) -> AppResult<Option<E>> {
        let predicate = self.scoped(filter)?;
        if predicate.is_never() {
            return Ok(None);
        }
        let mut rows = self
            .store
            .select(&SelectQuery::filter(predicate).window(1, 0))
            .await?;
        Ok(rows.pop())
    }

    /// Visible row with primary key `id`.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<E>> {
        self.find_one(Self::id_filter(id)).await
    }

    /// Whether a visible row with primary key `id` exists.
    pub async fn exists_by_id(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    /// Resolve a reference to the row `id`, for attaching to another record.
    ///
    /// Goes through the scoped lookup; an out-of-scope or missing row is
    /// "not found".
    pub async fn get_reference(&self, id: Uuid) -> AppResult<E> {
        self.find_by_id(id).await?.ok_or_else(|| Self::not_found(id))
    }

    /// `SELECT <column> FROM <table>` over visible rows matching `filter`,
    /// for use in another repository's filter via [`Predicate::in_subquery`].
    pub fn subquery(&self, column: &str, filter: Predicate) -> AppResult<SubQuery> {
        if !E::has_column(column) {
            return Err(AppError::validation(format!(
                "{} has no column '{column}'",
                E::NAME
            )));
        }
        Ok(SubQuery {
            table: identifier(E::TABLE)?.to_string(),
            select: column.to_string(),
            predicate: self.scoped(filter)?,
        })
    }

    /// Stamp tenant ids from the current context and insert.
    pub async fn create(&self, entity: E) -> AppResult<E> {
        let entity = self.enforcer.stamper.prepare_for_write(entity);
        let created = self.store.insert(&entity).await?;
        debug!(entity = E::NAME, id = %created.id(), "Created scoped row");
        Ok(created)
    }

    /// Replace the row, provided it is currently visible.
    ///
    /// Tenant identifiers already stored on the row are kept: a set id that
    /// differs is rejected, an unset one is filled from the stored row and
    /// only then stamped from the context.
    pub async fn update(&self, entity: E) -> AppResult<E> {
        let id = entity.id();
        let scope = self.scope_predicate();
        if scope.is_never() {
            warn!(entity = E::NAME, %id, "Update rejected, no tenant scope");
            return Err(Self::not_found(id));
        }

        let Some(current) = self.find_by_id(id).await? else {
            warn!(entity = E::NAME, %id, "Update rejected, row not visible");
            return Err(Self::not_found(id));
        };
        let stored = current.tenant_ids();
        if let Some(level) = entity.tenant_ids().conflict_with(&stored) {
            warn!(entity = E::NAME, %id, %level, "Update rejected, tenant id changed");
            return Err(AppError::validation(format!(
                "{} {id} cannot move to another {level}",
                E::NAME
            )));
        }
        let entity = self
            .enforcer
            .stamper
            .prepare_for_write(entity.apply_tenant_ids(stored));

        match self.store.update(&entity, &scope).await? {
            Some(updated) => Ok(updated),
            None => {
                warn!(entity = E::NAME, %id, "Update rejected, row not visible");
                Err(Self::not_found(id))
            }
        }
    }

    /// Delete the visible row `id`.
    pub async fn delete_by_id(&self, id: Uuid) -> AppResult<()> {
        match self.delete_where(Self::id_filter(id)).await? {
            0 => {
                warn!(entity = E::NAME, %id, "Delete rejected, row not visible");
                Err(Self::not_found(id))
            }
            _ => Ok(()),
        }
    }

    /// Delete every visible row matching `filter`.
    pub async fn delete_where(&self, filter: Predicate) -> AppResult<u64> {
        let predicate = self.scoped(filter)?;
        if predicate.is_never() {
            return Ok(0);
        }
        let removed = self.store.delete(&predicate).await?;
        debug!(entity = E::NAME, removed, "Deleted scoped rows");
        Ok(removed)
    }
}

/// Whether `predicate` already requires every conjunct of `scope`.
fn conjoins(predicate: &Predicate, scope: &Predicate) -> bool {
    if scope.is_always() || predicate == scope {
        return true;
    }
    match (predicate, scope) {
        (Predicate::And(branches), Predicate::And(required)) => {
            required.iter().all(|r| branches.contains(r))
        }
        (Predicate::And(branches), required) => branches.contains(required),
        _ => false,
    }
}
