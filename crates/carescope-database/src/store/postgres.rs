//! PostgreSQL entity store built on `sqlx::QueryBuilder`.

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use carescope_core::error::{AppError, ErrorKind};
use carescope_core::result::AppResult;
use carescope_core::traits::entity::Entity;
use carescope_core::types::predicate::Predicate;

use crate::sql::{identifier, push_order_by, push_predicate, push_value};

use super::{EntityStore, SelectQuery};

/// Stores `E` rows in the table named by `E::TABLE`.
pub struct PgEntityStore<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> PgEntityStore<E> {
    /// Create a store over `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

impl<E> Clone for PgEntityStore<E> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<E> std::fmt::Debug for PgEntityStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgEntityStore")
            .field("entity", &std::any::type_name::<E>())
            .finish()
    }
}

/// `SELECT * FROM <table> WHERE ... [ORDER BY ...] [LIMIT .. OFFSET ..]`.
pub fn select_statement<E: Entity>(query: &SelectQuery) -> AppResult<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new("SELECT * FROM ");
    builder.push(identifier(E::TABLE)?).push(" WHERE ");
    push_predicate(&mut builder, &query.predicate)?;
    push_order_by(&mut builder, &query.sort)?;
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ").push_bind(limit as i64);
    }
    if let Some(offset) = query.offset {
        builder.push(" OFFSET ").push_bind(offset as i64);
    }
    Ok(builder)
}

/// `SELECT COUNT(*) FROM <table> WHERE ...`.
pub fn count_statement<E: Entity>(predicate: &Predicate) -> AppResult<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM ");
    builder.push(identifier(E::TABLE)?).push(" WHERE ");
    push_predicate(&mut builder, predicate)?;
    Ok(builder)
}

/// `INSERT INTO <table> (<all columns>) VALUES (...) RETURNING *`.
pub fn insert_statement<E: Entity>(entity: &E) -> AppResult<QueryBuilder<'static, Postgres>> {
    let record = entity.to_record();
    let mut builder = QueryBuilder::new("INSERT INTO ");
    builder.push(identifier(E::TABLE)?).push(" (");
    for (i, column) in E::COLUMNS.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder.push(identifier(column)?);
    }
    builder.push(") VALUES (");
    for (i, column) in E::COLUMNS.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        push_value(&mut builder, record.get(column));
    }
    builder.push(") RETURNING *");
    Ok(builder)
}

/// `UPDATE <table> SET ... WHERE <id> = $n AND (...) RETURNING *`.
pub fn update_statement<E: Entity>(
    entity: &E,
    predicate: &Predicate,
) -> AppResult<QueryBuilder<'static, Postgres>> {
    let record = entity.to_record();
    let mut builder = QueryBuilder::new("UPDATE ");
    builder.push(identifier(E::TABLE)?).push(" SET ");
    let columns = E::COLUMNS.iter().filter(|column| **column != E::ID_COLUMN);
    for (i, column) in columns.enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder.push(identifier(column)?).push(" = ");
        push_value(&mut builder, record.get(column));
    }
    builder
        .push(" WHERE ")
        .push(identifier(E::ID_COLUMN)?)
        .push(" = ")
        .push_bind(entity.id())
        .push(" AND ");
    push_predicate(&mut builder, predicate)?;
    builder.push(" RETURNING *");
    Ok(builder)
}

/// `DELETE FROM <table> WHERE ...`.
pub fn delete_statement<E: Entity>(predicate: &Predicate) -> AppResult<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new("DELETE FROM ");
    builder.push(identifier(E::TABLE)?).push(" WHERE ");
    push_predicate(&mut builder, predicate)?;
    Ok(builder)
}

fn database_error(action: &str, entity: &str, e: sqlx::Error) -> AppError {
    if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
        return AppError::with_source(ErrorKind::Conflict, format!("{entity} already exists"), e);
    }
    AppError::with_source(ErrorKind::Database, format!("Failed to {action} {entity}"), e)
}

#[async_trait]
impl<E> EntityStore<E> for PgEntityStore<E>
where
    E: Entity + for<'r> FromRow<'r, PgRow>,
{
    async fn select(&self, query: &SelectQuery) -> AppResult<Vec<E>> {
        let mut builder = select_statement::<E>(query)?;
        builder
            .build_query_as::<E>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("select", E::NAME, e))
    }

    async fn count(&self, predicate: &Predicate) -> AppResult<u64> {
        let mut builder = count_statement::<E>(predicate)?;
        let total: i64 = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("count", E::NAME, e))?;
        Ok(total as u64)
    }

    async fn insert(&self, entity: &E) -> AppResult<E> {
        let mut builder = insert_statement(entity)?;
        builder
            .build_query_as::<E>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("insert", E::NAME, e))
    }

    async fn update(&self, entity: &E, predicate: &Predicate) -> AppResult<Option<E>> {
        let mut builder = update_statement(entity, predicate)?;
        builder
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("update", E::NAME, e))
    }

    async fn delete(&self, predicate: &Predicate) -> AppResult<u64> {
        let mut builder = delete_statement::<E>(predicate)?;
        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("delete", E::NAME, e))?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use carescope_core::types::filter::FilterField;
    use carescope_core::types::sorting::SortField;
    use carescope_entity::{DrugCatalogEntry, Patient};
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_select_with_window() {
        let query = SelectQuery::filter(FilterField::eq("status", "active").into())
            .sorted(vec![SortField::asc("full_name")])
            .window(25, 50);
        let builder = select_statement::<Patient>(&query).expect("statement");
        assert_eq!(
            builder.sql(),
            "SELECT * FROM patients WHERE status = $1 ORDER BY full_name ASC LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_count_never_is_false() {
        let builder = count_statement::<Patient>(&Predicate::Never).expect("statement");
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM patients WHERE FALSE");
    }

    #[test]
    fn test_insert_lists_every_column() {
        let entry = DrugCatalogEntry::new("N02BE01", "Paracetamol");
        let builder = insert_statement(&entry).expect("statement");
        assert_eq!(
            builder.sql(),
            "INSERT INTO drug_catalog (id, code, name, form, active) \
             VALUES ($1, $2, $3, NULL, $4) RETURNING *"
        );
    }

    #[test]
    fn test_update_is_guarded_by_scope() {
        let entry = DrugCatalogEntry::new("N02BE01", "Paracetamol");
        let scope = FilterField::in_uuids("hospital_id", [Uuid::new_v4()]).into();
        let builder = update_statement(&entry, &scope).expect("statement");
        assert_eq!(
            builder.sql(),
            "UPDATE drug_catalog SET code = $1, name = $2, form = NULL, active = $3 \
             WHERE id = $4 AND hospital_id = ANY($5) RETURNING *"
        );
    }

    #[test]
    fn test_delete_statement() {
        let builder = delete_statement::<Patient>(&Predicate::Always).expect("statement");
        assert_eq!(builder.sql(), "DELETE FROM patients WHERE TRUE");
    }
}
