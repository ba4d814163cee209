//! Predicate to PostgreSQL compilation.
//!
//! Values are always bound as parameters. Table and column names cannot be
//! bound, so every identifier is checked against a plain lower-case
//! identifier pattern before it is written into the statement.

use sqlx::{Postgres, QueryBuilder};

use carescope_core::error::AppError;
use carescope_core::result::AppResult;
use carescope_core::types::filter::{FilterField, FilterOp, FilterValue};
use carescope_core::types::predicate::{Predicate, is_identifier};
use carescope_core::types::sorting::SortField;

/// Reject anything that is not a plain identifier.
pub fn identifier(name: &str) -> AppResult<&str> {
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(AppError::validation(format!("Invalid SQL identifier '{name}'")))
    }
}

/// Append `predicate` to `builder` as a boolean SQL expression.
pub fn push_predicate(builder: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) -> AppResult<()> {
    match predicate {
        Predicate::Always => {
            builder.push("TRUE");
        }
        Predicate::Never => {
            builder.push("FALSE");
        }
        Predicate::Field(filter) => push_filter(builder, filter)?,
        Predicate::InSubquery { column, subquery } => {
            builder
                .push(identifier(column)?)
                .push(" IN (SELECT ")
                .push(identifier(&subquery.select)?)
                .push(" FROM ")
                .push(identifier(&subquery.table)?)
                .push(" WHERE ");
            push_predicate(builder, &subquery.predicate)?;
            builder.push(")");
        }
        Predicate::And(branches) => push_joined(builder, branches, " AND ")?,
        Predicate::Or(branches) => push_joined(builder, branches, " OR ")?,
    }
    Ok(())
}

fn push_joined(
    builder: &mut QueryBuilder<'_, Postgres>,
    branches: &[Predicate],
    separator: &str,
) -> AppResult<()> {
    builder.push("(");
    for (i, branch) in branches.iter().enumerate() {
        if i > 0 {
            builder.push(separator);
        }
        push_predicate(builder, branch)?;
    }
    builder.push(")");
    Ok(())
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &FilterField) -> AppResult<()> {
    let column = identifier(&filter.field)?;
    match filter.op {
        FilterOp::IsNull | FilterOp::IsNotNull => {
            builder.push(column).push(" ").push(filter.op.as_sql());
        }
        FilterOp::In => {
            if !matches!(
                filter.value,
                FilterValue::UuidList(_) | FilterValue::StringList(_)
            ) {
                return Err(AppError::validation(format!(
                    "Filter on '{column}' uses IN without a list value"
                )));
            }
            builder.push(column).push(" = ANY(");
            push_value(builder, &filter.value);
            builder.push(")");
        }
        op => {
            builder.push(column).push(" ").push(op.as_sql()).push(" ");
            push_value(builder, &filter.value);
        }
    }
    Ok(())
}

/// Bind a value, or write `NULL` for the null value.
pub fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: &FilterValue) {
    match value {
        FilterValue::Null => {
            builder.push("NULL");
        }
        FilterValue::Boolean(b) => {
            builder.push_bind(*b);
        }
        FilterValue::Integer(i) => {
            builder.push_bind(*i);
        }
        FilterValue::Float(x) => {
            builder.push_bind(*x);
        }
        FilterValue::Uuid(u) => {
            builder.push_bind(*u);
        }
        FilterValue::Timestamp(t) => {
            builder.push_bind(*t);
        }
        FilterValue::String(s) => {
            builder.push_bind(s.clone());
        }
        FilterValue::UuidList(ids) => {
            builder.push_bind(ids.clone());
        }
        FilterValue::StringList(items) => {
            builder.push_bind(items.clone());
        }
    }
}

/// Append `ORDER BY` for `sort`, if any.
pub fn push_order_by(builder: &mut QueryBuilder<'_, Postgres>, sort: &[SortField]) -> AppResult<()> {
    if sort.is_empty() {
        return Ok(());
    }
    builder.push(" ORDER BY ");
    for (i, field) in sort.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder
            .push(identifier(&field.field)?)
            .push(" ")
            .push(field.direction.as_sql());
    }
    Ok(())
}

/// Render `predicate` as a standalone `WHERE` expression with placeholders.
pub fn render_where(predicate: &Predicate) -> AppResult<String> {
    let mut builder = QueryBuilder::<Postgres>::new("");
    push_predicate(&mut builder, predicate)?;
    Ok(builder.sql().to_string())
}
