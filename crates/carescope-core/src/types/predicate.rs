//! Boolean row predicates.
//!
//! A [`Predicate`] is built once per query and handed to a storage backend,
//! which either compiles it to SQL or evaluates it against [`Record`]s. The
//! combinators simplify constant branches eagerly so that a fully denied
//! query stays a plain [`Predicate::Never`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::filter::FilterField;
use super::record::Record;

/// A boolean filter condition over the rows of one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Predicate {
    /// Matches every row.
    Always,
    /// Matches no row.
    Never,
    /// A condition on one column.
    Field(FilterField),
    /// `column IN (SELECT select FROM table WHERE predicate)`.
    InSubquery {
        /// Column of the outer row.
        column: String,
        /// The inner query.
        subquery: Box<SubQuery>,
    },
    /// Every branch must match.
    And(Vec<Predicate>),
    /// At least one branch must match.
    Or(Vec<Predicate>),
}

/// A single-column projection over another table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubQuery {
    /// Table to select from.
    pub table: String,
    /// Column to project.
    pub select: String,
    /// Condition on the inner table's rows.
    pub predicate: Predicate,
}

/// Provides table contents to predicate evaluation for sub-queries.
pub trait TableSource {
    /// Return all rows of `table` (empty when the table is unknown).
    fn rows(&self, table: &str) -> Vec<Record>;
}

/// A [`TableSource`] with no tables, for predicates without sub-queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTables;

impl TableSource for NoTables {
    fn rows(&self, _table: &str) -> Vec<Record> {
        Vec::new()
    }
}

impl Predicate {
    /// Wrap a single column condition.
    pub fn field(filter: FilterField) -> Self {
        Self::Field(filter)
    }

    /// Build a sub-query membership test.
    pub fn in_subquery(column: impl Into<String>, subquery: SubQuery) -> Self {
        if subquery.predicate.is_never() {
            return Self::Never;
        }
        Self::InSubquery {
            column: column.into(),
            subquery: Box::new(subquery),
        }
    }

    /// Whether this predicate trivially matches everything.
    pub fn is_always(&self) -> bool {
        matches!(self, Self::Always)
    }

    /// Whether this predicate trivially matches nothing.
    pub fn is_never(&self) -> bool {
        matches!(self, Self::Never)
    }

    /// Conjoin with another predicate.
    pub fn and(self, other: Predicate) -> Self {
        Self::all([self, other])
    }

    /// Disjoin with another predicate.
    pub fn or(self, other: Predicate) -> Self {
        Self::any([self, other])
    }

    /// Conjunction of all predicates; `Always` when empty.
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut branches = Vec::new();
        for predicate in predicates {
            match predicate {
                Self::Always => {}
                Self::Never => return Self::Never,
                Self::And(inner) => branches.extend(inner),
                other => branches.push(other),
            }
        }
        match branches.len() {
            0 => Self::Always,
            1 => branches.remove(0),
            _ => Self::And(branches),
        }
    }

    /// Disjunction of all predicates; `Never` when empty.
    pub fn any(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut branches = Vec::new();
        for predicate in predicates {
            match predicate {
                Self::Never => {}
                Self::Always => return Self::Always,
                Self::Or(inner) => branches.extend(inner),
                other => branches.push(other),
            }
        }
        match branches.len() {
            0 => Self::Never,
            1 => branches.remove(0),
            _ => Self::Or(branches),
        }
    }

    /// Columns of the outer table referenced by this predicate.
    ///
    /// Columns inside sub-queries belong to the inner table and are not
    /// reported.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Always | Self::Never => {}
            Self::Field(filter) => out.push(&filter.field),
            Self::InSubquery { column, .. } => out.push(column),
            Self::And(branches) | Self::Or(branches) => {
                for branch in branches {
                    branch.collect_columns(out);
                }
            }
        }
    }

    /// Evaluate against a row, resolving sub-queries through `tables`.
    pub fn evaluate(&self, row: &Record, tables: &dyn TableSource) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Field(filter) => filter.matches(row.get(&filter.field)),
            Self::InSubquery { column, subquery } => {
                let actual = row.get(column);
                if actual.is_null() {
                    return false;
                }
                tables
                    .rows(&subquery.table)
                    .iter()
                    .filter(|inner| subquery.predicate.evaluate(inner, tables))
                    .any(|inner| {
                        inner.get(&subquery.select).compare(actual)
                            == Some(std::cmp::Ordering::Equal)
                    })
            }
            Self::And(branches) => branches.iter().all(|b| b.evaluate(row, tables)),
            Self::Or(branches) => branches.iter().any(|b| b.evaluate(row, tables)),
        }
    }
}

impl From<FilterField> for Predicate {
    fn from(filter: FilterField) -> Self {
        Self::Field(filter)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("TRUE"),
            Self::Never => f.write_str("FALSE"),
            Self::Field(filter) => write!(f, "{filter}"),
            Self::InSubquery { column, subquery } => write!(
                f,
                "{column} IN (SELECT {} FROM {} WHERE {})",
                subquery.select, subquery.table, subquery.predicate
            ),
            Self::And(branches) => write_joined(f, branches, " AND "),
            Self::Or(branches) => write_joined(f, branches, " OR "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, branches: &[Predicate], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, branch) in branches.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{branch}")?;
    }
    f.write_str(")")
}

/// Whether `name` is a plain lower-case SQL identifier (`[a-z_][a-z0-9_]*`).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use uuid::Uuid;

    use super::*;

    struct Tables(HashMap<&'static str, Vec<Record>>);

    impl TableSource for Tables {
        fn rows(&self, table: &str) -> Vec<Record> {
            self.0.get(table).cloned().unwrap_or_default()
        }
    }

    #[test]
    fn test_constant_folding() {
        let leaf = Predicate::field(FilterField::eq("status", "active"));
        assert_eq!(Predicate::Always.and(leaf.clone()), leaf);
        assert!(Predicate::Never.and(leaf.clone()).is_never());
        assert!(Predicate::Always.or(leaf.clone()).is_always());
        assert!(Predicate::any(Vec::new()).is_never());
        assert!(Predicate::all(Vec::new()).is_always());
    }

    #[test]
    fn test_nested_and_is_flattened() {
        let a = Predicate::field(FilterField::eq("a", 1));
        let b = Predicate::field(FilterField::eq("b", 2));
        let c = Predicate::field(FilterField::eq("c", 3));
        let combined = a.clone().and(b.clone()).and(c.clone());
        assert_eq!(combined, Predicate::And(vec![a, b, c]));
    }

    #[test]
    fn test_subquery_evaluation() {
        let org = Uuid::new_v4();
        let inside = Uuid::new_v4();
        let outside = Uuid::new_v4();
        let tables = Tables(HashMap::from([(
            "hospitals",
            vec![
                Record::new().with("id", inside).with("organization_id", org),
                Record::new()
                    .with("id", outside)
                    .with("organization_id", Uuid::new_v4()),
            ],
        )]));

        let predicate = Predicate::in_subquery(
            "hospital_id",
            SubQuery {
                table: "hospitals".into(),
                select: "id".into(),
                predicate: FilterField::in_uuids("organization_id", [org]).into(),
            },
        );

        assert!(predicate.evaluate(&Record::new().with("hospital_id", inside), &tables));
        assert!(!predicate.evaluate(&Record::new().with("hospital_id", outside), &tables));
        assert!(!predicate.evaluate(&Record::new(), &tables));
    }

    #[test]
    fn test_subquery_with_never_folds() {
        let predicate = Predicate::in_subquery(
            "hospital_id",
            SubQuery {
                table: "hospitals".into(),
                select: "id".into(),
                predicate: Predicate::Never,
            },
        );
        assert!(predicate.is_never());
    }

    #[test]
    fn test_columns_skip_subquery_internals() {
        let predicate = Predicate::field(FilterField::eq("status", "active")).and(
            Predicate::in_subquery(
                "department_id",
                SubQuery {
                    table: "departments".into(),
                    select: "id".into(),
                    predicate: FilterField::eq("hospital_id", Uuid::new_v4()).into(),
                },
            ),
        );
        assert_eq!(predicate.columns(), vec!["status", "department_id"]);
    }

    #[test]
    fn test_identifier_check() {
        assert!(is_identifier("hospital_id"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("id; DROP TABLE patients"));
        assert!(!is_identifier("Name"));
        assert!(!is_identifier(""));
    }
}
