//! Sorting types for list queries.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::record::Record;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Return the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A sort specification consisting of a column name and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    /// Column name to sort by.
    pub field: String,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortField {
    /// Create a new sort field.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Create an ascending sort on the given column.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    /// Create a descending sort on the given column.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Order two records on this column with PostgreSQL's default null
    /// placement (nulls last ascending, first descending).
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let (left, right) = (a.get(&self.field), b.get(&self.field));
        let ordering = match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => left.compare(right).unwrap_or(Ordering::Equal),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Compare two records by a list of sort fields, first difference wins.
pub fn compare_by(sort: &[SortField], a: &Record, b: &Record) -> Ordering {
    sort.iter()
        .map(|field| field.compare(a, b))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nulls_last_ascending() {
        let a = Record::new().with("family_name", "Doe");
        let b = Record::new();
        assert_eq!(SortField::asc("family_name").compare(&a, &b), Ordering::Less);
        assert_eq!(SortField::desc("family_name").compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_compare_by_uses_tiebreaker() {
        let a = Record::new().with("family_name", "Doe").with("given_name", "Ann");
        let b = Record::new().with("family_name", "Doe").with("given_name", "Bob");
        let sort = [SortField::asc("family_name"), SortField::desc("given_name")];
        assert_eq!(compare_by(&sort, &a, &b), Ordering::Greater);
    }
}
