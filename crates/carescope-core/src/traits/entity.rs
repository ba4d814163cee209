//! Persistence contract for record types.

use uuid::Uuid;

use crate::result::AppResult;
use crate::types::record::Record;

/// A record type stored in one table with a UUID primary key.
///
/// Storage backends use the associated constants to build statements and
/// to reject filters on columns the table does not have. Conversions to and
/// from [`Record`] serve writes and backends that evaluate predicates
/// in-process.
pub trait Entity: Clone + Send + Sync + Unpin + 'static {
    /// Human-readable type name, used in logs and not-found messages.
    const NAME: &'static str;
    /// Table name.
    const TABLE: &'static str;
    /// Primary key column.
    const ID_COLUMN: &'static str = "id";
    /// Every column of the table, primary key included.
    const COLUMNS: &'static [&'static str];

    /// Primary key value.
    fn id(&self) -> Uuid;

    /// Convert into a column map covering every column in [`Entity::COLUMNS`].
    fn to_record(&self) -> Record;

    /// Rebuild from a column map.
    fn from_record(record: &Record) -> AppResult<Self>;

    /// Whether the table has a column with this name.
    fn has_column(column: &str) -> bool {
        Self::COLUMNS.contains(&column)
    }
}
