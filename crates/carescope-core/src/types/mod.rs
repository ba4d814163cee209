//! Core type definitions used across the CareScope workspace.

pub mod filter;
pub mod id;
pub mod pagination;
pub mod predicate;
pub mod record;
pub mod sorting;
pub mod tenant;

pub use filter::{FilterField, FilterOp, FilterValue};
pub use id::*;
pub use pagination::{PageRequest, PageResponse};
pub use predicate::{NoTables, Predicate, SubQuery, TableSource};
pub use record::Record;
pub use sorting::{SortDirection, SortField};
pub use tenant::TenantLevel;
