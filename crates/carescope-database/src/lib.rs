//! # carescope-database
//!
//! PostgreSQL connection management, entity stores, and the tenant-scoped
//! repositories for all CareScope clinical records.

pub mod connection;
pub mod repositories;
pub mod scoped;
pub mod sql;
pub mod store;

pub use scoped::{ScopeEnforcer, ScopedRepository};
pub use store::{EntityStore, MemoryDatabase, MemoryEntityStore, PgEntityStore, SelectQuery};
