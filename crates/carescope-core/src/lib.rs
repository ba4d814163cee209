//! # carescope-core
//!
//! Core crate for CareScope. Contains configuration schemas, typed tenant
//! identifiers, the filter/predicate model shared by every storage backend,
//! pagination/sorting types, the persistence `Entity` contract, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other CareScope crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
