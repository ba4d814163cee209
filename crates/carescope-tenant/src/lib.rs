//! # carescope-tenant
//!
//! Row-level tenant isolation for CareScope.
//!
//! ## Modules
//!
//! - `context`: the immutable tenant context, its builder and claims form,
//!   and the call-chain scoped propagation store
//! - `entity`: the contract tenant-bound record types implement
//! - `scope`: per-type path descriptors, the startup registry, and the
//!   scope predicate builder
//! - `stamping`: fills unset tenant identifiers before writes
//! - `expression`: read-only access to context fields for hand-written queries

pub mod context;
pub mod entity;
pub mod expression;
pub mod scope;
pub mod stamping;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{ContextGuard, ContextStore, TenantClaims, TenantContext, TenantContextBuilder};
pub use entity::{EntityShape, TenantBound, TenantIds};
pub use expression::{ExpressionValue, TenantExpressions};
pub use scope::{ScopeDescriptor, ScopePath, ScopePredicateBuilder, ScopeRegistry};
pub use stamping::ScopeStamper;
