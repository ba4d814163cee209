//! Tenant context model and propagation.

pub mod claims;
pub mod model;
pub mod store;

pub use claims::TenantClaims;
pub use model::{TenantContext, TenantContextBuilder};
pub use store::{ContextGuard, ContextStore};
