//! Scope path resolution, the descriptor registry, and predicate building.

pub mod descriptor;
pub mod path;
pub mod predicate;
pub mod registry;

pub use descriptor::ScopeDescriptor;
pub use path::{PathCandidate, ScopePath, resolve_path};
pub use predicate::ScopePredicateBuilder;
pub use registry::{ScopeRegistry, ScopeRegistryBuilder};
