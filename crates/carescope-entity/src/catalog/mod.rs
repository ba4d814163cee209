//! Drug catalog entities.

pub mod model;

pub use model::DrugCatalogEntry;
