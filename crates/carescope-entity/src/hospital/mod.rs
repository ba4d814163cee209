//! Hospital entities.

pub mod model;

pub use model::Hospital;
