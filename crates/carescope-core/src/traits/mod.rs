//! Core traits defined in `carescope-core` and implemented by other crates.

pub mod entity;

pub use entity::Entity;
