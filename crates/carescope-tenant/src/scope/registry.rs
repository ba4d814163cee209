//! Startup registry of tenant-scoped record types.

use std::any::TypeId;
use std::collections::HashMap;

use tracing::debug;

use carescope_core::error::AppError;

use crate::entity::TenantBound;

use super::descriptor::ScopeDescriptor;

/// Immutable map from record type to its [`ScopeDescriptor`].
///
/// A type that was never registered is not tenant-scoped: the predicate
/// builder returns "always true" for it and the stamping hook leaves it
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct ScopeRegistry {
    by_type: HashMap<TypeId, ScopeDescriptor>,
}

impl ScopeRegistry {
    /// Start a registry.
    pub fn builder() -> ScopeRegistryBuilder {
        ScopeRegistryBuilder::default()
    }

    /// Descriptor of `E`, or `None` when `E` is unscoped.
    pub fn descriptor<E: 'static>(&self) -> Option<&ScopeDescriptor> {
        self.by_type.get(&TypeId::of::<E>())
    }

    /// Whether `E` is tenant-scoped.
    pub fn is_scoped<E: 'static>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<E>())
    }

    /// All descriptors ordered by entity name.
    pub fn descriptors(&self) -> Vec<&ScopeDescriptor> {
        let mut all: Vec<&ScopeDescriptor> = self.by_type.values().collect();
        all.sort_by_key(|desc| desc.entity);
        all
    }

    /// Look a descriptor up by entity or table name, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<&ScopeDescriptor> {
        self.by_type.values().find(|desc| {
            desc.entity.eq_ignore_ascii_case(name) || desc.table.eq_ignore_ascii_case(name)
        })
    }

    /// Look a descriptor up by its exact table name.
    pub fn find_by_table(&self, table: &str) -> Option<&ScopeDescriptor> {
        self.by_type.values().find(|desc| desc.table == table)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

/// Collects descriptors at startup.
#[derive(Debug, Default)]
pub struct ScopeRegistryBuilder {
    by_type: HashMap<TypeId, ScopeDescriptor>,
}

impl ScopeRegistryBuilder {
    /// Register `E` as tenant-scoped.
    ///
    /// Fails when `E` is already registered, when its shape reaches no tenant
    /// level, or when a declared column is missing from `E::COLUMNS`.
    pub fn register<E: TenantBound>(mut self) -> Result<Self, AppError> {
        let type_id = TypeId::of::<E>();
        if self.by_type.contains_key(&type_id) {
            return Err(AppError::configuration(format!(
                "Entity '{}' is registered twice",
                E::NAME
            )));
        }

        let descriptor = ScopeDescriptor::of::<E>();
        if !descriptor.is_filterable() {
            return Err(AppError::configuration(format!(
                "Entity '{}' declares no tenant attribute",
                E::NAME
            )));
        }

        if let Some(column) = E::shape().columns().find(|column| !E::has_column(column)) {
            return Err(AppError::configuration(format!(
                "Entity '{}' declares tenant column '{column}' missing from table '{}'",
                E::NAME,
                E::TABLE
            )));
        }

        debug!(
            entity = E::NAME,
            table = E::TABLE,
            organization = %descriptor.organization,
            hospital = %descriptor.hospital,
            department = %descriptor.department,
            "Registered scoped entity"
        );

        self.by_type.insert(type_id, descriptor);
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> ScopeRegistry {
        debug!(entities = self.by_type.len(), "Scope registry built");
        ScopeRegistry {
            by_type: self.by_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Bed, Formulary, Order, Visit};

    fn registry() -> ScopeRegistry {
        ScopeRegistry::builder()
            .register::<Visit>()
            .and_then(|b| b.register::<Order>())
            .and_then(|b| b.register::<Bed>())
            .expect("registration")
            .build()
    }

    #[test]
    fn test_lookup_by_type() {
        let registry = registry();
        assert!(registry.is_scoped::<Visit>());
        assert!(!registry.is_scoped::<Formulary>());
        assert_eq!(registry.descriptor::<Order>().map(|d| d.table), Some("orders"));
    }

    #[test]
    fn test_descriptors_sorted_by_name() {
        let names: Vec<_> = registry().descriptors().iter().map(|d| d.entity).collect();
        assert_eq!(names, vec!["Bed", "Order", "Visit"]);
    }

    #[test]
    fn test_find_by_name_accepts_table() {
        let registry = registry();
        assert_eq!(registry.find_by_name("visits").map(|d| d.entity), Some("Visit"));
        assert_eq!(registry.find_by_name("bed").map(|d| d.entity), Some("Bed"));
        assert!(registry.find_by_name("unknown").is_none());
    }

    #[test]
    fn test_find_by_table_is_exact() {
        let registry = registry();
        assert_eq!(registry.find_by_table("orders").map(|d| d.entity), Some("Order"));
        assert!(registry.find_by_table("Order").is_none());
        assert!(registry.find_by_table("formularies").is_none());
    }

    #[test]
    fn test_registering_unscoped_type_fails() {
        let err = ScopeRegistry::builder()
            .register::<Formulary>()
            .expect_err("no tenant attribute");
        assert!(err.message.contains("Formulary"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let result = ScopeRegistry::builder()
            .register::<Visit>()
            .and_then(|b| b.register::<Visit>());
        assert!(result.is_err());
    }
}
