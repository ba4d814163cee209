//! Per-type scope descriptors.

use std::fmt;

use serde::Serialize;

use carescope_core::types::tenant::TenantLevel;

use crate::entity::TenantBound;

use super::path::{ScopePath, resolve_path};

/// Resolved tenant paths of one record type, computed once at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeDescriptor {
    pub entity: &'static str,
    pub table: &'static str,
    pub id_column: &'static str,
    pub organization: ScopePath,
    pub hospital: ScopePath,
    pub department: ScopePath,
}

impl ScopeDescriptor {
    /// Resolve every level from the type's declared shape.
    pub fn of<E: TenantBound>() -> Self {
        let shape = E::shape();
        Self {
            entity: E::NAME,
            table: E::TABLE,
            id_column: E::ID_COLUMN,
            organization: resolve_path(TenantLevel::Organization, &shape),
            hospital: resolve_path(TenantLevel::Hospital, &shape),
            department: resolve_path(TenantLevel::Department, &shape),
        }
    }

    /// Path to `level`.
    pub fn path(&self, level: TenantLevel) -> &ScopePath {
        match level {
            TenantLevel::Organization => &self.organization,
            TenantLevel::Hospital => &self.hospital,
            TenantLevel::Department => &self.department,
        }
    }

    /// Levels with a resolved path, outermost first.
    pub fn applicable_levels(&self) -> impl Iterator<Item = TenantLevel> + '_ {
        TenantLevel::ALL
            .into_iter()
            .filter(|level| self.path(*level).is_applicable())
    }

    /// Whether any level is reachable.
    pub fn is_filterable(&self) -> bool {
        self.applicable_levels().next().is_some()
    }

    /// Whether the record stores the id of `level` itself.
    pub fn stamps(&self, level: TenantLevel) -> bool {
        self.path(level).is_stampable()
    }

    /// Own-table columns the paths compare against.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = Vec::new();
        for level in TenantLevel::ALL {
            let column = match self.path(level) {
                ScopePath::Direct { column }
                | ScopePath::Relation { column, .. }
                | ScopePath::Nested { column, .. } => *column,
                ScopePath::NotApplicable => continue,
            };
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        columns
    }
}

impl fmt::Display for ScopeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): organization={}, hospital={}, department={}",
            self.entity, self.table, self.organization, self.hospital, self.department
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Bed, Formulary, Order, Visit};

    #[test]
    fn test_direct_descriptor() {
        let desc = ScopeDescriptor::of::<Visit>();
        assert_eq!(desc.table, "visits");
        assert!(desc.stamps(TenantLevel::Organization));
        assert!(desc.stamps(TenantLevel::Hospital));
        assert_eq!(desc.department, ScopePath::NotApplicable);
        assert_eq!(desc.columns(), vec!["organization_id", "hospital_id"]);
    }

    #[test]
    fn test_nested_descriptor_shares_column() {
        let desc = ScopeDescriptor::of::<Order>();
        assert_eq!(desc.applicable_levels().count(), 3);
        assert_eq!(desc.columns(), vec!["department_id"]);
        assert!(!desc.stamps(TenantLevel::Hospital));
        assert!(desc.stamps(TenantLevel::Department));
    }

    #[test]
    fn test_bed_reaches_organization_through_hospital() {
        let desc = ScopeDescriptor::of::<Bed>();
        assert_eq!(
            desc.organization.attribute_path(TenantLevel::Organization),
            Some("hospital.organization.id".to_string())
        );
    }

    #[test]
    fn test_unscoped_descriptor_is_not_filterable() {
        assert!(!ScopeDescriptor::of::<Formulary>().is_filterable());
    }
}
