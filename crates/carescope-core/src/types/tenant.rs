//! Tenant hierarchy levels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three nested ownership levels a record can belong to.
///
/// Organizations own hospitals, hospitals own departments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantLevel {
    /// Top level.
    Organization,
    /// Owned by an organization.
    Hospital,
    /// Owned by a hospital.
    Department,
}

impl TenantLevel {
    /// All levels, outermost first.
    pub const ALL: [TenantLevel; 3] = [Self::Organization, Self::Hospital, Self::Department];

    /// Conventional foreign-key / identifier column name for this level.
    pub fn id_column(&self) -> &'static str {
        match self {
            Self::Organization => "organization_id",
            Self::Hospital => "hospital_id",
            Self::Department => "department_id",
        }
    }

    /// Attribute name of a relation pointing at this level.
    pub fn relation_name(&self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Hospital => "hospital",
            Self::Department => "department",
        }
    }

    /// Attribute name of a direct identifier field for this level.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Organization => "organizationId",
            Self::Hospital => "hospitalId",
            Self::Department => "departmentId",
        }
    }
}

impl fmt::Display for TenantLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.relation_name())
    }
}
