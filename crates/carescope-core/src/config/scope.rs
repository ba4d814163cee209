//! Tenant scope enforcement configuration.

use serde::{Deserialize, Serialize};

use crate::types::tenant::TenantLevel;

/// Settings for the tenant scope enforcement engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// Reject contexts whose active organization/hospital id lies outside a
    /// non-empty permitted set of the same level.
    #[serde(default = "default_true")]
    pub enforce_active_membership: bool,
    /// Table names of the tenant hierarchy, used for two-hop relation paths.
    #[serde(default)]
    pub tables: TenantTables,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            enforce_active_membership: true,
            tables: TenantTables::default(),
        }
    }
}

/// Table names backing each tenant level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantTables {
    /// Organization table.
    #[serde(default = "default_organizations")]
    pub organizations: String,
    /// Hospital table.
    #[serde(default = "default_hospitals")]
    pub hospitals: String,
    /// Department table.
    #[serde(default = "default_departments")]
    pub departments: String,
}

impl TenantTables {
    /// Return the table holding rows of the given tenant level.
    pub fn table_for(&self, level: TenantLevel) -> &str {
        match level {
            TenantLevel::Organization => &self.organizations,
            TenantLevel::Hospital => &self.hospitals,
            TenantLevel::Department => &self.departments,
        }
    }
}

impl Default for TenantTables {
    fn default() -> Self {
        Self {
            organizations: default_organizations(),
            hospitals: default_hospitals(),
            departments: default_departments(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_organizations() -> String {
    "organizations".to_string()
}

fn default_hospitals() -> String {
    "hospitals".to_string()
}

fn default_departments() -> String {
    "departments".to_string()
}
