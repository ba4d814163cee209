//! Hospital entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use carescope_core::AppResult;
use carescope_core::traits::entity::Entity;
use carescope_core::types::id::{HospitalId, OrganizationId};
use carescope_core::types::record::Record;
use carescope_core::types::tenant::TenantLevel;
use carescope_tenant::entity::{EntityShape, TenantBound, TenantIds};

/// A hospital owned by an organization.
///
/// Hospitals reference their organization through a many-to-one relation
/// and carry no hospital-level scope of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Hospital {
    /// Unique hospital identifier.
    pub id: HospitalId,
    /// Owning organization.
    pub organization_id: Option<OrganizationId>,
    /// Display name.
    pub name: String,
    /// Short code unique within the organization.
    pub code: String,
    /// Whether the hospital accepts new encounters.
    pub active: bool,
    /// When the hospital was created.
    pub created_at: DateTime<Utc>,
}

impl Hospital {
    /// Create an active hospital; the organization is left for stamping.
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: HospitalId::new(),
            organization_id: None,
            name: name.into(),
            code: code.into(),
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Set the owning organization.
    pub fn in_organization(mut self, organization_id: OrganizationId) -> Self {
        self.organization_id = Some(organization_id);
        self
    }
}

impl Entity for Hospital {
    const NAME: &'static str = "Hospital";
    const TABLE: &'static str = "hospitals";
    const COLUMNS: &'static [&'static str] =
        &["id", "organization_id", "name", "code", "active", "created_at"];

    fn id(&self) -> Uuid {
        self.id.into_uuid()
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("organization_id", self.organization_id)
            .with("name", self.name.as_str())
            .with("code", self.code.as_str())
            .with("active", self.active)
            .with("created_at", self.created_at)
    }

    fn from_record(record: &Record) -> AppResult<Self> {
        Ok(Self {
            id: record.id("id")?,
            organization_id: record.opt_id("organization_id")?,
            name: record.string("name")?,
            code: record.string("code")?,
            active: record.boolean("active")?,
            created_at: record.timestamp("created_at")?,
        })
    }
}

impl TenantBound for Hospital {
    fn shape() -> EntityShape {
        EntityShape::new().relation(TenantLevel::Organization, "organization_id")
    }

    fn tenant_ids(&self) -> TenantIds {
        TenantIds {
            organization_id: self.organization_id,
            ..Default::default()
        }
    }

    fn with_tenant_ids(self, ids: TenantIds) -> Self {
        Self {
            organization_id: ids.organization_id,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_conversion_preserves_fields() {
        let hospital = Hospital::new("St. Mary", "SMH").in_organization(OrganizationId::new());
        let restored = Hospital::from_record(&hospital.to_record()).expect("restore");
        assert_eq!(restored, hospital);
    }

    #[test]
    fn test_record_covers_every_column() {
        let record = Hospital::new("St. Mary", "SMH").to_record();
        let columns: Vec<_> = record.columns().collect();
        for column in Hospital::COLUMNS {
            assert!(columns.contains(column), "missing {column}");
        }
    }
}
