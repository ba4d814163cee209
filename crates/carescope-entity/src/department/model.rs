//! Department entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use carescope_core::AppResult;
use carescope_core::traits::entity::Entity;
use carescope_core::types::id::{DepartmentId, HospitalId, OrganizationId};
use carescope_core::types::record::Record;
use carescope_core::types::tenant::TenantLevel;
use carescope_tenant::entity::{EntityShape, TenantBound, TenantIds};

/// A clinical department inside a hospital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Department {
    /// Unique department identifier.
    pub id: DepartmentId,
    /// Owning organization, stored directly for organization-wide queries.
    pub organization_id: Option<OrganizationId>,
    /// Owning hospital.
    pub hospital_id: Option<HospitalId>,
    /// Display name.
    pub name: String,
    /// Medical specialty (cardiology, oncology, ...).
    pub specialty: Option<String>,
    /// When the department was created.
    pub created_at: DateTime<Utc>,
}

impl Department {
    /// Create a department with tenant ids left for stamping.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: DepartmentId::new(),
            organization_id: None,
            hospital_id: None,
            name: name.into(),
            specialty: None,
            created_at: Utc::now(),
        }
    }

    /// Place the department in a hospital of an organization.
    pub fn in_hospital(mut self, organization_id: OrganizationId, hospital_id: HospitalId) -> Self {
        self.organization_id = Some(organization_id);
        self.hospital_id = Some(hospital_id);
        self
    }

    /// Set the specialty.
    pub fn with_specialty(mut self, specialty: impl Into<String>) -> Self {
        self.specialty = Some(specialty.into());
        self
    }
}

impl Entity for Department {
    const NAME: &'static str = "Department";
    const TABLE: &'static str = "departments";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "organization_id",
        "hospital_id",
        "name",
        "specialty",
        "created_at",
    ];

    fn id(&self) -> Uuid {
        self.id.into_uuid()
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("organization_id", self.organization_id)
            .with("hospital_id", self.hospital_id)
            .with("name", self.name.as_str())
            .with("specialty", self.specialty.clone())
            .with("created_at", self.created_at)
    }

    fn from_record(record: &Record) -> AppResult<Self> {
        Ok(Self {
            id: record.id("id")?,
            organization_id: record.opt_id("organization_id")?,
            hospital_id: record.opt_id("hospital_id")?,
            name: record.string("name")?,
            specialty: record.opt_string("specialty")?,
            created_at: record.timestamp("created_at")?,
        })
    }
}

impl TenantBound for Department {
    fn shape() -> EntityShape {
        EntityShape::new()
            .field(TenantLevel::Organization)
            .relation(TenantLevel::Hospital, "hospital_id")
    }

    fn tenant_ids(&self) -> TenantIds {
        TenantIds {
            organization_id: self.organization_id,
            hospital_id: self.hospital_id,
            department_id: None,
        }
    }

    fn with_tenant_ids(self, ids: TenantIds) -> Self {
        Self {
            organization_id: ids.organization_id,
            hospital_id: ids.hospital_id,
            ..self
        }
    }
}
