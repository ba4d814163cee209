//! Encounter entity model.

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

use super::kind::EncounterKind;

/// A single patient visit or stay, owned by all three tenant levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Encounter {
    /// Unique encounter identifier.
    pub id: Uuid,
    pub organization_id: Option<OrganizationId>,
    pub hospital_id: Option<HospitalId>,
    pub department_id: Option<DepartmentId>,
    /// The patient seen.
    pub patient_id: Uuid,
    /// Care setting.
    #[sqlx(try_from = "String")]
    pub kind: EncounterKind,
    /// When the encounter started.
    pub started_at: DateTime<Utc>,
    /// When the encounter ended, if it has.
    pub ended_at: Option<DateTime<Utc>>,
}

impl Encounter {
    /// Open an encounter now; tenant ids are left for stamping.
    pub fn open(patient_id: Uuid, kind: EncounterKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id: None,
            hospital_id: None,
            department_id: None,
            patient_id,
            kind,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Whether the encounter is still ongoing.
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Close the encounter now.
    pub fn close(self) -> Self {
        Self {
            ended_at: Some(Utc::now()),
            ..self
        }
    }
}

impl Entity for Encounter {
    const NAME: &'static str = "Encounter";
    const TABLE: &'static str = "encounters";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "organization_id",
        "hospital_id",
        "department_id",
        "patient_id",
        "kind",
        "started_at",
        "ended_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("organization_id", self.organization_id)
            .with("hospital_id", self.hospital_id)
            .with("department_id", self.department_id)
            .with("patient_id", self.patient_id)
            .with("kind", self.kind.as_str())
            .with("started_at", self.started_at)
            .with("ended_at", self.ended_at)
    }

    fn from_record(record: &Record) -> AppResult<Self> {
        Ok(Self {
            id: record.uuid("id")?,
            organization_id: record.opt_id("organization_id")?,
            hospital_id: record.opt_id("hospital_id")?,
            department_id: record.opt_id("department_id")?,
            patient_id: record.uuid("patient_id")?,
            kind: record.string("kind")?.parse()?,
            started_at: record.timestamp("started_at")?,
            ended_at: record.opt_timestamp("ended_at")?,
        })
    }
}

impl TenantBound for Encounter {
    fn shape() -> EntityShape {
        EntityShape::new()
            .field(TenantLevel::Organization)
            .field(TenantLevel::Hospital)
            .field(TenantLevel::Department)
    }

    fn tenant_ids(&self) -> TenantIds {
        TenantIds {
            organization_id: self.organization_id,
            hospital_id: self.hospital_id,
            department_id: self.department_id,
        }
    }

    fn with_tenant_ids(self, ids: TenantIds) -> Self {
        Self {
            organization_id: ids.organization_id,
            hospital_id: ids.hospital_id,
            department_id: ids.department_id,
            ..self
        }
    }
}
