//! Patient entity model.

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

use super::status::PatientStatus;

/// A patient registered at a hospital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Patient {
    /// Unique patient identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Option<OrganizationId>,
    /// Registering hospital.
    pub hospital_id: Option<HospitalId>,
    /// Medical record number, unique within the hospital.
    pub medical_record_number: String,
    /// Full legal name.
    pub full_name: String,
    /// Date of birth.
    pub born_at: Option<DateTime<Utc>>,
    /// Record status.
    #[sqlx(try_from = "String")]
    pub status: PatientStatus,
    /// When the patient was registered.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Create an active patient with tenant ids left for stamping.
    pub fn new(medical_record_number: impl Into<String>, full_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            organization_id: None,
            hospital_id: None,
            medical_record_number: medical_record_number.into(),
            full_name: full_name.into(),
            born_at: None,
            status: PatientStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Register the patient at a hospital of an organization.
    pub fn at_hospital(mut self, organization_id: OrganizationId, hospital_id: HospitalId) -> Self {
        self.organization_id = Some(organization_id);
        self.hospital_id = Some(hospital_id);
        self
    }
}

impl Entity for Patient {
    const NAME: &'static str = "Patient";
    const TABLE: &'static str = "patients";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "organization_id",
        "hospital_id",
        "medical_record_number",
        "full_name",
        "born_at",
        "status",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("organization_id", self.organization_id)
            .with("hospital_id", self.hospital_id)
            .with("medical_record_number", self.medical_record_number.as_str())
            .with("full_name", self.full_name.as_str())
            .with("born_at", self.born_at)
            .with("status", self.status.as_str())
            .with("created_at", self.created_at)
            .with("updated_at", self.updated_at)
    }

    fn from_record(record: &Record) -> AppResult<Self> {
        Ok(Self {
            id: record.uuid("id")?,
            organization_id: record.opt_id("organization_id")?,
            hospital_id: record.opt_id("hospital_id")?,
            medical_record_number: record.string("medical_record_number")?,
            full_name: record.string("full_name")?,
            born_at: record.opt_timestamp("born_at")?,
            status: record.string("status")?.parse()?,
            created_at: record.timestamp("created_at")?,
            updated_at: record.timestamp("updated_at")?,
        })
    }
}

impl TenantBound for Patient {
    fn shape() -> EntityShape {
        EntityShape::new()
            .field(TenantLevel::Organization)
            .field(TenantLevel::Hospital)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_survives_record_conversion() {
        let mut patient = Patient::new("MRN-1", "Ada Lovelace");
        patient.status = PatientStatus::Discharged;
        let restored = Patient::from_record(&patient.to_record()).expect("restore");
        assert_eq!(restored.status, PatientStatus::Discharged);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let record = Patient::new("MRN-1", "Ada Lovelace")
            .to_record()
            .with("status", "archived");
        assert!(Patient::from_record(&record).is_err());
    }

    #[test]
    fn test_apply_context_keeps_registered_hospital() {
        let org = OrganizationId::new();
        let own = HospitalId::new();
        let patient = Patient::new("MRN-1", "Ada Lovelace").at_hospital(org, own);
        let ctx = carescope_tenant::TenantContext::builder()
            .active_organization(OrganizationId::new())
            .active_hospital(HospitalId::new())
            .build()
            .expect("valid");
        let stamped = patient.apply_context(&ctx);
        assert_eq!(stamped.hospital_id, Some(own));
        assert_eq!(stamped.organization_id, Some(org));
    }
}
