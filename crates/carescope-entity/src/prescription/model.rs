//! Prescription entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use carescope_core::AppResult;
use carescope_core::traits::entity::Entity;
use carescope_core::types::id::DepartmentId;
use carescope_core::types::record::Record;
use carescope_core::types::tenant::TenantLevel;
use carescope_tenant::entity::{EntityShape, TenantBound, TenantIds};

use super::status::PrescriptionStatus;

/// A medication order issued by a department.
///
/// Only the issuing department is stored; hospital and organization scope
/// are derived through the department row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Prescription {
    /// Unique prescription identifier.
    pub id: Uuid,
    /// Issuing department.
    pub department_id: Option<DepartmentId>,
    /// The patient the medication is for.
    pub patient_id: Uuid,
    /// Drug catalog code.
    pub drug_code: String,
    /// Free-text dosage instruction.
    pub dosage: String,
    #[sqlx(try_from = "String")]
    pub status: PrescriptionStatus,
    /// When the prescription was issued.
    pub prescribed_at: DateTime<Utc>,
}

impl Prescription {
    /// Issue an active prescription; the department is left for stamping.
    pub fn issue(
        patient_id: Uuid,
        drug_code: impl Into<String>,
        dosage: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            department_id: None,
            patient_id,
            drug_code: drug_code.into(),
            dosage: dosage.into(),
            status: PrescriptionStatus::Active,
            prescribed_at: Utc::now(),
        }
    }

    /// Set the issuing department.
    pub fn from_department(mut self, department_id: DepartmentId) -> Self {
        self.department_id = Some(department_id);
        self
    }
}

impl Entity for Prescription {
    const NAME: &'static str = "Prescription";
    const TABLE: &'static str = "prescriptions";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "department_id",
        "patient_id",
        "drug_code",
        "dosage",
        "status",
        "prescribed_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("department_id", self.department_id)
            .with("patient_id", self.patient_id)
            .with("drug_code", self.drug_code.as_str())
            .with("dosage", self.dosage.as_str())
            .with("status", self.status.as_str())
            .with("prescribed_at", self.prescribed_at)
    }

    fn from_record(record: &Record) -> AppResult<Self> {
        Ok(Self {
            id: record.uuid("id")?,
            department_id: record.opt_id("department_id")?,
            patient_id: record.uuid("patient_id")?,
            drug_code: record.string("drug_code")?,
            dosage: record.string("dosage")?,
            status: record.string("status")?.parse()?,
            prescribed_at: record.timestamp("prescribed_at")?,
        })
    }
}

impl TenantBound for Prescription {
    fn shape() -> EntityShape {
        EntityShape::new().relation(TenantLevel::Department, "department_id")
    }

    fn tenant_ids(&self) -> TenantIds {
        TenantIds {
            department_id: self.department_id,
            ..Default::default()
        }
    }

    fn with_tenant_ids(self, ids: TenantIds) -> Self {
        Self {
            department_id: ids.department_id,
            ..self
        }
    }
}
