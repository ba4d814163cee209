//! Referral entity model.

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

use super::status::ReferralStatus;

/// A patient referral from one hospital to another.
///
/// The referral is owned by the sending hospital. The receiving hospital
/// (`target_hospital_id`) is not a tenant attribute; the receiving side finds
/// its incoming referrals through an explicit query on that column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Referral {
    /// Unique referral identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Option<OrganizationId>,
    /// Sending hospital.
    pub hospital_id: Option<HospitalId>,
    /// Receiving hospital.
    pub target_hospital_id: HospitalId,
    /// The referred patient.
    pub patient_id: Uuid,
    /// Clinical reason for the referral.
    pub reason: String,
    #[sqlx(try_from = "String")]
    pub status: ReferralStatus,
    /// When the referral was sent.
    pub created_at: DateTime<Utc>,
}

impl Referral {
    /// Create a pending referral; sender tenant ids are left for stamping.
    pub fn send(patient_id: Uuid, target_hospital_id: HospitalId, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id: None,
            hospital_id: None,
            target_hospital_id,
            patient_id,
            reason: reason.into(),
            status: ReferralStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Set the sending hospital.
    pub fn from_hospital(mut self, organization_id: OrganizationId, hospital_id: HospitalId) -> Self {
        self.organization_id = Some(organization_id);
        self.hospital_id = Some(hospital_id);
        self
    }
}

impl Entity for Referral {
    const NAME: &'static str = "Referral";
    const TABLE: &'static str = "referrals";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "organization_id",
        "hospital_id",
        "target_hospital_id",
        "patient_id",
        "reason",
        "status",
        "created_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("organization_id", self.organization_id)
            .with("hospital_id", self.hospital_id)
            .with("target_hospital_id", self.target_hospital_id)
            .with("patient_id", self.patient_id)
            .with("reason", self.reason.as_str())
            .with("status", self.status.as_str())
            .with("created_at", self.created_at)
    }

    fn from_record(record: &Record) -> AppResult<Self> {
        Ok(Self {
            id: record.uuid("id")?,
            organization_id: record.opt_id("organization_id")?,
            hospital_id: record.opt_id("hospital_id")?,
            target_hospital_id: record.id("target_hospital_id")?,
            patient_id: record.uuid("patient_id")?,
            reason: record.string("reason")?,
            status: record.string("status")?.parse()?,
            created_at: record.timestamp("created_at")?,
        })
    }
}

impl TenantBound for Referral {
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
