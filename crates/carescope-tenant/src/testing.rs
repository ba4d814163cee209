//! Record types shared by the unit tests of this crate.

use uuid::Uuid;

use carescope_core::AppResult;
use carescope_core::traits::entity::Entity;
use carescope_core::types::id::{DepartmentId, HospitalId, OrganizationId};
use carescope_core::types::record::Record;
use carescope_core::types::tenant::TenantLevel;

use crate::entity::{EntityShape, TenantBound, TenantIds};

/// Direct organization and hospital fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    pub id: Uuid,
    pub organization_id: Option<OrganizationId>,
    pub hospital_id: Option<HospitalId>,
}

impl Visit {
    pub fn new(organization_id: Option<OrganizationId>, hospital_id: Option<HospitalId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            hospital_id,
        }
    }
}

impl Entity for Visit {
    const NAME: &'static str = "Visit";
    const TABLE: &'static str = "visits";
    const COLUMNS: &'static [&'static str] = &["id", "organization_id", "hospital_id"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("organization_id", self.organization_id)
            .with("hospital_id", self.hospital_id)
    }

    fn from_record(record: &Record) -> AppResult<Self> {
        Ok(Self {
            id: record.uuid("id")?,
            organization_id: record.opt_id("organization_id")?,
            hospital_id: record.opt_id("hospital_id")?,
        })
    }
}

impl TenantBound for Visit {
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

/// Reaches every level through a department relation.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub department_id: Option<DepartmentId>,
}

impl Entity for Order {
    const NAME: &'static str = "Order";
    const TABLE: &'static str = "orders";
    const COLUMNS: &'static [&'static str] = &["id", "department_id"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("department_id", self.department_id)
    }

    fn from_record(record: &Record) -> AppResult<Self> {
        Ok(Self {
            id: record.uuid("id")?,
            department_id: record.opt_id("department_id")?,
        })
    }
}

impl TenantBound for Order {
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

/// Reaches the hospital through a relation and the organization via the hospital.
#[derive(Debug, Clone, PartialEq)]
pub struct Bed {
    pub id: Uuid,
    pub hospital_id: Option<HospitalId>,
}

impl Entity for Bed {
    const NAME: &'static str = "Bed";
    const TABLE: &'static str = "beds";
    const COLUMNS: &'static [&'static str] = &["id", "hospital_id"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("hospital_id", self.hospital_id)
    }

    fn from_record(record: &Record) -> AppResult<Self> {
        Ok(Self {
            id: record.uuid("id")?,
            hospital_id: record.opt_id("hospital_id")?,
        })
    }
}

impl TenantBound for Bed {
    fn shape() -> EntityShape {
        EntityShape::new().relation(TenantLevel::Hospital, "hospital_id")
    }

    fn tenant_ids(&self) -> TenantIds {
        TenantIds {
            hospital_id: self.hospital_id,
            ..Default::default()
        }
    }

    fn with_tenant_ids(self, ids: TenantIds) -> Self {
        Self {
            hospital_id: ids.hospital_id,
            ..self
        }
    }
}

/// No tenant attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Formulary {
    pub id: Uuid,
}

impl Entity for Formulary {
    const NAME: &'static str = "Formulary";
    const TABLE: &'static str = "formularies";
    const COLUMNS: &'static [&'static str] = &["id"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_record(&self) -> Record {
        Record::new().with("id", self.id)
    }

    fn from_record(record: &Record) -> AppResult<Self> {
        Ok(Self {
            id: record.uuid("id")?,
        })
    }
}

impl TenantBound for Formulary {}
