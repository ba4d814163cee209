//! Drug catalog entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use carescope_core::AppResult;
use carescope_core::traits::entity::Entity;
use carescope_core::types::record::Record;
use carescope_tenant::entity::TenantBound;

/// A drug in the shared, platform-wide catalog. Not tenant-scoped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DrugCatalogEntry {
    pub id: Uuid,
    /// Catalog code referenced by prescriptions.
    pub code: String,
    pub name: String,
    /// Dosage form (tablet, injection, ...).
    pub form: Option<String>,
    pub active: bool,
}

impl DrugCatalogEntry {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            form: None,
            active: true,
        }
    }
}

impl Entity for DrugCatalogEntry {
    const NAME: &'static str = "DrugCatalogEntry";
    const TABLE: &'static str = "drug_catalog";
    const COLUMNS: &'static [&'static str] = &["id", "code", "name", "form", "active"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("code", self.code.as_str())
            .with("name", self.name.as_str())
            .with("form", self.form.clone())
            .with("active", self.active)
    }

    fn from_record(record: &Record) -> AppResult<Self> {
        Ok(Self {
            id: record.uuid("id")?,
            code: record.string("code")?,
            name: record.string("name")?,
            form: record.opt_string("form")?,
            active: record.boolean("active")?,
        })
    }
}

impl TenantBound for DrugCatalogEntry {}
