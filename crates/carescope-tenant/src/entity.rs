//! The contract tenant-bound record types implement.

use serde::Serialize;
use uuid::Uuid;

use carescope_core::traits::entity::Entity;
use carescope_core::types::id::{DepartmentId, HospitalId, OrganizationId};
use carescope_core::types::tenant::TenantLevel;

use crate::context::TenantContext;

/// The tenant identifiers a record carries, one per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TenantIds {
    pub organization_id: Option<OrganizationId>,
    pub hospital_id: Option<HospitalId>,
    pub department_id: Option<DepartmentId>,
}

impl TenantIds {
    /// Keep every set identifier and take the rest from `available`.
    pub fn fill_missing(self, available: TenantIds) -> TenantIds {
        TenantIds {
            organization_id: self.organization_id.or(available.organization_id),
            hospital_id: self.hospital_id.or(available.hospital_id),
            department_id: self.department_id.or(available.department_id),
        }
    }

    /// First level where both sides are set to different identifiers.
    pub fn conflict_with(&self, stored: &TenantIds) -> Option<TenantLevel> {
        TenantLevel::ALL.into_iter().find(|level| {
            matches!(
                (self.get(*level), stored.get(*level)),
                (Some(incoming), Some(existing)) if incoming != existing
            )
        })
    }

    /// Identifier at `level`, as a raw UUID.
    pub fn get(&self, level: TenantLevel) -> Option<Uuid> {
        match level {
            TenantLevel::Organization => self.organization_id.map(Uuid::from),
            TenantLevel::Hospital => self.hospital_id.map(Uuid::from),
            TenantLevel::Department => self.department_id.map(Uuid::from),
        }
    }

    /// Drop the identifiers of every level `keep` rejects.
    pub fn retain(self, keep: impl Fn(TenantLevel) -> bool) -> TenantIds {
        TenantIds {
            organization_id: self
                .organization_id
                .filter(|_| keep(TenantLevel::Organization)),
            hospital_id: self.hospital_id.filter(|_| keep(TenantLevel::Hospital)),
            department_id: self.department_id.filter(|_| keep(TenantLevel::Department)),
        }
    }

    /// Whether no level is set.
    pub fn is_empty(&self) -> bool {
        self.organization_id.is_none() && self.hospital_id.is_none() && self.department_id.is_none()
    }
}

/// Declared tenant attributes of a record type.
///
/// A direct field stores the tenant id in a column of the record's own
/// table. A relation is a many-to-one reference to a tenant-level row,
/// stored through its foreign-key column. Path resolution works on this
/// declaration alone, never on instances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityShape {
    fields: Vec<(TenantLevel, &'static str)>,
    relations: Vec<(TenantLevel, &'static str)>,
}

impl EntityShape {
    /// A shape with no tenant attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a direct id field stored in the level's conventional column.
    pub fn field(self, level: TenantLevel) -> Self {
        self.field_as(level, level.id_column())
    }

    /// Declare a direct id field stored in `column`.
    pub fn field_as(mut self, level: TenantLevel, column: &'static str) -> Self {
        self.fields.push((level, column));
        self
    }

    /// Declare a many-to-one relation to `target` through foreign key `column`.
    pub fn relation(mut self, target: TenantLevel, column: &'static str) -> Self {
        self.relations.push((target, column));
        self
    }

    /// Column of the direct field for `level`.
    pub fn field_column(&self, level: TenantLevel) -> Option<&'static str> {
        lookup(&self.fields, level)
    }

    /// Foreign-key column of the relation to `level`.
    pub fn relation_column(&self, level: TenantLevel) -> Option<&'static str> {
        lookup(&self.relations, level)
    }

    /// Every declared column.
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .chain(self.relations.iter())
            .map(|(_, column)| *column)
    }

    /// Whether nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.relations.is_empty()
    }
}

fn lookup(entries: &[(TenantLevel, &'static str)], level: TenantLevel) -> Option<&'static str> {
    entries
        .iter()
        .find(|(candidate, _)| *candidate == level)
        .map(|(_, column)| *column)
}

/// A record type that may belong to tenant levels.
///
/// The defaults describe an unscoped type: no tenant attributes and nothing
/// to stamp. Scoped types override all three required hooks.
pub trait TenantBound: Entity {
    /// Declared tenant attributes of this type.
    fn shape() -> EntityShape {
        EntityShape::new()
    }

    /// Tenant identifiers currently stored on this record.
    fn tenant_ids(&self) -> TenantIds {
        TenantIds::default()
    }

    /// Return a copy carrying `ids` for every level this type stores.
    fn with_tenant_ids(self, ids: TenantIds) -> Self {
        let _ = ids;
        self
    }

    /// Fill unset identifiers from `available`; set ones are never changed.
    fn apply_tenant_ids(self, available: TenantIds) -> Self
    where
        Self: Sized,
    {
        let current = self.tenant_ids();
        let merged = current.fill_missing(available);
        if merged == current {
            self
        } else {
            self.with_tenant_ids(merged)
        }
    }

    /// Fill unset identifiers from the context's stamp values.
    fn apply_context(self, ctx: &TenantContext) -> Self
    where
        Self: Sized,
    {
        self.apply_tenant_ids(ctx.stamp_ids())
    }
}
