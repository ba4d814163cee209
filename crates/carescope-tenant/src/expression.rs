//! Read-only access to context fields for hand-written query expressions.
//!
//! Repository code that builds its own predicates, rather than relying on the
//! automatic scope filter, references context values by name through
//! [`TenantExpressions`]. Every call reads the propagation store afresh.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use carescope_core::error::AppError;
use carescope_core::types::filter::{FilterField, FilterValue};
use carescope_core::types::predicate::Predicate;

use crate::context::{ContextStore, TenantContext};

/// A context value resolved by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExpressionValue {
    Id(Option<Uuid>),
    Ids(Vec<Uuid>),
    Flag(bool),
}

impl ExpressionValue {
    pub fn into_filter_value(self) -> FilterValue {
        match self {
            Self::Id(id) => FilterValue::from(id),
            Self::Ids(ids) => FilterValue::UuidList(ids),
            Self::Flag(flag) => FilterValue::Boolean(flag),
        }
    }
}

impl fmt::Display for ExpressionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(Some(id)) => write!(f, "{id}"),
            Self::Id(None) => f.write_str("null"),
            Self::Ids(ids) => {
                let joined: Vec<String> = ids.iter().map(Uuid::to_string).collect();
                write!(f, "[{}]", joined.join(", "))
            }
            Self::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

/// Names accepted by [`TenantExpressions::lookup`].
pub const EXPRESSION_NAMES: &[&str] = &[
    "principalId",
    "activeOrganizationId",
    "activeHospitalId",
    "permittedOrganizationIds",
    "permittedHospitalIds",
    "permittedDepartmentIds",
    "accessibleOrganizationIds",
    "accessibleHospitalIds",
    "isSuperAdmin",
    "isHospitalAdmin",
];

/// Named, read-only view of the current tenant context.
#[derive(Debug, Clone, Copy, Default)]
pub struct TenantExpressions;

impl TenantExpressions {
    pub fn new() -> Self {
        Self
    }

    pub fn active_organization_id(&self) -> Option<Uuid> {
        current().active_organization_id().map(Uuid::from)
    }

    pub fn active_hospital_id(&self) -> Option<Uuid> {
        current().active_hospital_id().map(Uuid::from)
    }

    pub fn permitted_organization_ids(&self) -> Vec<Uuid> {
        uuids(current().permitted_organization_ids())
    }

    pub fn permitted_hospital_ids(&self) -> Vec<Uuid> {
        uuids(current().permitted_hospital_ids())
    }

    pub fn permitted_department_ids(&self) -> Vec<Uuid> {
        uuids(current().permitted_department_ids())
    }

    /// Active organization plus permitted organizations.
    pub fn accessible_organization_ids(&self) -> Vec<Uuid> {
        uuids(&current().accessible_organization_ids())
    }

    /// Active hospital plus permitted hospitals.
    pub fn accessible_hospital_ids(&self) -> Vec<Uuid> {
        uuids(&current().accessible_hospital_ids())
    }

    pub fn is_super_admin(&self) -> bool {
        current().is_super_admin()
    }

    pub fn is_hospital_admin(&self) -> bool {
        current().is_hospital_admin()
    }

    pub fn principal_id(&self) -> Option<Uuid> {
        current().principal_id().map(Uuid::from)
    }

    /// Resolve a named reference such as `accessibleHospitalIds`.
    pub fn lookup(&self, name: &str) -> Option<ExpressionValue> {
        let value = match name {
            "principalId" => ExpressionValue::Id(self.principal_id()),
            "activeOrganizationId" => ExpressionValue::Id(self.active_organization_id()),
            "activeHospitalId" => ExpressionValue::Id(self.active_hospital_id()),
            "permittedOrganizationIds" => ExpressionValue::Ids(self.permitted_organization_ids()),
            "permittedHospitalIds" => ExpressionValue::Ids(self.permitted_hospital_ids()),
            "permittedDepartmentIds" => ExpressionValue::Ids(self.permitted_department_ids()),
            "accessibleOrganizationIds" => {
                ExpressionValue::Ids(self.accessible_organization_ids())
            }
            "accessibleHospitalIds" => ExpressionValue::Ids(self.accessible_hospital_ids()),
            "isSuperAdmin" => ExpressionValue::Flag(self.is_super_admin()),
            "isHospitalAdmin" => ExpressionValue::Flag(self.is_hospital_admin()),
            _ => return None,
        };
        Some(value)
    }

    /// Predicate comparing `column` with the named context value.
    ///
    /// Id lists become membership tests (an empty list matches nothing),
    /// single ids become equality (an absent id matches nothing).
    pub fn predicate(&self, column: &str, name: &str) -> Result<Predicate, AppError> {
        let value = self
            .lookup(name)
            .ok_or_else(|| AppError::validation(format!("Unknown context expression '{name}'")))?;

        Ok(match value {
            ExpressionValue::Ids(ids) if ids.is_empty() => Predicate::Never,
            ExpressionValue::Ids(ids) => FilterField::in_uuids(column, ids).into(),
            ExpressionValue::Id(None) => Predicate::Never,
            ExpressionValue::Id(Some(id)) => FilterField::eq(column, id).into(),
            ExpressionValue::Flag(flag) => FilterField::eq(column, flag).into(),
        })
    }
}

fn current() -> std::sync::Arc<TenantContext> {
    ContextStore::get_or_empty()
}

fn uuids<T: Copy + Into<Uuid>>(ids: &BTreeSet<T>) -> Vec<Uuid> {
    ids.iter().map(|id| (*id).into()).collect()
}
