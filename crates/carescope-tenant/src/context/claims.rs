//! Serialized caller claims handed over by the authentication layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use carescope_core::error::AppError;
use carescope_core::types::id::{DepartmentId, HospitalId, OrganizationId, PrincipalId};

use super::model::TenantContext;

/// Caller identity and memberships in wire form.
///
/// Every field is optional in JSON; missing sets are empty and missing flags
/// are `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantClaims {
    pub principal_id: Option<Uuid>,
    pub principal_name: Option<String>,
    pub active_organization_id: Option<Uuid>,
    pub active_hospital_id: Option<Uuid>,
    pub permitted_organization_ids: Vec<Uuid>,
    pub permitted_hospital_ids: Vec<Uuid>,
    pub permitted_department_ids: Vec<Uuid>,
    pub super_admin: bool,
    pub hospital_admin: bool,
}

impl TenantClaims {
    /// Parse claims from a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Convert into a context, optionally checking active-id membership.
    pub fn into_context(self, enforce_active_membership: bool) -> Result<TenantContext, AppError> {
        let mut builder = TenantContext::builder()
            .enforce_active_membership(enforce_active_membership)
            .permit_organizations(
                self.permitted_organization_ids
                    .into_iter()
                    .map(OrganizationId::from),
            )
            .permit_hospitals(self.permitted_hospital_ids.into_iter().map(HospitalId::from))
            .permit_departments(
                self.permitted_department_ids
                    .into_iter()
                    .map(DepartmentId::from),
            )
            .super_admin(self.super_admin)
            .hospital_admin(self.hospital_admin);

        if let Some(id) = self.principal_id {
            builder = builder.principal(
                PrincipalId::from(id),
                self.principal_name.unwrap_or_default(),
            );
        }
        if let Some(id) = self.active_organization_id {
            builder = builder.active_organization(OrganizationId::from(id));
        }
        if let Some(id) = self.active_hospital_id {
            builder = builder.active_hospital(HospitalId::from(id));
        }

        builder.build()
    }
}

impl TryFrom<TenantClaims> for TenantContext {
    type Error = AppError;

    fn try_from(claims: TenantClaims) -> Result<Self, Self::Error> {
        claims.into_context(true)
    }
}

impl From<&TenantContext> for TenantClaims {
    fn from(ctx: &TenantContext) -> Self {
        Self {
            principal_id: ctx.principal_id().map(|id| *id.as_uuid()),
            principal_name: ctx.principal_name().map(str::to_string),
            active_organization_id: ctx.active_organization_id().map(|id| *id.as_uuid()),
            active_hospital_id: ctx.active_hospital_id().map(|id| *id.as_uuid()),
            permitted_organization_ids: ctx
                .permitted_organization_ids()
                .iter()
                .map(|id| *id.as_uuid())
                .collect(),
            permitted_hospital_ids: ctx
                .permitted_hospital_ids()
                .iter()
                .map(|id| *id.as_uuid())
                .collect(),
            permitted_department_ids: ctx
                .permitted_department_ids()
                .iter()
                .map(|id| *id.as_uuid())
                .collect(),
            super_admin: ctx.is_super_admin(),
            hospital_admin: ctx.is_hospital_admin(),
        }
    }
}
