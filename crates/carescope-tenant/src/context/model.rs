//! The immutable tenant context of one call chain.

use std::collections::BTreeSet;

use serde::Serialize;

use carescope_core::error::AppError;
use carescope_core::types::id::{DepartmentId, HospitalId, OrganizationId, PrincipalId};

use crate::entity::TenantIds;

/// The caller's tenant scope for one request or call chain.
///
/// Built once by the authentication layer and never mutated afterwards.
/// "No caller" is represented by [`TenantContext::empty`], never by an absent
/// value, so scope logic only ever branches on field values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TenantContext {
    principal_id: Option<PrincipalId>,
    principal_name: Option<String>,
    active_organization_id: Option<OrganizationId>,
    active_hospital_id: Option<HospitalId>,
    permitted_organization_ids: BTreeSet<OrganizationId>,
    permitted_hospital_ids: BTreeSet<HospitalId>,
    permitted_department_ids: BTreeSet<DepartmentId>,
    super_admin: bool,
    hospital_admin: bool,
}

impl TenantContext {
    /// The context with no identity, no scope, and no privileges.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a context.
    pub fn builder() -> TenantContextBuilder {
        TenantContextBuilder::default()
    }

    /// Unrestricted context for system-internal call chains (batch imports,
    /// maintenance jobs). Filtering is bypassed entirely.
    pub fn system() -> Self {
        Self {
            principal_name: Some("system".to_string()),
            super_admin: true,
            ..Self::default()
        }
    }

    /// Caller identity, absent for system-internal calls.
    pub fn principal_id(&self) -> Option<PrincipalId> {
        self.principal_id
    }

    /// Caller display name.
    pub fn principal_name(&self) -> Option<&str> {
        self.principal_name.as_deref()
    }

    /// Currently selected organization.
    pub fn active_organization_id(&self) -> Option<OrganizationId> {
        self.active_organization_id
    }

    /// Currently selected hospital.
    pub fn active_hospital_id(&self) -> Option<HospitalId> {
        self.active_hospital_id
    }

    /// Organizations the caller may access.
    pub fn permitted_organization_ids(&self) -> &BTreeSet<OrganizationId> {
        &self.permitted_organization_ids
    }

    /// Hospitals the caller may access.
    pub fn permitted_hospital_ids(&self) -> &BTreeSet<HospitalId> {
        &self.permitted_hospital_ids
    }

    /// Departments the caller may access.
    pub fn permitted_department_ids(&self) -> &BTreeSet<DepartmentId> {
        &self.permitted_department_ids
    }

    /// Super administrators bypass tenant filtering.
    pub fn is_super_admin(&self) -> bool {
        self.super_admin
    }

    /// Hospital administrators.
    pub fn is_hospital_admin(&self) -> bool {
        self.hospital_admin
    }

    /// Whether the context carries neither scope nor privileges.
    pub fn is_empty(&self) -> bool {
        !self.super_admin
            && self.active_organization_id.is_none()
            && self.active_hospital_id.is_none()
            && self.permitted_organization_ids.is_empty()
            && self.permitted_hospital_ids.is_empty()
            && self.permitted_department_ids.is_empty()
    }

    /// Active organization together with every permitted organization.
    pub fn accessible_organization_ids(&self) -> BTreeSet<OrganizationId> {
        let mut ids = self.permitted_organization_ids.clone();
        ids.extend(self.active_organization_id);
        ids
    }

    /// Active hospital together with every permitted hospital.
    pub fn accessible_hospital_ids(&self) -> BTreeSet<HospitalId> {
        let mut ids = self.permitted_hospital_ids.clone();
        ids.extend(self.active_hospital_id);
        ids
    }

    /// Identifiers the stamping step may write into unset record fields.
    ///
    /// Departments have no active selection; the first permitted department
    /// in identifier order is used.
    pub fn stamp_ids(&self) -> TenantIds {
        TenantIds {
            organization_id: self.active_organization_id,
            hospital_id: self.active_hospital_id,
            department_id: self.permitted_department_ids.first().copied(),
        }
    }
}

/// Builder for [`TenantContext`].
#[derive(Debug, Clone)]
pub struct TenantContextBuilder {
    inner: TenantContext,
    enforce_active_membership: bool,
}

impl Default for TenantContextBuilder {
    fn default() -> Self {
        Self {
            inner: TenantContext::default(),
            enforce_active_membership: true,
        }
    }
}

impl TenantContextBuilder {
    /// Set the caller identity.
    pub fn principal(mut self, id: PrincipalId, name: impl Into<String>) -> Self {
        self.inner.principal_id = Some(id);
        self.inner.principal_name = Some(name.into());
        self
    }

    /// Select the active organization.
    pub fn active_organization(mut self, id: OrganizationId) -> Self {
        self.inner.active_organization_id = Some(id);
        self
    }

    /// Select the active hospital.
    pub fn active_hospital(mut self, id: HospitalId) -> Self {
        self.inner.active_hospital_id = Some(id);
        self
    }

    /// Grant access to organizations.
    pub fn permit_organizations(mut self, ids: impl IntoIterator<Item = OrganizationId>) -> Self {
        self.inner.permitted_organization_ids.extend(ids);
        self
    }

    /// Grant access to hospitals.
    pub fn permit_hospitals(mut self, ids: impl IntoIterator<Item = HospitalId>) -> Self {
        self.inner.permitted_hospital_ids.extend(ids);
        self
    }

    /// Grant access to departments.
    pub fn permit_departments(mut self, ids: impl IntoIterator<Item = DepartmentId>) -> Self {
        self.inner.permitted_department_ids.extend(ids);
        self
    }

    /// Mark the caller as super administrator.
    pub fn super_admin(mut self, value: bool) -> Self {
        self.inner.super_admin = value;
        self
    }

    /// Mark the caller as hospital administrator.
    pub fn hospital_admin(mut self, value: bool) -> Self {
        self.inner.hospital_admin = value;
        self
    }

    /// Whether `build` rejects active ids outside a non-empty permitted set.
    pub fn enforce_active_membership(mut self, value: bool) -> Self {
        self.enforce_active_membership = value;
        self
    }

    /// Finish the context.
    ///
    /// With membership enforcement on (the default), an active organization
    /// or hospital that is not in a non-empty permitted set of the same
    /// level is a validation error. Super administrators are exempt.
    pub fn build(self) -> Result<TenantContext, AppError> {
        let ctx = self.inner;

        if self.enforce_active_membership && !ctx.super_admin {
            if let Some(active) = ctx.active_organization_id {
                if !ctx.permitted_organization_ids.is_empty()
                    && !ctx.permitted_organization_ids.contains(&active)
                {
                    return Err(AppError::validation(format!(
                        "Active organization {active} is not among the permitted organizations"
                    )));
                }
            }
            if let Some(active) = ctx.active_hospital_id {
                if !ctx.permitted_hospital_ids.is_empty()
                    && !ctx.permitted_hospital_ids.contains(&active)
                {
                    return Err(AppError::validation(format!(
                        "Active hospital {active} is not among the permitted hospitals"
                    )));
                }
            }
        }

        Ok(ctx)
    }
}
