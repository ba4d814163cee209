//! Pre-write stamping of tenant identifiers.

use std::sync::Arc;

use tracing::trace;

use crate::context::{ContextStore, TenantContext};
use crate::entity::TenantBound;
use crate::scope::ScopeRegistry;

/// Fills unset tenant identifiers on records about to be written.
///
/// Only levels the record stores itself are stamped: a direct field or the
/// foreign key of a single-hop relation. Levels reached through two hops are
/// derived from the related row and left alone.
#[derive(Debug, Clone)]
pub struct ScopeStamper {
    registry: Arc<ScopeRegistry>,
}

impl ScopeStamper {
    pub fn new(registry: Arc<ScopeRegistry>) -> Self {
        Self { registry }
    }

    /// Stamp `entity` from the current call chain's context.
    pub fn prepare_for_write<E: TenantBound>(&self, entity: E) -> E {
        self.prepare_for_write_with(entity, &ContextStore::get_or_empty())
    }

    /// Stamp `entity` from an explicit context.
    pub fn prepare_for_write_with<E: TenantBound>(&self, entity: E, ctx: &TenantContext) -> E {
        let Some(descriptor) = self.registry.descriptor::<E>() else {
            return entity;
        };

        let available = ctx.stamp_ids().retain(|level| descriptor.stamps(level));
        if available.is_empty() {
            return entity;
        }

        trace!(entity = E::NAME, id = %entity.id(), "Stamping tenant identifiers");
        entity.apply_tenant_ids(available)
    }
}

#[cfg(test)]
mod tests {
    use carescope_core::types::id::{DepartmentId, HospitalId, OrganizationId};

    use super::*;
    use crate::testing::{Formulary, Order, Visit};

    fn stamper() -> ScopeStamper {
        let registry = ScopeRegistry::builder()
            .register::<Visit>()
            .and_then(|b| b.register::<Order>())
            .expect("registration")
            .build();
        ScopeStamper::new(Arc::new(registry))
    }

    fn context() -> TenantContext {
        TenantContext::builder()
            .active_organization(OrganizationId::new())
            .active_hospital(HospitalId::new())
            .permit_departments([DepartmentId::new()])
            .build()
            .expect("valid")
    }

    #[test]
    fn test_fills_unset_levels() {
        let ctx = context();
        let stamped = stamper().prepare_for_write_with(Visit::new(None, None), &ctx);
        assert_eq!(stamped.organization_id, ctx.active_organization_id());
        assert_eq!(stamped.hospital_id, ctx.active_hospital_id());
    }

    #[test]
    fn test_never_overwrites_organization() {
        let own = OrganizationId::new();
        let stamped = stamper().prepare_for_write_with(Visit::new(Some(own), None), &context());
        assert_eq!(stamped.organization_id, Some(own));
    }

    #[test]
    fn test_relation_gets_first_permitted_department() {
        let ctx = context();
        let order = Order {
            id: uuid::Uuid::new_v4(),
            department_id: None,
        };
        let stamped = stamper().prepare_for_write_with(order, &ctx);
        assert_eq!(
            stamped.department_id,
            ctx.permitted_department_ids().first().copied()
        );
    }

    #[test]
    fn test_unregistered_type_untouched() {
        let entry = Formulary {
            id: uuid::Uuid::new_v4(),
        };
        assert_eq!(stamper().prepare_for_write_with(entry.clone(), &context()), entry);
    }

    #[test]
    fn test_empty_context_is_noop() {
        let visit = Visit::new(None, None);
        let stamped = stamper().prepare_for_write(visit.clone());
        assert_eq!(stamped, visit);
    }

    #[test]
    fn test_reads_installed_context() {
        let ctx = context();
        let expected = ctx.active_hospital_id();
        let stamped = ContextStore::sync_scope(ctx, || stamper().prepare_for_write(Visit::new(None, None)));
        assert_eq!(stamped.hospital_id, expected);
    }
}
