//! Derives the tenant filter for a record type from a tenant context.

use std::sync::Arc;

use tracing::trace;
use uuid::Uuid;

use carescope_core::config::TenantTables;
use carescope_core::types::filter::FilterField;
use carescope_core::types::predicate::{Predicate, SubQuery};
use carescope_core::types::tenant::TenantLevel;

use crate::context::{ContextStore, TenantContext};

use super::descriptor::ScopeDescriptor;
use super::path::ScopePath;
use super::registry::ScopeRegistry;

/// The membership test one level contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Membership {
    AnyOf(Vec<Uuid>),
    Equals(Uuid),
}

impl Membership {
    /// Permitted set first, active id second.
    fn for_level(ctx: &TenantContext, level: TenantLevel) -> Option<Self> {
        let (permitted, active): (Vec<Uuid>, Option<Uuid>) = match level {
            TenantLevel::Organization => (
                ctx.permitted_organization_ids()
                    .iter()
                    .map(|id| *id.as_uuid())
                    .collect(),
                ctx.active_organization_id().map(Uuid::from),
            ),
            TenantLevel::Hospital => (
                ctx.permitted_hospital_ids()
                    .iter()
                    .map(|id| *id.as_uuid())
                    .collect(),
                ctx.active_hospital_id().map(Uuid::from),
            ),
            TenantLevel::Department => (
                ctx.permitted_department_ids()
                    .iter()
                    .map(|id| *id.as_uuid())
                    .collect(),
                None,
            ),
        };

        if !permitted.is_empty() {
            Some(Self::AnyOf(permitted))
        } else {
            active.map(Self::Equals)
        }
    }

    fn on(self, column: &str) -> Predicate {
        match self {
            Self::AnyOf(ids) => FilterField::in_uuids(column, ids).into(),
            Self::Equals(id) => FilterField::eq(column, id).into(),
        }
    }
}

/// Builds scope predicates for registered record types.
#[derive(Debug, Clone)]
pub struct ScopePredicateBuilder {
    registry: Arc<ScopeRegistry>,
    tables: TenantTables,
}

impl ScopePredicateBuilder {
    /// Create a builder over `registry`, resolving two-hop paths through `tables`.
    pub fn new(registry: Arc<ScopeRegistry>, tables: TenantTables) -> Self {
        Self { registry, tables }
    }

    /// The registry this builder consults.
    pub fn registry(&self) -> &Arc<ScopeRegistry> {
        &self.registry
    }

    /// Tenant predicate for `E` under `ctx`.
    ///
    /// Unscoped types and super administrators get [`Predicate::Always`].
    /// Otherwise each reachable level contributes a membership test, the
    /// tests are OR-ed, and a context that yields no test gets
    /// [`Predicate::Never`].
    pub fn build<E: 'static>(&self, ctx: &TenantContext) -> Predicate {
        match self.registry.descriptor::<E>() {
            Some(descriptor) => self.build_for(descriptor, ctx),
            None => {
                trace!(entity = std::any::type_name::<E>(), "Unscoped type, no tenant filter");
                Predicate::Always
            }
        }
    }

    /// Tenant predicate for `E` under the current call chain's context.
    pub fn build_current<E: 'static>(&self) -> Predicate {
        self.build::<E>(&ContextStore::get_or_empty())
    }

    /// Tenant predicate for an already resolved descriptor.
    pub fn build_for(&self, descriptor: &ScopeDescriptor, ctx: &TenantContext) -> Predicate {
        if ctx.is_super_admin() {
            trace!(entity = descriptor.entity, "Super admin bypasses tenant filter");
            return Predicate::Always;
        }

        let tests: Vec<Predicate> = TenantLevel::ALL
            .into_iter()
            .filter_map(|level| {
                let membership = Membership::for_level(ctx, level)?;
                self.lower(descriptor.path(level), membership)
            })
            .collect();

        let predicate = Predicate::any(tests);
        if predicate.is_never() {
            trace!(entity = descriptor.entity, "No usable tenant scope, denying all rows");
        }
        predicate
    }

    fn lower(&self, path: &ScopePath, membership: Membership) -> Option<Predicate> {
        match path {
            ScopePath::Direct { column } | ScopePath::Relation { column, .. } => {
                Some(membership.on(column))
            }
            ScopePath::Nested {
                column,
                via,
                target,
            } => Some(Predicate::in_subquery(
                *column,
                SubQuery {
                    table: self.tables.table_for(*via).to_string(),
                    select: "id".to_string(),
                    predicate: membership.on(target.id_column()),
                },
            )),
            ScopePath::NotApplicable => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use carescope_core::types::filter::FilterOp;
    use carescope_core::types::id::{DepartmentId, HospitalId, OrganizationId};

    use super::*;
    use crate::testing::{Bed, Formulary, Order, Visit};

    fn builder() -> ScopePredicateBuilder {
        let registry = ScopeRegistry::builder()
            .register::<Visit>()
            .and_then(|b| b.register::<Order>())
            .and_then(|b| b.register::<Bed>())
            .expect("registration")
            .build();
        ScopePredicateBuilder::new(Arc::new(registry), TenantTables::default())
    }

    #[test]
    fn test_unscoped_type_is_always() {
        let ctx = TenantContext::empty();
        assert!(builder().build::<Formulary>(&ctx).is_always());
    }

    #[test]
    fn test_super_admin_is_always() {
        assert!(builder().build::<Visit>(&TenantContext::system()).is_always());
    }

    #[test]
    fn test_empty_context_is_never() {
        let builder = builder();
        let ctx = TenantContext::empty();
        assert!(builder.build::<Visit>(&ctx).is_never());
        assert!(builder.build::<Order>(&ctx).is_never());
        assert!(builder.build::<Bed>(&ctx).is_never());
    }

    #[test]
    fn test_permitted_set_wins_over_active() {
        let h1 = HospitalId::new();
        let h2 = HospitalId::new();
        let ctx = TenantContext::builder()
            .permit_hospitals([h1, h2])
            .active_hospital(h1)
            .build()
            .expect("valid");
        match builder().build::<Visit>(&ctx) {
            Predicate::Field(filter) => {
                assert_eq!(filter.field, "hospital_id");
                assert_eq!(filter.op, FilterOp::In);
            }
            other => panic!("unexpected predicate {other}"),
        }
    }

    #[test]
    fn test_active_id_used_without_permitted_set() {
        let org = OrganizationId::new();
        let ctx = TenantContext::builder()
            .active_organization(org)
            .build()
            .expect("valid");
        assert_eq!(
            builder().build::<Visit>(&ctx),
            Predicate::from(FilterField::eq("organization_id", org))
        );
    }

    #[test]
    fn test_levels_are_or_combined() {
        let ctx = TenantContext::builder()
            .permit_organizations([OrganizationId::new()])
            .permit_hospitals([HospitalId::new()])
            .build()
            .expect("valid");
        match builder().build::<Visit>(&ctx) {
            Predicate::Or(branches) => assert_eq!(branches.len(), 2),
            other => panic!("unexpected predicate {other}"),
        }
    }

    #[test]
    fn test_unreachable_level_contributes_nothing() {
        // Visit has no department path, so a department-only caller is denied.
        let ctx = TenantContext::builder()
            .permit_departments([DepartmentId::new()])
            .build()
            .expect("valid");
        assert!(builder().build::<Visit>(&ctx).is_never());
    }

    #[test]
    fn test_nested_path_lowers_to_subquery() {
        let hospital = HospitalId::new();
        let ctx = TenantContext::builder()
            .permit_hospitals([hospital])
            .build()
            .expect("valid");
        match builder().build::<Order>(&ctx) {
            Predicate::InSubquery { column, subquery } => {
                assert_eq!(column, "department_id");
                assert_eq!(subquery.table, "departments");
                assert_eq!(subquery.select, "id");
                assert_eq!(subquery.predicate.columns(), vec!["hospital_id"]);
            }
            other => panic!("unexpected predicate {other}"),
        }
    }

    #[test]
    fn test_relation_filters_like_direct_field() {
        let hospital = HospitalId::new();
        let ctx = TenantContext::builder()
            .permit_hospitals([hospital])
            .build()
            .expect("valid");
        let builder = builder();
        assert_eq!(builder.build::<Bed>(&ctx), builder.build::<Visit>(&ctx));
    }

    #[test]
    fn test_build_current_reads_store() {
        let hospital = HospitalId::new();
        let ctx = TenantContext::builder()
            .permit_hospitals([hospital])
            .build()
            .expect("valid");
        let builder = builder();
        let scoped = ContextStore::sync_scope(ctx, || builder.build_current::<Visit>());
        assert!(!scoped.is_never());
        assert!(builder.build_current::<Visit>().is_never());
    }
}
