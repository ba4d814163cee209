//! Referral repository implementation.

use std::ops::Deref;

use sqlx::PgPool;

use carescope_core::result::AppResult;
use carescope_core::types::filter::FilterField;
use carescope_core::types::predicate::Predicate;
use carescope_core::types::sorting::SortField;
use carescope_entity::{Referral, ReferralStatus};
use carescope_tenant::expression::TenantExpressions;

use crate::scoped::{ScopeEnforcer, ScopedRepository};
use crate::store::{EntityStore, PgEntityStore, SelectQuery};

/// Repository for referrals.
///
/// Referrals are scoped to the sending hospital. The receiving side sees
/// its incoming referrals through [`ReferralRepository::find_incoming`],
/// which filters on the target hospital with context expressions instead of
/// the automatic scope.
#[derive(Debug, Clone)]
pub struct ReferralRepository<S = PgEntityStore<Referral>> {
    base: ScopedRepository<Referral, S>,
    expressions: TenantExpressions,
}

impl ReferralRepository {
    /// Create a PostgreSQL-backed repository.
    pub fn postgres(pool: PgPool, enforcer: ScopeEnforcer) -> Self {
        Self::new(PgEntityStore::new(pool), enforcer)
    }
}

impl<S: EntityStore<Referral>> ReferralRepository<S> {
    pub fn new(store: S, enforcer: ScopeEnforcer) -> Self {
        Self {
            base: ScopedRepository::new(store, enforcer),
            expressions: TenantExpressions::new(),
        }
    }

    /// Visible referrals sent with the given status, newest first.
    pub async fn find_outgoing(&self, status: ReferralStatus) -> AppResult<Vec<Referral>> {
        self.base
            .find_all(
                FilterField::eq("status", status.as_str()).into(),
                vec![SortField::desc("created_at")],
            )
            .await
    }

    /// Referrals addressed to any hospital the caller can access.
    pub async fn find_incoming(&self, status: ReferralStatus) -> AppResult<Vec<Referral>> {
        let target = if self.expressions.is_super_admin() {
            Predicate::Always
        } else {
            self.expressions
                .predicate("target_hospital_id", "accessibleHospitalIds")?
        };
        let predicate = target.and(FilterField::eq("status", status.as_str()).into());
        if predicate.is_never() {
            return Ok(Vec::new());
        }
        self.base
            .store()
            .select(&SelectQuery::filter(predicate).sorted(vec![SortField::desc("created_at")]))
            .await
    }
}

impl<S> Deref for ReferralRepository<S> {
    type Target = ScopedRepository<Referral, S>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
