//! Call-chain scoped holder for the active [`TenantContext`].
//!
//! Async call chains install the context with [`ContextStore::scope`], which
//! binds it to a tokio task-local for exactly the lifetime of the wrapped
//! future. Every synchronous helper polled inside that future sees the same
//! context. Purely synchronous chains use [`ContextStore::sync_scope`] or an
//! RAII [`ContextGuard`] backed by a thread-local slot.
//!
//! The thread-local slot is never used on a tokio runtime thread: workers
//! poll many unrelated tasks, so a context parked there would outlive the
//! call chain that set it. On those threads `set` and `install` only take
//! effect inside a [`ContextStore::scope`].
//!
//! A task started with plain `tokio::spawn` does **not** inherit the context.
//! Hand-offs must go through [`ContextStore::spawn`], which captures the
//! current context and re-installs it in the new task.

use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::model::TenantContext;

type Slot = RefCell<Option<Arc<TenantContext>>>;

tokio::task_local! {
    static TASK_CONTEXT: Slot;
}

thread_local! {
    static THREAD_CONTEXT: Slot = const { RefCell::new(None) };
}

/// Static accessor for the current call chain's tenant context.
///
/// All operations are total: outside any scope `get` returns `None` and
/// `get_or_empty` returns the empty context.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextStore;

impl ContextStore {
    /// Install `ctx` for the current call chain, replacing any previous one.
    pub fn set(ctx: TenantContext) {
        debug!(
            principal = ?ctx.principal_id(),
            super_admin = ctx.is_super_admin(),
            "Tenant context installed"
        );
        Self::replace(Some(Arc::new(ctx)));
    }

    /// Return the current context, if one is installed.
    pub fn get() -> Option<Arc<TenantContext>> {
        match TASK_CONTEXT.try_with(|slot| slot.borrow().clone()) {
            Ok(current) => current,
            Err(_) if on_runtime() => None,
            Err(_) => THREAD_CONTEXT.with(|slot| slot.borrow().clone()),
        }
    }

    /// Return the current context or the empty context.
    pub fn get_or_empty() -> Arc<TenantContext> {
        Self::get().unwrap_or_else(|| Arc::new(TenantContext::empty()))
    }

    /// Remove the current context.
    pub fn clear() {
        if Self::replace(None).is_some() {
            debug!("Tenant context cleared");
        }
    }

    /// Run `future` with `ctx` installed for its whole lifetime.
    ///
    /// The context is dropped when the future completes, fails, panics, or
    /// is cancelled.
    pub async fn scope<F>(ctx: TenantContext, future: F) -> F::Output
    where
        F: Future,
    {
        debug!(principal = ?ctx.principal_id(), "Entering tenant scope");
        TASK_CONTEXT
            .scope(RefCell::new(Some(Arc::new(ctx))), future)
            .await
    }

    /// Run the synchronous closure `f` with `ctx` installed.
    pub fn sync_scope<F, R>(ctx: TenantContext, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        TASK_CONTEXT.sync_scope(RefCell::new(Some(Arc::new(ctx))), f)
    }

    /// Install `ctx` until the returned guard is dropped.
    ///
    /// Dropping the guard restores whatever context was installed before.
    /// The guard cannot cross threads.
    pub fn install(ctx: TenantContext) -> ContextGuard {
        let previous = Self::replace(Some(Arc::new(ctx)));
        ContextGuard {
            previous,
            _not_send: PhantomData,
        }
    }

    /// Spawn `future` on the runtime with the current context re-installed.
    pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let captured = Self::get();
        debug!(
            inherited = captured.is_some(),
            "Spawning task with tenant context"
        );
        tokio::spawn(TASK_CONTEXT.scope(RefCell::new(captured), future))
    }

    fn replace(value: Option<Arc<TenantContext>>) -> Option<Arc<TenantContext>> {
        // Inside a task scope the task slot is authoritative.
        let mut value = Some(value);
        let replaced = TASK_CONTEXT.try_with(|slot| slot.replace(value.take().flatten()));
        match (replaced, value) {
            (Ok(previous), _) => previous,
            (Err(_), Some(value)) if on_runtime() => {
                if value.is_some() {
                    warn!("Tenant context ignored outside ContextStore::scope on a runtime thread");
                }
                None
            }
            (Err(_), Some(value)) => THREAD_CONTEXT.with(|slot| slot.replace(value)),
            (Err(_), None) => None,
        }
    }
}

fn on_runtime() -> bool {
    tokio::runtime::Handle::try_current().is_ok()
}

/// Restores the previously installed context when dropped.
#[must_use = "the context is removed as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard {
    previous: Option<Arc<TenantContext>>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        ContextStore::replace(self.previous.take());
        debug!("Tenant context guard released");
    }
}

#[cfg(test)]
mod tests {
    use carescope_core::types::id::HospitalId;

    use super::*;

    fn hospital_context(hospital: HospitalId) -> TenantContext {
        TenantContext::builder()
            .permit_hospitals([hospital])
            .build()
            .expect("valid context")
    }

    fn current_hospitals() -> Vec<HospitalId> {
        ContextStore::get_or_empty()
            .permitted_hospital_ids()
            .iter()
            .copied()
            .collect()
    }

    #[test]
    fn test_get_or_empty_outside_scope() {
        assert!(ContextStore::get().is_none());
        assert!(ContextStore::get_or_empty().is_empty());
    }

    #[test]
    fn test_set_and_clear_on_thread() {
        let hospital = HospitalId::new();
        ContextStore::set(hospital_context(hospital));
        assert_eq!(current_hospitals(), vec![hospital]);
        ContextStore::clear();
        assert!(ContextStore::get().is_none());
    }

    #[test]
    fn test_guard_restores_previous() {
        let outer = HospitalId::new();
        let inner = HospitalId::new();
        let _outer = ContextStore::install(hospital_context(outer));
        {
            let _inner = ContextStore::install(hospital_context(inner));
            assert_eq!(current_hospitals(), vec![inner]);
        }
        assert_eq!(current_hospitals(), vec![outer]);
    }

    #[test]
    fn test_sync_scope_is_cleared_after_panic() {
        let hospital = HospitalId::new();
        let result = std::panic::catch_unwind(|| {
            ContextStore::sync_scope(hospital_context(hospital), || {
                assert_eq!(current_hospitals(), vec![hospital]);
                panic!("business failure");
            })
        });
        assert!(result.is_err());
        assert!(ContextStore::get().is_none());
    }

    #[tokio::test]
    async fn test_scope_visible_to_sync_helpers() {
        let hospital = HospitalId::new();
        let seen = ContextStore::scope(hospital_context(hospital), async {
            tokio::task::yield_now().await;
            current_hospitals()
        })
        .await;
        assert_eq!(seen, vec![hospital]);
        assert!(ContextStore::get().is_none());
    }

    #[tokio::test]
    async fn test_plain_spawn_does_not_inherit() {
        let hospital = HospitalId::new();
        let seen = ContextStore::scope(hospital_context(hospital), async {
            tokio::spawn(async { ContextStore::get().is_some() })
                .await
                .expect("join")
        })
        .await;
        assert!(!seen);
    }

    #[tokio::test]
    async fn test_explicit_spawn_reinstalls_context() {
        let hospital = HospitalId::new();
        let seen = ContextStore::scope(hospital_context(hospital), async {
            ContextStore::spawn(async { current_hospitals() })
                .await
                .expect("join")
        })
        .await;
        assert_eq!(seen, vec![hospital]);
    }

    #[test]
    fn test_set_on_worker_does_not_reach_other_tasks() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");

        let leaked = runtime.block_on(async {
            tokio::spawn(async { ContextStore::set(TenantContext::system()) })
                .await
                .expect("join");
            tokio::spawn(async { ContextStore::get_or_empty().is_super_admin() })
                .await
                .expect("join")
        });

        assert!(!leaked);
        assert!(ContextStore::get().is_none());
    }

    #[tokio::test]
    async fn test_install_outside_scope_is_ignored_on_runtime() {
        let guard = ContextStore::install(TenantContext::system());
        assert!(ContextStore::get().is_none());
        drop(guard);
        assert!(ContextStore::get().is_none());
    }

    #[tokio::test]
    async fn test_clear_inside_scope_only_affects_scope() {
        let hospital = HospitalId::new();
        ContextStore::scope(hospital_context(hospital), async {
            ContextStore::clear();
            assert!(ContextStore::get().is_none());
        })
        .await;
        assert!(ContextStore::get().is_none());
    }
}
