//! Lifecycle capabilities and hook tiers.
//!
//! Every bean has two hook phases, post-construction and pre-destruction,
//! each with three tiers that are declared at registration time:
//!
//! 1. **Capability**: the bean type implements [`Initialize`] / [`Dispose`]
//!    and the definition opts in with `.initializing()` / `.disposable()`.
//! 2. **Marked**: any number of `.post_construct(..)` / `.pre_destroy(..)`
//!    closures, run in declaration order after the capability hook.
//! 3. **Fallback**: `.init_method(..)` / `.destroy_method(..)`, run only when
//!    neither of the tiers above is declared.

use std::fmt;
use std::sync::Arc;

use crate::registry::AnyBean;

/// Initialization capability, invoked once after the bean is constructed.
///
/// Hooks may look up other beans. Calling `Container::initialize` from a
/// hook that runs inside `initialize` fails with `DiError::LifecycleReentry`.
///
/// # Examples
///
/// ```rust
/// use ferrous_context::{BeanDefinition, Container, Initialize};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct Pool { warm: AtomicBool }
///
/// impl Initialize for Pool {
///     fn initialize(&self) -> anyhow::Result<()> {
///         self.warm.store(true, Ordering::SeqCst);
///         Ok(())
///     }
/// }
///
/// let container = Container::new();
/// container.register_type(
///     BeanDefinition::new(|_| Ok(Pool { warm: AtomicBool::new(false) })).initializing(),
/// ).unwrap();
/// container.initialize().unwrap();
///
/// let pool = container.get_by_type::<Pool>().unwrap().unwrap();
/// assert!(pool.warm.load(Ordering::SeqCst));
/// ```
pub trait Initialize: Send + Sync + 'static {
    fn initialize(&self) -> anyhow::Result<()>;
}

/// Destruction capability, invoked once when the container is closed.
///
/// A `Container::close` call made from inside a destroy hook is ignored
/// with a warning; teardown continues.
pub trait Dispose: Send + Sync + 'static {
    fn dispose(&self) -> anyhow::Result<()>;
}

/// Lifecycle phase a hook belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Init,
    Destroy,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Init => f.write_str("init"),
            Phase::Destroy => f.write_str("destroy"),
        }
    }
}

/// Tier a hook was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    Capability,
    Marked,
    Fallback,
}

pub(crate) type HookFn = Arc<dyn Fn(&AnyBean) -> anyhow::Result<()> + Send + Sync>;

/// Wraps a typed hook so it can run against the type-erased instance.
pub(crate) fn typed_hook<T, F>(hook: F) -> HookFn
where
    T: Send + Sync + 'static,
    F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(move |bean: &AnyBean| {
        let typed = (**bean).downcast_ref::<T>().ok_or_else(|| {
            anyhow::anyhow!("lifecycle hook expected an instance of {}", std::any::type_name::<T>())
        })?;
        hook(typed)
    })
}

/// Hooks of a single phase, grouped by tier.
#[derive(Clone, Default)]
pub(crate) struct TieredHooks {
    pub(crate) capability: Option<HookFn>,
    pub(crate) marked: Vec<HookFn>,
    pub(crate) fallback: Option<HookFn>,
}

impl TieredHooks {
    /// Hooks to run, in order, honoring tier precedence.
    pub(crate) fn plan(&self) -> Vec<(HookKind, HookFn)> {
        let mut plan = Vec::with_capacity(self.marked.len() + 1);
        if let Some(hook) = &self.capability {
            plan.push((HookKind::Capability, hook.clone()));
        }
        plan.extend(self.marked.iter().map(|hook| (HookKind::Marked, hook.clone())));
        if plan.is_empty() {
            if let Some(hook) = &self.fallback {
                plan.push((HookKind::Fallback, hook.clone()));
            }
        }
        plan
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.capability.is_none() && self.marked.is_empty() && self.fallback.is_none()
    }
}

#[derive(Clone, Default)]
pub(crate) struct LifecycleHooks {
    pub(crate) init: TieredHooks,
    pub(crate) destroy: TieredHooks,
}

impl LifecycleHooks {
    pub(crate) fn phase(&self, phase: Phase) -> &TieredHooks {
        match phase {
            Phase::Init => &self.init,
            Phase::Destroy => &self.destroy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> HookFn {
        Arc::new(|_| Ok(()))
    }

    fn kinds(hooks: &TieredHooks) -> Vec<HookKind> {
        hooks.plan().into_iter().map(|(kind, _)| kind).collect()
    }

    #[test]
    fn fallback_runs_alone() {
        let hooks = TieredHooks { fallback: Some(noop()), ..Default::default() };
        assert_eq!(kinds(&hooks), vec![HookKind::Fallback]);
    }

    #[test]
    fn capability_precedes_marked_and_suppresses_fallback() {
        let hooks = TieredHooks {
            capability: Some(noop()),
            marked: vec![noop(), noop()],
            fallback: Some(noop()),
        };
        assert_eq!(kinds(&hooks), vec![HookKind::Capability, HookKind::Marked, HookKind::Marked]);
    }

    #[test]
    fn marked_alone_suppresses_fallback() {
        let hooks = TieredHooks { marked: vec![noop()], fallback: Some(noop()), ..Default::default() };
        assert_eq!(kinds(&hooks), vec![HookKind::Marked]);
    }

    #[test]
    fn typed_hook_rejects_foreign_instance() {
        let hook = typed_hook(|_: &u32| Ok(()));
        let bean: AnyBean = Arc::new("not a u32".to_string());
        assert!(hook(&bean).is_err());
    }
}
