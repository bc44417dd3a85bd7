//! Observers for container events.
//!
//! Observers receive bean creation and lifecycle hook events. Destruction
//! failures, which never abort `close()`, are surfaced here.

use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::lifecycle::{HookKind, Phase};

/// Observer trait for container diagnostics.
///
/// All methods have empty defaults so implementations pick the events they care about.
///
/// # Examples
///
/// ```rust
/// use ferrous_context::{BeanDefinition, Container, ContainerObserver};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Created(Mutex<Vec<String>>);
///
/// impl ContainerObserver for Created {
///     fn bean_created(&self, name: &str, _type_name: &'static str, _duration: Duration) {
///         self.0.lock().unwrap().push(name.to_string());
///     }
/// }
///
/// let created = Arc::new(Created::default());
/// let container = Container::new();
/// container.add_observer(created.clone());
/// container.register_type(BeanDefinition::new(|_| Ok(7u8)).named("seven")).unwrap();
/// container.get_by_name("seven").unwrap();
///
/// assert_eq!(*created.0.lock().unwrap(), vec!["seven".to_string()]);
/// ```
pub trait ContainerObserver: Send + Sync {
    /// Called after a bean instance has been constructed and stored.
    fn bean_created(&self, _name: &str, _type_name: &'static str, _duration: Duration) {}

    /// Called after a lifecycle hook completed successfully.
    fn hook_invoked(&self, _name: &str, _phase: Phase, _kind: HookKind) {}

    /// Called when a lifecycle hook failed.
    fn hook_failed(&self, _name: &str, _phase: Phase, _error: &DiError) {}
}

#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn ContainerObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn ContainerObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn bean_created(&self, name: &str, type_name: &'static str, duration: Duration) {
        for observer in &self.observers {
            observer.bean_created(name, type_name, duration);
        }
    }

    pub(crate) fn hook_invoked(&self, name: &str, phase: Phase, kind: HookKind) {
        for observer in &self.observers {
            observer.hook_invoked(name, phase, kind);
        }
    }

    pub(crate) fn hook_failed(&self, name: &str, phase: Phase, error: &DiError) {
        for observer in &self.observers {
            observer.hook_failed(name, phase, error);
        }
    }
}

/// Observer that forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ContainerObserver for TracingObserver {
    fn bean_created(&self, name: &str, type_name: &'static str, duration: Duration) {
        tracing::debug!(bean = name, bean_type = type_name, ?duration, "bean created");
    }

    fn hook_invoked(&self, name: &str, phase: Phase, kind: HookKind) {
        tracing::trace!(bean = name, %phase, ?kind, "lifecycle hook invoked");
    }

    fn hook_failed(&self, name: &str, phase: Phase, error: &DiError) {
        tracing::error!(bean = name, %phase, %error, "lifecycle hook failed");
    }
}
