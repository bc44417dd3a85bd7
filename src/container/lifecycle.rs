//! `initialize` / `close` and hook execution.

use std::thread::{self, ThreadId};

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use crate::error::{DiError, DiResult};
use crate::internal::creation;
use crate::lifecycle::Phase;
use crate::registry::{BeanHandle, ContainerState};

use super::ContainerInner;

/// Serializes `initialize` and `close`, refusing re-entry from the thread
/// that already holds it.
#[derive(Default)]
pub(crate) struct LifecycleLock {
    gate: Mutex<()>,
    holder: Mutex<Option<ThreadId>>,
}

struct LifecycleGuard<'a> {
    lock: &'a LifecycleLock,
    _gate: MutexGuard<'a, ()>,
}

impl LifecycleLock {
    /// `None` when the current thread is already inside `initialize` or `close`.
    fn enter(&self) -> Option<LifecycleGuard<'_>> {
        let me = thread::current().id();
        if *self.holder.lock() == Some(me) {
            return None;
        }
        let gate = self.gate.lock();
        *self.holder.lock() = Some(me);
        Some(LifecycleGuard { lock: self, _gate: gate })
    }
}

impl Drop for LifecycleGuard<'_> {
    fn drop(&mut self) {
        *self.lock.holder.lock() = None;
    }
}

impl ContainerInner {
    pub(crate) fn initialize(&self) -> DiResult<()> {
        let Some(_lifecycle) = self.lifecycle.enter() else {
            return Err(DiError::LifecycleReentry);
        };
        match self.registry.read().state {
            ContainerState::Initialized => {
                debug!(container = self.id, "context already initialized");
                return Ok(());
            }
            ContainerState::Closed => return Err(DiError::Closed),
            ContainerState::Uninitialized => {}
        }

        self.instantiate_pending()?;

        loop {
            let pending = self.registry.read().uninitialized();
            if pending.is_empty() {
                let mut registry = self.registry.write();
                // A hook may have created more beans since the snapshot
                if !registry.uninitialized().is_empty() {
                    continue;
                }
                registry.state = ContainerState::Initialized;
                let beans = registry.instances.len();
                drop(registry);
                info!(container = self.id, beans, "Context initialized");
                return Ok(());
            }

            for bean in pending {
                self.run_init_hooks(&bean)?;
                self.registry.write().mark_initialized(bean.name());
            }
        }
    }

    pub(crate) fn close(&self) {
        let Some(_lifecycle) = self.lifecycle.enter() else {
            warn!(container = self.id, "close() called during initialize() or close() on the same thread, ignored");
            return;
        };
        let beans: Vec<BeanHandle> = {
            let registry = self.registry.read();
            match registry.state {
                ContainerState::Uninitialized => {
                    info!(container = self.id, "Context is not initialized, nothing to close");
                    return;
                }
                ContainerState::Closed => {
                    debug!(container = self.id, "context already closed");
                    return;
                }
                ContainerState::Initialized => {}
            }
            registry.instances.iter().rev().map(|(name, bean)| bean.handle(name)).collect()
        };

        let failures: usize = beans.iter().map(|bean| self.run_destroy_hooks(bean)).sum();

        {
            let mut registry = self.registry.write();
            registry.clear();
            registry.state = ContainerState::Closed;
        }
        creation::clear(self.id);
        info!(container = self.id, beans = beans.len(), failures, "Context closed");
    }

    /// Runs the post-construction hooks of `bean`, stopping at the first failure.
    pub(crate) fn run_init_hooks(&self, bean: &BeanHandle) -> DiResult<()> {
        let hooks = bean.shape.hooks().phase(Phase::Init);
        if hooks.is_empty() {
            return Ok(());
        }
        let observers = self.observers();
        for (kind, hook) in hooks.plan() {
            debug!(bean = bean.name(), ?kind, "invoking init hook");
            if let Err(source) = hook(bean.instance()) {
                let err = DiError::Initialization { name: bean.name().to_string(), source };
                observers.hook_failed(bean.name(), Phase::Init, &err);
                return Err(err);
            }
            observers.hook_invoked(bean.name(), Phase::Init, kind);
        }
        Ok(())
    }

    /// Runs every pre-destruction hook of `bean`. Returns the number of failures.
    fn run_destroy_hooks(&self, bean: &BeanHandle) -> usize {
        let hooks = bean.shape.hooks().phase(Phase::Destroy);
        if hooks.is_empty() {
            return 0;
        }
        let observers = self.observers();
        let mut failures = 0;
        for (kind, hook) in hooks.plan() {
            debug!(bean = bean.name(), ?kind, "invoking destroy hook");
            match hook(bean.instance()) {
                Ok(()) => observers.hook_invoked(bean.name(), Phase::Destroy, kind),
                Err(source) => {
                    let err = DiError::Destruction { name: bean.name().to_string(), source };
                    error!(bean = bean.name(), error = %err, "destroy hook failed");
                    observers.hook_failed(bean.name(), Phase::Destroy, &err);
                    failures += 1;
                }
            }
        }
        failures
    }
}
