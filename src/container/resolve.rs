//! Registration and resolution.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use tracing::{debug, trace};

use crate::configuration::{Component, MethodDiscovery};
use crate::context::ResolverContext;
use crate::definition::{Definition, DefinitionKind};
use crate::error::{DiError, DiResult};
use crate::internal::{creation, CreationGuard};
use crate::key::{key_of, TypeKey};
use crate::registry::{BeanHandle, ContainerState, LiveBean};

use super::ContainerInner;

impl ContainerInner {
    pub(crate) fn register_component(&self, component: Component) -> DiResult<bool> {
        let Component { name, shape, ctor, discovery } = component;
        let type_name = shape.type_name();
        let name = name.unwrap_or_else(|| self.options.naming.bean_name(type_name));
        if name.is_empty() {
            return Err(DiError::registration(name, type_name, anyhow!("bean name must not be empty")));
        }

        let definition = Definition::new(name.clone(), DefinitionKind::Component, shape, ctor);
        if !self.registry.write().register_class(definition)? {
            debug!(bean = %name, bean_type = type_name, "name already registered, keeping existing bean");
            return Ok(false);
        }
        debug!(bean = %name, bean_type = type_name, "registered bean definition");

        if let Some(discover) = discovery {
            if let Err(err) = self.register_bean_methods(&name, discover) {
                self.registry.write().forget(&name);
                let own = matches!(&err, DiError::Closed)
                    || matches!(&err, DiError::Registration { name: failed, .. } if *failed == name);
                return Err(if own { err } else { DiError::registration(name, type_name, err) });
            }
        }
        Ok(true)
    }

    /// Constructs the configuration bean `owner` and registers its factory methods.
    fn register_bean_methods(&self, owner: &str, discover: MethodDiscovery) -> DiResult<()> {
        let bean = self
            .resolve_name(owner)?
            .ok_or_else(|| DiError::BeanNotFound(owner.to_string()))?;
        let methods = discover(bean.instance())
            .map_err(|err| DiError::from_construction(owner, bean.type_name(), err))?;

        if methods.iter().any(|method| method.name.is_empty()) {
            return Err(DiError::registration(
                owner,
                bean.type_name(),
                anyhow!("factory method bean name must not be empty"),
            ));
        }

        let mut registry = self.registry.write();
        for method in methods {
            let name = method.name;
            let kind = DefinitionKind::Factory { owner: owner.to_string() };
            let definition = Definition::new(name.clone(), kind, method.shape, method.ctor);
            if registry.register_factory(definition)? {
                debug!(bean = %name, owner, "registered factory method");
            } else {
                debug!(bean = %name, owner, "name already registered, skipping factory method");
            }
        }
        Ok(())
    }

    /// Live bean `name`, or its definition constructed on demand.
    pub(crate) fn resolve_name(&self, name: &str) -> DiResult<Option<BeanHandle>> {
        let pending = {
            let registry = self.registry.read();
            if let Some(bean) = registry.live(name) {
                return Ok(Some(bean));
            }
            registry.definition(name)
        };
        match pending {
            Some(definition) => self.create(&definition).map(Some),
            None => Ok(None),
        }
    }

    /// Dependency lookup used by [`ResolverContext`]: live beans first, then
    /// pending definitions.
    pub(crate) fn resolve_dependency(&self, key: &TypeKey) -> DiResult<Option<BeanHandle>> {
        let pending = {
            let registry = self.registry.read();
            if let Some(bean) = registry.first_live_assignable(key) {
                return Ok(Some(bean));
            }
            registry.first_pending_assignable(key)
        };
        match pending {
            Some(definition) => self.create(&definition).map(Some),
            None => Ok(None),
        }
    }

    /// Pending class definitions, then live beans. Factory definitions are
    /// only reached through dependency resolution.
    pub(crate) fn get_by_type<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Option<Arc<T>>> {
        let key = key_of::<T>();
        let pending = self.registry.read().first_pending_class_assignable(&key);
        let bean = match pending {
            Some(definition) => Some(self.create(&definition)?),
            None => self.registry.read().first_live_assignable(&key),
        };
        Ok(bean.and_then(|bean| bean.downcast::<T>()))
    }

    pub(crate) fn get_all_by_type<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Vec<Arc<T>>> {
        let key = key_of::<T>();
        let mut seen = HashSet::new();
        let mut beans = Vec::new();

        let pending = self.registry.read().pending_class_assignable(&key);
        for definition in pending {
            let bean = self.create(&definition)?;
            if seen.insert(bean.name().to_string()) {
                beans.extend(bean.downcast::<T>());
            }
        }

        let live = self.registry.read().live_assignable(&key);
        for bean in live {
            if seen.insert(bean.name().to_string()) {
                beans.extend(bean.downcast::<T>());
            }
        }
        Ok(beans)
    }

    pub(crate) fn contains_by_type(&self, key: &TypeKey) -> bool {
        self.registry.read().any_assignable(key)
    }

    /// Constructs pending definitions until none remain: class definitions
    /// first, then factory definitions, each in registration order.
    pub(crate) fn instantiate_pending(&self) -> DiResult<()> {
        loop {
            let names = {
                let registry = self.registry.read();
                if !registry.has_pending() {
                    return Ok(());
                }
                let mut names = registry.classes.names();
                names.extend(registry.factories.names());
                names
            };
            for name in names {
                self.resolve_name(&name)?;
            }
        }
    }

    /// Builds the bean for `definition`, at most once per name.
    fn create(&self, definition: &Arc<Definition>) -> DiResult<BeanHandle> {
        let name = definition.name.as_str();
        let _scope = CreationGuard::enter(self.id, name, self.options.max_depth)?;
        let path = creation::current_path(self.id);
        let _claim = self.in_flight.claim(name, &path)?;

        {
            let registry = self.registry.read();
            if let Some(bean) = registry.live(name) {
                return Ok(bean);
            }
            if registry.state == ContainerState::Closed {
                return Err(DiError::Closed);
            }
        }

        let type_name = definition.shape.type_name();
        trace!(bean = name, ?path, "constructing bean");
        let started = Instant::now();
        let instance = (definition.ctor)(&ResolverContext::new(self))
            .map_err(|err| DiError::from_construction(name, type_name, err))?
            .ok_or_else(|| {
                DiError::registration(name, type_name, anyhow!("factory method produced no instance"))
            })?;
        let elapsed = started.elapsed();

        let run_hooks = {
            let mut registry = self.registry.write();
            if registry.state == ContainerState::Closed {
                return Err(DiError::Closed);
            }
            let bean = LiveBean::new(instance.clone(), definition.shape.clone(), definition.kind.clone());
            registry.promote(name, bean);
            registry.state == ContainerState::Initialized && self.options.init_late_beans
        };

        debug!(bean = name, bean_type = type_name, ?elapsed, "instantiated bean");
        let observers = self.observers();
        if observers.has_observers() {
            observers.bean_created(name, type_name, elapsed);
        }

        let handle = BeanHandle::new(name, instance, definition.shape.clone());
        if run_hooks {
            self.run_init_hooks(&handle)?;
            self.registry.write().mark_initialized(name);
        }
        Ok(handle)
    }
}
