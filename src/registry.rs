//! Bean stores: pending definitions and live instances.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::definition::{Definition, DefinitionKind, Shape};
use crate::error::{DiError, DiResult};
use crate::key::TypeKey;

/// Type-erased shared bean instance.
pub type AnyBean = Arc<dyn Any + Send + Sync>;

/// Container state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    /// Accepting registrations; beans are created lazily
    Uninitialized,
    /// All definitions resolved and post-construction hooks run
    Initialized,
    /// Beans destroyed and stores cleared; terminal
    Closed,
}

/// A live bean as returned by untyped lookups.
///
/// Cloning is cheap: the instance is shared with the container.
#[derive(Clone)]
pub struct BeanHandle {
    name: String,
    instance: AnyBean,
    pub(crate) shape: Shape,
}

impl BeanHandle {
    pub(crate) fn new(name: &str, instance: AnyBean, shape: Shape) -> Self {
        Self { name: name.to_string(), instance, shape }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Concrete type name of the instance
    pub fn type_name(&self) -> &'static str {
        self.shape.type_name()
    }

    pub fn instance(&self) -> &AnyBean {
        &self.instance
    }

    pub fn into_instance(self) -> AnyBean {
        self.instance
    }

    /// Views the bean as `T` when it is assignable to `T`.
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.shape.cast::<T>(&self.instance)
    }

    /// Returns true when the bean is assignable to `T`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.shape.provides(&crate::key::key_of::<T>())
    }
}

impl fmt::Debug for BeanHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanHandle")
            .field("name", &self.name)
            .field("type", &self.type_name())
            .finish()
    }
}

pub(crate) struct LiveBean {
    instance: AnyBean,
    shape: Shape,
    pub(crate) kind: DefinitionKind,
    /// Post-construction hooks have run
    pub(crate) initialized: bool,
}

impl LiveBean {
    pub(crate) fn new(instance: AnyBean, shape: Shape, kind: DefinitionKind) -> Self {
        Self { instance, shape, kind, initialized: false }
    }

    pub(crate) fn shape(&self) -> &Shape {
        &self.shape
    }

    pub(crate) fn handle(&self, name: &str) -> BeanHandle {
        BeanHandle {
            name: name.to_string(),
            instance: self.instance.clone(),
            shape: self.shape.clone(),
        }
    }
}

/// Insertion-ordered map keyed by bean name.
///
/// Removal leaves a tombstone so positions stay valid; the vector is
/// compacted once tombstones outnumber live entries.
pub(crate) struct OrderedMap<V> {
    entries: Vec<Option<(String, V)>>,
    index: HashMap<String, usize>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self { entries: Vec::new(), index: HashMap::new() }
    }
}

impl<V> OrderedMap<V> {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&V> {
        let pos = *self.index.get(name)?;
        self.entries[pos].as_ref().map(|(_, value)| value)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        let pos = *self.index.get(name)?;
        self.entries[pos].as_mut().map(|(_, value)| value)
    }

    /// Appends `value`; callers check for an existing name first.
    pub(crate) fn push(&mut self, name: String, value: V) {
        debug_assert!(!self.index.contains_key(&name));
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(Some((name, value)));
    }

    /// Removes `name`, preserving the order of the remaining entries.
    pub(crate) fn remove(&mut self, name: &str) -> Option<V> {
        let pos = self.index.remove(name)?;
        let (_, value) = self.entries[pos].take()?;
        if self.entries.len() > 2 * self.index.len() + 8 {
            self.compact();
        }
        Some(value)
    }

    fn compact(&mut self) {
        self.entries.retain(Option::is_some);
        for (pos, (name, _)) in self.entries.iter().flatten().enumerate() {
            if let Some(slot) = self.index.get_mut(name) {
                *slot = pos;
            }
        }
    }

    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &V)> {
        self.entries.iter().flatten().map(|(name, value)| (name.as_str(), value))
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.iter().map(|(name, _)| name.to_string()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

/// All bean stores plus the container state, guarded together.
pub(crate) struct Registry {
    pub(crate) state: ContainerState,
    pub(crate) classes: OrderedMap<Arc<Definition>>,
    pub(crate) factories: OrderedMap<Arc<Definition>>,
    pub(crate) instances: OrderedMap<LiveBean>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            state: ContainerState::Uninitialized,
            classes: OrderedMap::default(),
            factories: OrderedMap::default(),
            instances: OrderedMap::default(),
        }
    }

    pub(crate) fn contains_name(&self, name: &str) -> bool {
        self.instances.contains(name) || self.classes.contains(name) || self.factories.contains(name)
    }

    /// Inserts a class definition unless the name is taken. Returns whether it was inserted.
    pub(crate) fn register_class(&mut self, definition: Definition) -> DiResult<bool> {
        self.ensure_open()?;
        if self.contains_name(&definition.name) {
            return Ok(false);
        }
        self.classes.push(definition.name.clone(), Arc::new(definition));
        Ok(true)
    }

    /// Inserts a factory definition unless the name is taken. Returns whether it was inserted.
    pub(crate) fn register_factory(&mut self, definition: Definition) -> DiResult<bool> {
        self.ensure_open()?;
        if self.contains_name(&definition.name) {
            return Ok(false);
        }
        self.factories.push(definition.name.clone(), Arc::new(definition));
        Ok(true)
    }

    /// Pending definition for `name`, class definitions first.
    pub(crate) fn definition(&self, name: &str) -> Option<Arc<Definition>> {
        self.classes.get(name).or_else(|| self.factories.get(name)).cloned()
    }

    /// Replaces the pending definition of `name` with its live instance.
    pub(crate) fn promote(&mut self, name: &str, bean: LiveBean) {
        self.classes.remove(name);
        self.factories.remove(name);
        if !self.instances.contains(name) {
            self.instances.push(name.to_string(), bean);
        }
    }

    /// Drops everything registered under `name`.
    pub(crate) fn forget(&mut self, name: &str) {
        self.classes.remove(name);
        self.factories.remove(name);
        self.instances.remove(name);
    }

    /// Pending class definitions assignable to `key`, in registration order.
    pub(crate) fn pending_class_assignable(&self, key: &TypeKey) -> Vec<Arc<Definition>> {
        self.classes
            .iter()
            .filter(|(_, def)| def.shape.provides(key))
            .map(|(_, def)| def.clone())
            .collect()
    }

    pub(crate) fn first_pending_class_assignable(&self, key: &TypeKey) -> Option<Arc<Definition>> {
        self.classes
            .iter()
            .find(|(_, def)| def.shape.provides(key))
            .map(|(_, def)| def.clone())
    }

    /// First pending definition assignable to `key`, class definitions before
    /// factory definitions.
    pub(crate) fn first_pending_assignable(&self, key: &TypeKey) -> Option<Arc<Definition>> {
        self.classes
            .iter()
            .chain(self.factories.iter())
            .find(|(_, def)| def.shape.provides(key))
            .map(|(_, def)| def.clone())
    }

    pub(crate) fn first_live_assignable(&self, key: &TypeKey) -> Option<BeanHandle> {
        self.instances
            .iter()
            .find(|(_, bean)| bean.shape.provides(key))
            .map(|(name, bean)| bean.handle(name))
    }

    pub(crate) fn any_assignable(&self, key: &TypeKey) -> bool {
        self.classes.iter().any(|(_, def)| def.shape.provides(key))
            || self.instances.iter().any(|(_, bean)| bean.shape.provides(key))
            || self.factories.iter().any(|(_, def)| def.shape.provides(key))
    }

    /// Live beans assignable to `key`, in creation order.
    pub(crate) fn live_assignable(&self, key: &TypeKey) -> Vec<BeanHandle> {
        self.instances
            .iter()
            .filter(|(_, bean)| bean.shape.provides(key))
            .map(|(name, bean)| bean.handle(name))
            .collect()
    }

    pub(crate) fn live(&self, name: &str) -> Option<BeanHandle> {
        self.instances.get(name).map(|bean| bean.handle(name))
    }

    /// Live beans whose post-construction hooks have not run, in creation order.
    pub(crate) fn uninitialized(&self) -> Vec<BeanHandle> {
        self.instances
            .iter()
            .filter(|(_, bean)| !bean.initialized)
            .map(|(name, bean)| bean.handle(name))
            .collect()
    }

    pub(crate) fn mark_initialized(&mut self, name: &str) {
        if let Some(bean) = self.instances.get_mut(name) {
            bean.initialized = true;
        }
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.classes.is_empty() || !self.factories.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.classes.clear();
        self.factories.clear();
        self.instances.clear();
    }

    fn ensure_open(&self) -> DiResult<()> {
        if self.state == ContainerState::Closed {
            return Err(DiError::Closed);
        }
        Ok(())
    }
}
