//! Application context facade.
//!
//! This module contains the [`Container`] type: registration of class-style
//! beans and configuration sources, lookups by name and by type, and the
//! `initialize`/`close` lifecycle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::ContainerOptions;
use crate::configuration::{Component, Configuration};
use crate::definition::BeanDefinition;
use crate::descriptors::BeanDescriptor;
use crate::error::{DiError, DiResult};
use crate::internal::InFlight;
use crate::key::key_of;
use crate::observer::{ContainerObserver, Observers};
use crate::registry::{BeanHandle, ContainerState, Registry};

mod lifecycle;
mod resolve;

use lifecycle::LifecycleLock;

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Named-bean application context.
///
/// Beans are registered as definitions and constructed lazily on first
/// access, or eagerly by [`initialize`](Container::initialize). Every bean is
/// a singleton within its container: a name is constructed at most once.
///
/// # Thread Safety
///
/// `Container` is `Send + Sync` and cheap to clone (it shares one `Arc`).
/// Store locks are never held while user closures run, so factories and
/// hooks may call back into the container. A thread that needs a bean
/// another thread is constructing waits for it; if that wait would close a
/// dependency cycle across threads, it fails with [`DiError::Circular`].
///
/// # Examples
///
/// ```
/// use ferrous_context::{BeanDefinition, Container, ContainerState};
/// use std::sync::Arc;
///
/// struct Repo { table: &'static str }
/// struct Service { repo: Arc<Repo> }
///
/// let container = Container::new();
/// container.register_type(BeanDefinition::new(|_| Ok(Repo { table: "users" }))).unwrap();
/// container.register_type(BeanDefinition::new(|ctx| Ok(Service { repo: ctx.get::<Repo>()? }))).unwrap();
///
/// container.initialize().unwrap();
/// assert_eq!(container.state(), ContainerState::Initialized);
///
/// let service = container.get_by_name_typed::<Service>("service").unwrap();
/// let repo = container.get_by_name_typed::<Repo>("repo").unwrap();
/// assert!(Arc::ptr_eq(&service.repo, &repo));
///
/// container.close();
/// assert!(container.all_beans().unwrap().is_empty());
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    pub(crate) id: u64,
    pub(crate) options: ContainerOptions,
    pub(crate) registry: RwLock<Registry>,
    pub(crate) observers: RwLock<Observers>,
    pub(crate) in_flight: InFlight,
    lifecycle: LifecycleLock,
}

impl Container {
    /// Creates an empty container with default options.
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    /// Creates an empty container with the given options.
    pub fn with_options(options: ContainerOptions) -> Self {
        let inner = ContainerInner {
            id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
            options,
            registry: RwLock::new(Registry::new()),
            observers: RwLock::new(Observers::default()),
            in_flight: InFlight::default(),
            lifecycle: LifecycleLock::default(),
        };
        tracing::debug!(container = inner.id, naming = ?inner.options.naming, "container created");
        Self { inner: Arc::new(inner) }
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    pub fn state(&self) -> ContainerState {
        self.inner.registry.read().state
    }

    /// Adds an observer for creation and lifecycle hook events.
    pub fn add_observer(&self, observer: Arc<dyn ContainerObserver>) {
        self.inner.observers.write().add(observer);
    }

    /// Registers a class-style bean.
    ///
    /// The bean name is the explicit [`named`](BeanDefinition::named) value or
    /// is derived from the type name by the configured naming strategy.
    /// Returns `Ok(false)` without replacing anything when the name is
    /// already taken by a definition or a live bean.
    ///
    /// # Errors
    ///
    /// * [`DiError::Closed`] after [`close`](Container::close)
    /// * [`DiError::Registration`] for an empty bean name
    pub fn register_type<T: Send + Sync + 'static>(&self, definition: BeanDefinition<T>) -> DiResult<bool> {
        self.inner.register_component(Component::bean(definition))
    }

    /// Registers a batch of components, stopping at the first failure.
    ///
    /// Components registered before the failing one stay registered.
    pub fn register_types<I>(&self, components: I) -> DiResult<()>
    where
        I: IntoIterator<Item = Component>,
    {
        for component in components {
            self.inner.register_component(component)?;
        }
        Ok(())
    }

    /// Registers a configuration source.
    ///
    /// The configuration bean is constructed immediately and each of its
    /// factory methods becomes a lazy bean definition. If construction fails
    /// nothing stays registered under its name.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_context::{BeanDefinition, BeanMethods, Configuration, Container};
    ///
    /// struct Ports;
    ///
    /// impl Configuration for Ports {
    ///     fn bean_methods(methods: &mut BeanMethods<Self>) {
    ///         methods.bean("httpPort", |_: &Ports, _| Ok(8080u16));
    ///     }
    /// }
    ///
    /// let container = Container::new();
    /// assert!(container.register_factory_source(BeanDefinition::new(|_| Ok(Ports))).unwrap());
    /// assert!(container.contains_by_name("ports"));
    /// assert_eq!(*container.get_by_name_typed::<u16>("httpPort").unwrap(), 8080);
    /// ```
    pub fn register_factory_source<C: Configuration>(&self, definition: BeanDefinition<C>) -> DiResult<bool> {
        self.inner.register_component(Component::configuration(definition))
    }

    /// Looks up a bean by name, constructing it if only its definition exists.
    pub fn get_by_name(&self, name: &str) -> DiResult<Option<BeanHandle>> {
        self.inner.resolve_name(name)
    }

    /// Looks up a bean by name and views it as `T`.
    ///
    /// # Errors
    ///
    /// * [`DiError::BeanNotFound`] when nothing is registered under `name`
    /// * [`DiError::TypeMismatch`] when the bean is not assignable to `T`
    pub fn get_by_name_typed<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        self.inner.get_by_name_typed::<T>(name)
    }

    /// First bean assignable to `T`.
    ///
    /// Pending class definitions are scanned first, then live beans; the
    /// first candidate is constructed if needed. Pending factory beans are
    /// not considered here, so an already-live bean wins over them.
    pub fn get_by_type<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Option<Arc<T>>> {
        self.inner.get_by_type::<T>()
    }

    /// Like [`get_by_type`](Container::get_by_type), logging and discarding
    /// resolution errors.
    pub fn get_optional_by_type<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        match self.inner.get_by_type::<T>() {
            Ok(bean) => bean,
            Err(error) => {
                tracing::warn!(bean_type = std::any::type_name::<T>(), %error, "optional lookup failed");
                None
            }
        }
    }

    /// Every bean assignable to `T`, constructing pending candidates.
    ///
    /// Pending class definitions come first, then already-live beans. Each
    /// bean appears once. Pending factory beans are left unbuilt.
    pub fn get_all_by_type<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Vec<Arc<T>>> {
        self.inner.get_all_by_type::<T>()
    }

    /// Constructs every pending definition and returns all live beans in
    /// creation order.
    pub fn all_beans(&self) -> DiResult<Vec<BeanHandle>> {
        self.inner.instantiate_pending()?;
        let registry = self.inner.registry.read();
        Ok(registry.instances.iter().map(|(name, bean)| bean.handle(name)).collect())
    }

    /// Returns true when a definition or live bean is registered under `name`.
    pub fn contains_by_name(&self, name: &str) -> bool {
        self.inner.registry.read().contains_name(name)
    }

    /// Returns true when some definition or live bean is assignable to `T`.
    pub fn contains_by_type<T: ?Sized + 'static>(&self) -> bool {
        self.inner.contains_by_type(&key_of::<T>())
    }

    /// Constructs every pending bean and runs post-construction hooks.
    ///
    /// Class definitions are resolved before factory definitions, each in
    /// registration order; hooks then run in creation order. Calling this on
    /// an initialized container is a no-op.
    ///
    /// # Errors
    ///
    /// * The first construction or hook failure; the container stays uninitialized
    /// * [`DiError::Closed`] after [`close`](Container::close)
    /// * [`DiError::LifecycleReentry`] when called from a hook or factory
    ///   already running inside `initialize` or `close` on this thread
    pub fn initialize(&self) -> DiResult<()> {
        self.inner.initialize()
    }

    /// Runs pre-destruction hooks in reverse creation order, then empties
    /// every store. Destruction failures are logged and reported to
    /// observers; they never stop teardown.
    ///
    /// Closing an uninitialized or already closed container does nothing, as
    /// does a call from a hook running inside `initialize` or `close`.
    pub fn close(&self) {
        self.inner.close()
    }

    /// Snapshot of every definition and live bean, pending definitions first.
    pub fn descriptors(&self) -> Vec<BeanDescriptor> {
        BeanDescriptor::collect(&self.inner.registry.read())
    }

    /// Human-readable dump of the container contents.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(out, "Container #{} ({:?})", self.inner.id, self.state());
        for descriptor in self.descriptors() {
            let _ = writeln!(out, "  {descriptor}");
        }
        out
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.inner.registry.read();
        f.debug_struct("Container")
            .field("id", &self.inner.id)
            .field("state", &registry.state)
            .field("definitions", &(registry.classes.len() + registry.factories.len()))
            .field("instances", &registry.instances.len())
            .finish()
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        if Arc::strong_count(&self.inner) == 1 {
            if let Some(registry) = self.inner.registry.try_read() {
                if registry.state == ContainerState::Initialized && !registry.instances.is_empty() {
                    tracing::warn!(
                        container = self.inner.id,
                        beans = registry.instances.len(),
                        "container dropped without close(); destroy hooks were not run"
                    );
                }
            }
        }
    }
}

impl ContainerInner {
    pub(crate) fn observers(&self) -> Observers {
        self.observers.read().clone()
    }

    pub(crate) fn get_by_name_typed<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        let bean = self
            .resolve_name(name)?
            .ok_or_else(|| DiError::BeanNotFound(name.to_string()))?;
        bean.downcast::<T>().ok_or_else(|| DiError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
            actual: bean.type_name(),
        })
    }
}
