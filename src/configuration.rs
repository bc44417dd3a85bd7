//! Configuration sources: beans whose methods are factories for other beans.

use std::sync::Arc;

use crate::context::ResolverContext;
use crate::definition::{shape_methods, BeanDefinition, Constructor, Shape, ShapeBuilder};
use crate::registry::AnyBean;

/// A bean type that declares factory methods for other beans.
///
/// The configuration bean itself is constructed at registration time; its
/// factory methods become lazy definitions that receive the configuration
/// instance.
///
/// # Examples
///
/// ```rust
/// use ferrous_context::{BeanDefinition, BeanMethods, Configuration, Container};
///
/// struct AppConfig { url: String }
/// struct Pool { url: String }
///
/// impl Configuration for AppConfig {
///     fn bean_methods(methods: &mut BeanMethods<Self>) {
///         methods.bean("pool", |cfg: &AppConfig, _ctx| Ok(Pool { url: cfg.url.clone() }));
///         methods.bean("greeting", |_: &AppConfig, _ctx| Ok("hello".to_string()));
///     }
/// }
///
/// let container = Container::new();
/// container.register_factory_source(BeanDefinition::new(|_| {
///     Ok(AppConfig { url: "mem://".to_string() })
/// })).unwrap();
///
/// let pool = container.get_by_name_typed::<Pool>("pool").unwrap();
/// assert_eq!(pool.url, "mem://");
/// assert!(container.contains_by_name("appConfig"));
/// ```
pub trait Configuration: Send + Sync + Sized + 'static {
    /// Declares the factory methods of this configuration type.
    fn bean_methods(methods: &mut BeanMethods<Self>);
}

type MethodFn<C, T> =
    Arc<dyn for<'a> Fn(&C, &ResolverContext<'a>) -> anyhow::Result<Option<T>> + Send + Sync>;

/// One factory method of a configuration type `C` producing `T`.
///
/// The bean name defaults to the operation name and can be overridden with
/// [`named`](FactoryMethod::named).
pub struct FactoryMethod<C, T> {
    operation: String,
    name: Option<String>,
    method: MethodFn<C, T>,
    shape: ShapeBuilder<T>,
}

impl<C: Configuration, T: Send + Sync + 'static> FactoryMethod<C, T> {
    /// Declares a factory method that always produces a bean.
    pub fn new<F>(operation: impl Into<String>, method: F) -> Self
    where
        F: Fn(&C, &ResolverContext<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self::optional(operation, move |owner: &C, ctx: &ResolverContext<'_>| method(owner, ctx).map(Some))
    }

    /// Declares a factory method that may produce nothing.
    ///
    /// Producing `None` fails resolution: a factory must yield a usable instance.
    pub fn optional<F>(operation: impl Into<String>, method: F) -> Self
    where
        F: Fn(&C, &ResolverContext<'_>) -> anyhow::Result<Option<T>> + Send + Sync + 'static,
    {
        Self {
            operation: operation.into(),
            name: None,
            method: Arc::new(method),
            shape: ShapeBuilder::new(),
        }
    }

    /// Overrides the bean name, which otherwise is the operation name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    shape_methods!();

    fn into_pending(self) -> PendingMethod<C> {
        let method = self.method;
        PendingMethod {
            name: self.name.unwrap_or(self.operation),
            shape: self.shape.build(),
            bind: Box::new(move |owner: Arc<C>| {
                let method = method.clone();
                let ctor: Constructor = Arc::new(move |ctx: &ResolverContext| {
                    let produced = method(&*owner, ctx)?;
                    Ok(produced.map(|bean| Arc::new(bean) as AnyBean))
                });
                ctor
            }),
        }
    }
}

struct PendingMethod<C> {
    name: String,
    shape: Shape,
    bind: Box<dyn FnOnce(Arc<C>) -> Constructor + Send>,
}

/// Factory method bound to a constructed configuration instance.
pub(crate) struct BoundMethod {
    pub(crate) name: String,
    pub(crate) shape: Shape,
    pub(crate) ctor: Constructor,
}

/// Collects the factory methods declared by a [`Configuration`] type.
pub struct BeanMethods<C> {
    methods: Vec<PendingMethod<C>>,
}

impl<C: Configuration> BeanMethods<C> {
    fn new() -> Self {
        Self { methods: Vec::new() }
    }

    /// Adds a fully described factory method.
    pub fn add<T: Send + Sync + 'static>(&mut self, method: FactoryMethod<C, T>) -> &mut Self {
        self.methods.push(method.into_pending());
        self
    }

    /// Shorthand for `add(FactoryMethod::new(operation, method))`.
    pub fn bean<T, F>(&mut self, operation: &str, method: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&C, &ResolverContext<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.add(FactoryMethod::new(operation, method))
    }

    /// Shorthand for `add(FactoryMethod::optional(operation, method))`.
    pub fn bean_opt<T, F>(&mut self, operation: &str, method: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&C, &ResolverContext<'_>) -> anyhow::Result<Option<T>> + Send + Sync + 'static,
    {
        self.add(FactoryMethod::optional(operation, method))
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    fn bind(self, owner: Arc<C>) -> Vec<BoundMethod> {
        self.methods
            .into_iter()
            .map(|pending| BoundMethod {
                name: pending.name,
                shape: pending.shape,
                ctor: (pending.bind)(owner.clone()),
            })
            .collect()
    }
}

pub(crate) type MethodDiscovery = Box<dyn FnOnce(&AnyBean) -> anyhow::Result<Vec<BoundMethod>> + Send>;

/// A type descriptor handed to [`Container::register_types`](crate::Container::register_types)
/// by a scanning collaborator: either a plain component or a configuration source.
pub struct Component {
    pub(crate) name: Option<String>,
    pub(crate) shape: Shape,
    pub(crate) ctor: Constructor,
    pub(crate) discovery: Option<MethodDiscovery>,
}

impl Component {
    /// A plain component.
    pub fn bean<T: Send + Sync + 'static>(definition: BeanDefinition<T>) -> Self {
        let (name, shape, ctor) = definition.into_parts();
        Self { name, shape, ctor, discovery: None }
    }

    /// A configuration source whose factory methods are registered once it is constructed.
    pub fn configuration<C: Configuration>(definition: BeanDefinition<C>) -> Self {
        let (name, shape, ctor) = definition.into_parts();
        let discovery: MethodDiscovery = Box::new(|bean: &AnyBean| {
            let owner = bean.clone().downcast::<C>().map_err(|_| {
                anyhow::anyhow!("configuration bean is not an instance of {}", std::any::type_name::<C>())
            })?;
            let mut methods = BeanMethods::new();
            C::bean_methods(&mut methods);
            Ok(methods.bind(owner))
        });
        Self { name, shape, ctor, discovery: Some(discovery) }
    }

    pub fn is_configuration(&self) -> bool {
        self.discovery.is_some()
    }

    pub fn type_name(&self) -> &'static str {
        self.shape.type_name()
    }
}

impl<T: Send + Sync + 'static> From<BeanDefinition<T>> for Component {
    fn from(definition: BeanDefinition<T>) -> Self {
        Component::bean(definition)
    }
}
