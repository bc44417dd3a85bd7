//! Bean definitions: construction strategy, type views and lifecycle hooks.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::context::ResolverContext;
use crate::key::{key_of, TypeKey};
use crate::lifecycle::LifecycleHooks;
use crate::registry::AnyBean;

type ViewCast = Arc<dyn Fn(&AnyBean) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync>;

/// Type-erased constructor; `Ok(None)` means the factory produced nothing.
pub(crate) type Constructor =
    Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> anyhow::Result<Option<AnyBean>> + Send + Sync>;

/// A type a bean can be looked up as, with the cast from the stored instance.
#[derive(Clone)]
pub(crate) struct TypeView {
    key: TypeKey,
    cast: ViewCast,
}

/// Erased description of what a bean is: its concrete type, the types it is
/// assignable to and its lifecycle hooks.
#[derive(Clone)]
pub(crate) struct Shape {
    key: TypeKey,
    views: Arc<[TypeView]>,
    hooks: Arc<LifecycleHooks>,
}

impl Shape {
    pub(crate) fn type_name(&self) -> &'static str {
        self.key.display_name()
    }

    pub(crate) fn provides(&self, key: &TypeKey) -> bool {
        self.views.iter().any(|view| view.key == *key)
    }

    pub(crate) fn provided_names(&self) -> Vec<&'static str> {
        self.views.iter().map(|view| view.key.display_name()).collect()
    }

    pub(crate) fn hooks(&self) -> &LifecycleHooks {
        &self.hooks
    }

    /// Views `bean` as `Arc<T>` when this shape provides `T`.
    pub(crate) fn cast<T: ?Sized + Send + Sync + 'static>(&self, bean: &AnyBean) -> Option<Arc<T>> {
        let view = self.views.iter().find(|view| view.key.is::<T>())?;
        let boxed = (view.cast)(bean)?;
        boxed.downcast::<Arc<T>>().ok().map(|arc| *arc)
    }
}

/// Typed accumulator behind the builder methods of definitions.
pub(crate) struct ShapeBuilder<T> {
    views: Vec<TypeView>,
    pub(crate) hooks: LifecycleHooks,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> ShapeBuilder<T> {
    pub(crate) fn new() -> Self {
        let own: ViewCast = Arc::new(|bean: &AnyBean| {
            bean.clone()
                .downcast::<T>()
                .ok()
                .map(|arc| Box::new(arc) as Box<dyn Any + Send + Sync>)
        });
        Self {
            views: vec![TypeView { key: key_of::<T>(), cast: own }],
            hooks: LifecycleHooks::default(),
            _marker: PhantomData,
        }
    }

    pub(crate) fn provide<I, F>(&mut self, cast: F)
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
    {
        let key = key_of::<I>();
        if self.views.iter().any(|view| view.key == key) {
            return;
        }
        let cast: ViewCast = Arc::new(move |bean: &AnyBean| {
            let concrete = bean.clone().downcast::<T>().ok()?;
            Some(Box::new(cast(concrete)) as Box<dyn Any + Send + Sync>)
        });
        self.views.push(TypeView { key, cast });
    }

    pub(crate) fn build(self) -> Shape {
        Shape {
            key: key_of::<T>(),
            views: self.views.into(),
            hooks: Arc::new(self.hooks),
        }
    }
}

/// Builder methods shared by [`BeanDefinition`] and
/// [`FactoryMethod`](crate::FactoryMethod). Expects a `shape: ShapeBuilder<T>` field.
macro_rules! shape_methods {
    () => {
        /// Makes the bean assignable to `I`, usually a trait object.
        ///
        /// The cast is normally an unsizing coercion: `.provides::<dyn Repo, _>(|r| r)`.
        pub fn provides<I, F>(mut self, cast: F) -> Self
        where
            I: ?Sized + Send + Sync + 'static,
            F: Fn(::std::sync::Arc<T>) -> ::std::sync::Arc<I> + Send + Sync + 'static,
        {
            self.shape.provide(cast);
            self
        }

        /// Runs [`Initialize::initialize`](crate::Initialize::initialize) as the capability init hook.
        pub fn initializing(mut self) -> Self
        where
            T: $crate::Initialize,
        {
            self.shape.hooks.init.capability =
                Some($crate::lifecycle::typed_hook(|bean: &T| $crate::Initialize::initialize(bean)));
            self
        }

        /// Runs [`Dispose::dispose`](crate::Dispose::dispose) as the capability destroy hook.
        pub fn disposable(mut self) -> Self
        where
            T: $crate::Dispose,
        {
            self.shape.hooks.destroy.capability =
                Some($crate::lifecycle::typed_hook(|bean: &T| $crate::Dispose::dispose(bean)));
            self
        }

        /// Adds a post-construction hook; may be called repeatedly.
        pub fn post_construct<F>(mut self, hook: F) -> Self
        where
            F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
        {
            self.shape.hooks.init.marked.push($crate::lifecycle::typed_hook(hook));
            self
        }

        /// Adds a pre-destruction hook; may be called repeatedly.
        pub fn pre_destroy<F>(mut self, hook: F) -> Self
        where
            F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
        {
            self.shape.hooks.destroy.marked.push($crate::lifecycle::typed_hook(hook));
            self
        }

        /// Init hook used only when no capability or post-construct hook is declared.
        pub fn init_method<F>(mut self, hook: F) -> Self
        where
            F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
        {
            self.shape.hooks.init.fallback = Some($crate::lifecycle::typed_hook(hook));
            self
        }

        /// Destroy hook used only when no capability or pre-destroy hook is declared.
        pub fn destroy_method<F>(mut self, hook: F) -> Self
        where
            F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
        {
            self.shape.hooks.destroy.fallback = Some($crate::lifecycle::typed_hook(hook));
            self
        }
    };
}

pub(crate) use shape_methods;

/// Declaration of a class-style bean: one construction closure plus the
/// types it provides and its lifecycle hooks.
///
/// The closure receives a [`ResolverContext`] to resolve its dependencies and
/// is invoked at most once, on first access or during `initialize()`.
///
/// # Examples
///
/// ```rust
/// use ferrous_context::{BeanDefinition, Container};
/// use std::sync::Arc;
///
/// trait Repo: Send + Sync {
///     fn find(&self) -> &'static str;
/// }
///
/// struct MemoryRepo;
/// impl Repo for MemoryRepo {
///     fn find(&self) -> &'static str { "row" }
/// }
///
/// struct Service { repo: Arc<dyn Repo> }
///
/// let container = Container::new();
/// container.register_type(
///     BeanDefinition::new(|_| Ok(MemoryRepo)).provides::<dyn Repo, _>(|r| r),
/// ).unwrap();
/// container.register_type(BeanDefinition::new(|ctx| {
///     Ok(Service { repo: ctx.get::<dyn Repo>()? })
/// })).unwrap();
///
/// let service = container.get_by_name_typed::<Service>("service").unwrap();
/// assert_eq!(service.repo.find(), "row");
/// ```
pub struct BeanDefinition<T> {
    pub(crate) name: Option<String>,
    ctor: Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> anyhow::Result<T> + Send + Sync>,
    pub(crate) shape: ShapeBuilder<T>,
}

impl<T: Send + Sync + 'static> BeanDefinition<T> {
    /// Declares a bean built by `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&ResolverContext<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            name: None,
            ctor: Arc::new(factory),
            shape: ShapeBuilder::new(),
        }
    }

    /// Declares a bean from an already-built value.
    pub fn instance(value: T) -> Self {
        let slot = Mutex::new(Some(value));
        Self::new(move |_| {
            slot.lock()
                .take()
                .ok_or_else(|| anyhow::anyhow!("instance of {} was already handed out", std::any::type_name::<T>()))
        })
    }

    /// Overrides the default bean name derived from the type name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    shape_methods!();

    pub(crate) fn into_parts(self) -> (Option<String>, Shape, Constructor) {
        let ctor = self.ctor;
        let erased: Constructor = Arc::new(move |ctx: &ResolverContext<'_>| {
            let bean = ctor(ctx)?;
            Ok(Some(Arc::new(bean) as AnyBean))
        });
        (self.name, self.shape.build(), erased)
    }
}

/// Where a definition came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionKind {
    /// Registered directly as a type
    Component,
    /// Produced by a factory method of the named configuration bean
    Factory { owner: String },
}

/// Erased pending definition held by the registry.
pub(crate) struct Definition {
    pub(crate) name: String,
    pub(crate) kind: DefinitionKind,
    pub(crate) shape: Shape,
    pub(crate) ctor: Constructor,
}

impl Definition {
    pub(crate) fn new(name: String, kind: DefinitionKind, shape: Shape, ctor: Constructor) -> Self {
        Self { name, kind, shape, ctor }
    }
}
