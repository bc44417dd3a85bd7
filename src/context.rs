//! Resolver context handed to construction closures.

use std::sync::Arc;

use crate::config::ContainerOptions;
use crate::container::ContainerInner;
use crate::error::{DiError, DiResult};
use crate::key::key_of;

/// Context passed to bean factories for resolving dependencies.
///
/// Dependency lookups scan live beans first (creation order), then pending
/// definitions (registration order), constructing the first assignable
/// candidate. Construction happens inside the caller's creation scope, so
/// cycles are reported as [`DiError::Circular`].
///
/// # Examples
///
/// ```
/// use ferrous_context::{BeanDefinition, Container};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let container = Container::new();
/// container.register_type(BeanDefinition::new(|ctx| {
///     // ctx resolves other beans from the same container
///     Ok(UserService { db: ctx.get::<Database>()? })
/// })).unwrap();
/// container.register_type(BeanDefinition::new(|_| {
///     Ok(Database { url: "postgres://localhost".to_string() })
/// })).unwrap();
///
/// let service = container.get_by_type::<UserService>().unwrap().unwrap();
/// assert_eq!(service.db.url, "postgres://localhost");
/// ```
pub struct ResolverContext<'a> {
    inner: &'a ContainerInner,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(inner: &'a ContainerInner) -> Self {
        Self { inner }
    }

    /// Resolves a required dependency.
    ///
    /// Fails with [`DiError::DependencyNotFound`] when no bean is assignable to `T`.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.get_optional::<T>()?
            .ok_or(DiError::DependencyNotFound(std::any::type_name::<T>()))
    }

    /// Resolves an optional dependency; `Ok(None)` when no candidate exists.
    pub fn get_optional<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Option<Arc<T>>> {
        let key = key_of::<T>();
        match self.inner.resolve_dependency(&key)? {
            Some(bean) => bean
                .downcast::<T>()
                .map(Some)
                .ok_or_else(|| DiError::TypeMismatch {
                    name: bean.name().to_string(),
                    expected: key.display_name(),
                    actual: bean.type_name(),
                }),
            None => Ok(None),
        }
    }

    /// Resolves a dependency by bean name, failing if absent or of another type.
    pub fn get_named<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        self.inner.get_by_name_typed::<T>(name)
    }

    /// Resolves every bean assignable to `T`.
    pub fn get_all<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Vec<Arc<T>>> {
        self.inner.get_all_by_type::<T>()
    }

    /// Returns true when some bean (live or pending) is assignable to `T`.
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.inner.contains_by_type(&key_of::<T>())
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }
}
