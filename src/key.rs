//! Type keys for bean lookup.

use std::any::TypeId;

/// Explicit type token used instead of runtime type introspection.
///
/// A `TypeKey` identifies a type a bean can be looked up as: either the
/// bean's concrete type or one of the trait objects it was registered to
/// provide. Equality and hashing use the `TypeId` only; the name is kept
/// for diagnostics and error messages.
///
/// # Examples
///
/// ```rust
/// use ferrous_context::{key_of, TypeKey};
///
/// trait Greeter: Send + Sync {}
///
/// let concrete = key_of::<String>();
/// assert_eq!(concrete.display_name(), "alloc::string::String");
///
/// let object = key_of::<dyn Greeter>();
/// assert!(object.display_name().contains("Greeter"));
/// assert_ne!(concrete, object);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Get the type name for display
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Returns true when this key denotes `T`.
    #[inline(always)]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

// TypeId-only comparison (ignore name)
impl PartialEq for TypeKey {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl std::hash::Hash for TypeKey {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Creates the key for `T`, which may be unsized (`dyn Trait`, `str`).
#[inline(always)]
pub fn key_of<T: ?Sized + 'static>() -> TypeKey {
    TypeKey {
        id: TypeId::of::<T>(),
        name: std::any::type_name::<T>(),
    }
}
