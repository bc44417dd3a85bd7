//! Error types for the application context.

use thiserror::Error;

/// Application context errors
///
/// Represents the failure conditions of registration, resolution and the
/// `initialize`/`close` lifecycle.
///
/// # Examples
///
/// ```rust
/// use ferrous_context::{Container, DiError};
///
/// let container = Container::new();
/// match container.get_by_name_typed::<String>("missing") {
///     Err(DiError::BeanNotFound(name)) => assert_eq!(name, "missing"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_context::DiError;
///
/// let circular = DiError::Circular(vec!["a".into(), "b".into(), "a".into()]);
/// assert_eq!(circular.to_string(), "Circular dependency: a -> b -> a");
/// ```
#[derive(Debug, Error)]
pub enum DiError {
    /// A declaration could not be registered or its construction failed
    #[error("Failed to create bean '{name}' ({type_name}): {source}")]
    Registration {
        name: String,
        type_name: &'static str,
        #[source]
        source: anyhow::Error,
    },
    /// A required dependency type has no candidate bean
    #[error("No bean found for dependency type: {0}")]
    DependencyNotFound(&'static str),
    /// Circular dependency detected (includes the in-progress chain and the re-entered name)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    /// Typed lookup found no bean under the name
    #[error("No bean found with name: {0}")]
    BeanNotFound(String),
    /// Typed lookup found a bean that is not assignable to the requested type
    #[error("Bean named '{name}' is of type {actual}, but required type is {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    /// A post-construction hook failed
    #[error("Error during bean initialization: {name}: {source}")]
    Initialization {
        name: String,
        #[source]
        source: anyhow::Error,
    },
    /// A pre-destruction hook failed
    #[error("Error during bean destruction: {name}: {source}")]
    Destruction {
        name: String,
        #[source]
        source: anyhow::Error,
    },
    /// Maximum resolution depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// The container has been closed
    #[error("Container is closed")]
    Closed,
    /// `initialize` was called from a hook or factory running inside
    /// `initialize` or `close` on the same thread
    #[error("initialize() called while initialize() or close() is already running on this thread")]
    LifecycleReentry,
}

impl DiError {
    pub(crate) fn registration(
        name: impl Into<String>,
        type_name: &'static str,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        DiError::Registration {
            name: name.into(),
            type_name,
            source: source.into(),
        }
    }

    /// Recovers a container error that travelled through a user closure as
    /// `anyhow::Error`, or wraps a foreign error as a registration failure.
    pub(crate) fn from_construction(name: &str, type_name: &'static str, err: anyhow::Error) -> Self {
        match err.downcast::<DiError>() {
            Ok(di) => di,
            Err(other) => DiError::registration(name, type_name, other),
        }
    }
}

/// Result type for container operations
pub type DiResult<T> = Result<T, DiError>;
