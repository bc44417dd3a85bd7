//! # ferrous-context
//!
//! A named-bean application context: register beans by type or through
//! configuration sources, resolve them by name or by type, and drive their
//! post-construction and pre-destruction hooks.
//!
//! ## Features
//!
//! - **Named singletons**: every bean has a unique name and is constructed at most once
//! - **Lazy construction**: definitions are built on first access or by `initialize()`
//! - **Trait lookups**: beans declare the trait objects they can be resolved as
//! - **Configuration sources**: factory methods on a configuration bean define further beans
//! - **Circular dependency detection**: cycles are reported with the full name path
//! - **Tiered lifecycle hooks**: capability traits, marked closures and fallback methods
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_context::{BeanDefinition, Container};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let container = Container::new();
//! container.register_type(BeanDefinition::new(|ctx| {
//!     Ok(UserService { db: ctx.get::<Database>()? })
//! })).unwrap();
//! container.register_type(BeanDefinition::new(|_| {
//!     Ok(Database { connection_string: "postgres://localhost".to_string() })
//! })).unwrap();
//!
//! container.initialize().unwrap();
//! let user_service = container.get_by_name_typed::<UserService>("userService").unwrap();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! container.close();
//! ```
//!
//! ## Trait Lookups
//!
//! ```rust
//! use ferrous_context::{BeanDefinition, Container};
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String {
//!         format!("[LOG] {}", message)
//!     }
//! }
//!
//! let container = Container::new();
//! container.register_type(
//!     BeanDefinition::new(|_| Ok(ConsoleLogger)).provides::<dyn Logger, _>(|l| l),
//! ).unwrap();
//!
//! let logger = container.get_by_type::<dyn Logger>().unwrap().unwrap();
//! assert_eq!(logger.log("hello"), "[LOG] hello");
//! ```
//!
//! ## Lifecycle
//!
//! `initialize()` constructs every pending definition and runs init hooks in
//! creation order. `close()` runs destroy hooks in reverse creation order,
//! logs failures without stopping, and empties the container for good.

pub mod config;
pub mod configuration;
pub mod container;
pub mod context;
pub mod definition;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod lifecycle;
pub mod naming;
pub mod observer;
pub mod registry;

// Internal modules
mod internal;

// Re-export core types
pub use config::{ContainerOptions, OptionsError};
pub use configuration::{BeanMethods, Component, Configuration, FactoryMethod};
pub use container::Container;
pub use context::ResolverContext;
pub use definition::{BeanDefinition, DefinitionKind};
pub use descriptors::{BeanDescriptor, BeanStatus};
pub use error::{DiError, DiResult};
pub use key::{key_of, TypeKey};
pub use lifecycle::{Dispose, HookKind, Initialize, Phase};
pub use naming::NamingStrategy;
pub use observer::{ContainerObserver, TracingObserver};
pub use registry::{AnyBean, BeanHandle, ContainerState};
