//! Bean descriptors for introspection and diagnostics.

use std::fmt;

use crate::definition::DefinitionKind;
use crate::registry::Registry;

/// Whether a bean has been constructed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeanStatus {
    /// Only the definition exists
    Pending,
    /// The instance exists; `initialized` once its post-construction hooks ran
    Live { initialized: bool },
}

/// Bean descriptor for introspection and diagnostics
///
/// A snapshot of one registered bean, pending or live.
///
/// # Examples
///
/// ```rust
/// use ferrous_context::{BeanDefinition, BeanStatus, Container};
///
/// trait Clock: Send + Sync {}
/// struct SystemClock;
/// impl Clock for SystemClock {}
///
/// let container = Container::new();
/// container.register_type(BeanDefinition::new(|_| Ok(SystemClock)).provides::<dyn Clock, _>(|c| c)).unwrap();
///
/// let clock = &container.descriptors()[0];
/// assert_eq!(clock.name, "systemClock");
/// assert_eq!(clock.status, BeanStatus::Pending);
/// assert!(clock.provides.iter().any(|name| name.contains("Clock")));
///
/// container.initialize().unwrap();
/// assert_eq!(container.descriptors()[0].status, BeanStatus::Live { initialized: true });
/// ```
#[derive(Debug, Clone)]
pub struct BeanDescriptor {
    pub name: String,
    /// Concrete type name
    pub type_name: &'static str,
    pub kind: DefinitionKind,
    pub status: BeanStatus,
    /// Every type the bean can be looked up as, its own type first
    pub provides: Vec<&'static str>,
}

impl BeanDescriptor {
    pub fn is_live(&self) -> bool {
        matches!(self.status, BeanStatus::Live { .. })
    }

    /// Owning configuration bean for factory-method beans
    pub fn owner(&self) -> Option<&str> {
        match &self.kind {
            DefinitionKind::Factory { owner } => Some(owner),
            DefinitionKind::Component => None,
        }
    }

    /// Pending class definitions, pending factory definitions, then live beans.
    pub(crate) fn collect(registry: &Registry) -> Vec<BeanDescriptor> {
        let pending = registry
            .classes
            .iter()
            .chain(registry.factories.iter())
            .map(|(name, def)| BeanDescriptor {
                name: name.to_string(),
                type_name: def.shape.type_name(),
                kind: def.kind.clone(),
                status: BeanStatus::Pending,
                provides: def.shape.provided_names(),
            });
        let live = registry.instances.iter().map(|(name, bean)| BeanDescriptor {
            name: name.to_string(),
            type_name: bean.shape().type_name(),
            kind: bean.kind.clone(),
            status: BeanStatus::Live { initialized: bean.initialized },
            provides: bean.shape().provided_names(),
        });
        pending.chain(live).collect()
    }
}

impl fmt::Display for BeanDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.type_name)?;
        match self.status {
            BeanStatus::Pending => write!(f, " pending")?,
            BeanStatus::Live { initialized: true } => write!(f, " live")?,
            BeanStatus::Live { initialized: false } => write!(f, " live, not initialized")?,
        }
        if let Some(owner) = self.owner() {
            write!(f, " from {owner}")?;
        }
        Ok(())
    }
}
