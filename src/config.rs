//! Container configuration.
//!
//! Options can be built in code, loaded from the environment with
//! [`ContainerOptions::from_env`], or (with the `config` feature)
//! deserialized from any serde format.

use std::env;

use thiserror::Error;

use crate::naming::NamingStrategy;

/// Default maximum nesting of bean construction.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Environment variable prefix read by [`ContainerOptions::from_env`].
pub const ENV_PREFIX: &str = "FERROUS_CONTEXT";

/// Invalid option value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

/// Options controlling naming and lifecycle behavior of a [`Container`](crate::Container).
///
/// # Examples
///
/// ```rust
/// use ferrous_context::{Container, ContainerOptions, NamingStrategy};
///
/// let options = ContainerOptions::default()
///     .with_naming(NamingStrategy::SimpleName)
///     .with_max_depth(64);
/// let container = Container::with_options(options);
/// assert_eq!(container.options().max_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Default bean-name derivation for definitions without an explicit name
    pub naming: NamingStrategy,
    /// Run post-construction hooks on beans created after `initialize()`
    pub init_late_beans: bool,
    /// Maximum nesting of bean construction before failing with `DepthExceeded`
    pub max_depth: usize,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            naming: NamingStrategy::default(),
            init_late_beans: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ContainerOptions {
    pub fn with_naming(mut self, naming: NamingStrategy) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_init_late_beans(mut self, enabled: bool) -> Self {
        self.init_late_beans = enabled;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Loads options from `FERROUS_CONTEXT_*` environment variables.
    ///
    /// Unset variables keep their defaults:
    /// - `FERROUS_CONTEXT_NAMING`: `lower_camel`, `simple_name` or `full_path`
    /// - `FERROUS_CONTEXT_INIT_LATE_BEANS`: `true`/`false`/`1`/`0`
    /// - `FERROUS_CONTEXT_MAX_DEPTH`: positive integer
    pub fn from_env() -> Result<Self, OptionsError> {
        Self::from_lookup(|key| env::var(format!("{}_{}", ENV_PREFIX, key)).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, OptionsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(value) = lookup("NAMING") {
            options.naming = NamingStrategy::parse(&value).ok_or_else(|| invalid("NAMING", &value))?;
        }

        if let Some(value) = lookup("INIT_LATE_BEANS") {
            options.init_late_beans = match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => true,
                "false" | "0" | "no" | "off" => false,
                _ => return Err(invalid("INIT_LATE_BEANS", &value)),
            };
        }

        if let Some(value) = lookup("MAX_DEPTH") {
            options.max_depth = value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|depth| *depth > 0)
                .ok_or_else(|| invalid("MAX_DEPTH", &value))?;
        }

        Ok(options)
    }
}

fn invalid(key: &str, value: &str) -> OptionsError {
    OptionsError::InvalidValue {
        key: format!("{}_{}", ENV_PREFIX, key),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_lookup_yields_defaults() {
        let options = ContainerOptions::from_lookup(|_| None).unwrap();
        assert_eq!(options, ContainerOptions::default());
    }

    #[test]
    fn parses_all_keys() {
        let options = ContainerOptions::from_lookup(lookup_from(&[
            ("NAMING", "full_path"),
            ("INIT_LATE_BEANS", "off"),
            ("MAX_DEPTH", "32"),
        ]))
        .unwrap();

        assert_eq!(options.naming, NamingStrategy::FullPath);
        assert!(!options.init_late_beans);
        assert_eq!(options.max_depth, 32);
    }

    #[test]
    fn rejects_zero_depth() {
        let err = ContainerOptions::from_lookup(lookup_from(&[("MAX_DEPTH", "0")])).unwrap_err();
        assert_eq!(
            err,
            OptionsError::InvalidValue {
                key: "FERROUS_CONTEXT_MAX_DEPTH".to_string(),
                value: "0".to_string(),
            }
        );
    }
}
