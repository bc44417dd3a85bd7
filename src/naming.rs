//! Default bean-name derivation.

/// How a bean name is derived from its type when no explicit name is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum NamingStrategy {
    /// Simple type name with the first letter lower-cased (`UserService` -> `userService`)
    #[default]
    LowerCamel,
    /// Simple type name unchanged (`UserService`)
    SimpleName,
    /// Full `std::any::type_name` path (`my_app::services::UserService`)
    FullPath,
}

impl NamingStrategy {
    /// Derives the bean name for a type name as returned by `std::any::type_name`.
    ///
    /// ```rust
    /// use ferrous_context::NamingStrategy;
    ///
    /// let full = "my_app::services::UserService";
    /// assert_eq!(NamingStrategy::LowerCamel.bean_name(full), "userService");
    /// assert_eq!(NamingStrategy::SimpleName.bean_name(full), "UserService");
    /// assert_eq!(NamingStrategy::FullPath.bean_name(full), full);
    /// ```
    pub fn bean_name(self, type_name: &str) -> String {
        match self {
            NamingStrategy::LowerCamel => lower_first(simple_type_name(type_name)),
            NamingStrategy::SimpleName => simple_type_name(type_name).to_string(),
            NamingStrategy::FullPath => type_name.to_string(),
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lower_camel" | "lowercamel" | "camel" => Some(NamingStrategy::LowerCamel),
            "simple_name" | "simplename" | "simple" => Some(NamingStrategy::SimpleName),
            "full_path" | "fullpath" | "full" => Some(NamingStrategy::FullPath),
            _ => None,
        }
    }
}

/// Last path segment of a type name, generic arguments stripped.
pub fn simple_type_name(type_name: &str) -> &str {
    let base = match type_name.find('<') {
        Some(idx) => &type_name[..idx],
        None => type_name,
    };
    base.rsplit("::").next().unwrap_or(base)
}

fn lower_first(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
