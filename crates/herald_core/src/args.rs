//! Argument declarations and parsed arguments

use serde::{Deserialize, Serialize};

/// A flag a command accepts, e.g. `add <value>` or `rm`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgSpec {
    /// Flag name, matched case-insensitively against message tokens
    pub name: String,
    /// Whether the token after the flag is taken as its value
    #[serde(default)]
    pub requires_value: bool,
    /// A missing value fails the whole parse instead of being recorded as absent
    #[serde(default)]
    pub strict: bool,
}

impl ArgSpec {
    /// A flag with no value
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires_value: false,
            strict: false,
        }
    }

    /// A flag followed by a value
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires_value: true,
            strict: false,
        }
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub(crate) fn matches(&self, token: &str) -> bool {
        !token.is_empty() && token.to_lowercase() == self.name.to_lowercase()
    }
}

/// A flag found in a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedArg {
    pub name: String,
    /// The value token, empty when none was consumed
    pub value: String,
    pub requires_value: bool,
    /// True when a value was consumed, or for flags that take none
    pub has_value: bool,
}

impl ParsedArg {
    pub(crate) fn present(spec: &ArgSpec) -> Self {
        Self {
            name: spec.name.clone(),
            value: String::new(),
            requires_value: false,
            has_value: true,
        }
    }

    pub(crate) fn with_value(spec: &ArgSpec, value: &str) -> Self {
        Self {
            name: spec.name.clone(),
            value: value.to_string(),
            requires_value: true,
            has_value: true,
        }
    }

    pub(crate) fn missing_value(spec: &ArgSpec) -> Self {
        Self {
            name: spec.name.clone(),
            value: String::new(),
            requires_value: true,
            has_value: false,
        }
    }

    /// The value, if one was actually consumed
    pub fn value(&self) -> Option<&str> {
        (self.requires_value && self.has_value).then_some(self.value.as_str())
    }
}
