use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum HeraldError {
    #[error("Invalid bot configuration")]
    #[diagnostic(
        code(herald_core::configuration),
        help("Bot option '{field}' is invalid: {reason}")
    )]
    Configuration { field: String, reason: String },

    #[error("Failed to load configuration file")]
    #[diagnostic(
        code(herald_core::config_file),
        help("Expected {expected} at {config_path}")
    )]
    ConfigFile {
        config_path: String,
        expected: String,
        #[source]
        cause: ConfigError,
    },

    #[error("Alias '{alias}' already exists for another command")]
    #[diagnostic(
        code(herald_core::duplicate_alias),
        help("'{alias}' is already taken by command '{existing}'; pick a different alias for '{command}'")
    )]
    DuplicateAlias {
        alias: String,
        command: String,
        existing: String,
    },

    #[error("Command '{name}' is already registered")]
    #[diagnostic(
        code(herald_core::duplicate_command),
        help("Command names and aliases share one namespace; '{name}' is used by '{existing}'")
    )]
    DuplicateCommand { name: String, existing: String },

    #[error("No prefix found in message content")]
    #[diagnostic(code(herald_core::no_prefix_found))]
    NoPrefixFound,

    #[error("No command or alias found from message content")]
    #[diagnostic(
        code(herald_core::command_not_found),
        help("'{name}' is neither a registered command nor an alias")
    )]
    CommandNotFound { name: String },

    #[error("Command has no arguments to parse")]
    #[diagnostic(
        code(herald_core::no_args_declared),
        help("Command '{command}' declares no arguments; don't call parse_args for it")
    )]
    NoArgsDeclared { command: String },

    #[error("No args matching command found")]
    #[diagnostic(
        code(herald_core::no_args_found),
        help("None of the declared flags of '{command}' appear in the message")
    )]
    NoArgsFound { command: String },

    #[error("No value found for required argument")]
    #[diagnostic(
        code(herald_core::missing_value),
        help("Argument '{argument}' must be followed by a value")
    )]
    MissingValue { argument: String },

    #[error("Filter did not work on value")]
    #[diagnostic(
        code(herald_core::filter_rejected),
        help("Filter '{filter}' rejected the message '{content}'")
    )]
    FilterRejected { filter: String, content: String },

    #[error("Collector canceled")]
    #[diagnostic(code(herald_core::collector_cancelled))]
    CollectorCancelled,

    #[error("Context deadline exceeded")]
    #[diagnostic(
        code(herald_core::deadline_exceeded),
        help("Collected {collected} of {expected} messages before the timeout elapsed")
    )]
    DeadlineExceeded {
        timeout: Duration,
        collected: usize,
        expected: usize,
    },

    #[error("Message bus closed")]
    #[diagnostic(
        code(herald_core::message_bus_closed),
        help("The dispatcher that feeds collectors has been dropped")
    )]
    MessageBusClosed,

    #[error("Gateway request failed")]
    #[diagnostic(
        code(herald_core::gateway),
        help("Gateway operation '{operation}' failed")
    )]
    Gateway {
        operation: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Errors from reading or writing a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(String),
}

pub type Result<T> = std::result::Result<T, HeraldError>;

impl HeraldError {
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn gateway(
        operation: impl Into<String>,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Gateway {
            operation: operation.into(),
            cause: cause.into(),
        }
    }

    pub fn filter_rejected(filter: impl Into<String>, content: impl Into<String>) -> Self {
        Self::FilterRejected {
            filter: filter.into(),
            content: content.into(),
        }
    }

    /// Routing misses are dropped by the dispatcher instead of surfaced
    pub fn is_routing_miss(&self) -> bool {
        matches!(self, Self::NoPrefixFound | Self::CommandNotFound { .. })
    }

    /// Terminal collector failures handed back to the handler
    pub fn is_collector_failure(&self) -> bool {
        matches!(
            self,
            Self::FilterRejected { .. }
                | Self::CollectorCancelled
                | Self::DeadlineExceeded { .. }
                | Self::MessageBusClosed
        )
    }
}
