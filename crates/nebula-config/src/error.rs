//! Configuration and rule error types.

/// Errors that can occur when loading, saving, or parsing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize config to RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),
}

/// Errors produced when changing a rule.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RuleError {
    /// No rule of that name exists.
    #[error("unknown rule: {0}")]
    UnknownRule(String),

    /// The rule's validator rejected the value.
    #[error("invalid value {value:?} for rule {rule}: expected {expected}")]
    InvalidValue {
        rule: String,
        value: String,
        expected: String,
    },

    /// A `--rule` argument was not of the form `key=value`.
    #[error("malformed rule assignment {0:?}, expected key=value")]
    MalformedAssignment(String),
}
