//! Configuration error types.

/// Errors raised while locating, loading, saving or validating `config.ron`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The platform exposes no per-user configuration directory.
    #[error("no configuration directory available on this platform")]
    NoConfigDir,

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

    /// A tuning value is outside its legal range.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human readable constraint that was violated.
        reason: &'static str,
    },
}
