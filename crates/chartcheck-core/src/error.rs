//! # Error Types
//!
//! Errors raised by object accessors, the lookup index, and configuration
//! loading. All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.

use thiserror::Error;

/// A rendered object is missing a field the caller relies on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObjectError {
    /// A required field is absent or not a string.
    #[error("object is missing required string field '{field}'")]
    MissingField {
        /// Dotted path of the missing field, e.g. `metadata.name`.
        field: String,
    },

    /// The value is not a JSON object and cannot represent a manifest.
    #[error("expected a mapping, found {found}")]
    NotAMapping {
        /// JSON type name of the offending value.
        found: &'static str,
    },
}

/// Configuration loading failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable holds a value that is not a valid URL.
    #[error("invalid URL for {var}: {reason}")]
    InvalidUrl {
        /// Environment variable name.
        var: String,
        /// Parser message.
        reason: String,
    },

    /// An environment variable holds a value that is not a recognised boolean.
    #[error("invalid boolean for {var}: '{value}'")]
    InvalidBool {
        /// Environment variable name.
        var: String,
        /// Raw value.
        value: String,
    },

    /// An environment variable holds a value that is not a valid integer.
    #[error("invalid integer for {var}: '{value}'")]
    InvalidInteger {
        /// Environment variable name.
        var: String,
        /// Raw value.
        value: String,
    },
}
