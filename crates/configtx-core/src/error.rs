//! Error types for the configuration tree.

use thiserror::Error;

use crate::path::{ConfigPath, ElementKind};
use crate::schema::Section;

/// Errors raised while navigating, decoding or editing a configuration tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A navigation target does not exist.
    #[error("{0} not found")]
    NotFound(ConfigPath),

    /// A mandatory section of an active channel is absent.
    #[error("{0} missing from config")]
    MissingSection(Section),

    #[error("expected {expected} at {path}, found {found}")]
    WrongType {
        path: ConfigPath,
        expected: ElementKind,
        found: ElementKind,
    },

    /// A stored payload is not a valid encoding of its typed value.
    #[error("failed to decode {key} value: {reason}")]
    Decode { key: &'static str, reason: String },

    #[error("failed to encode {key} value: {reason}")]
    Encode { key: &'static str, reason: String },

    #[error("invalid config key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("invalid {key} value: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: &'static str },

    #[error("{key} entry {entry} already exists at {path}")]
    EntryExists {
        path: ConfigPath,
        key: &'static str,
        entry: String,
    },

    #[error("{key} entry {entry} does not exist at {path}")]
    EntryMissing {
        path: ConfigPath,
        key: &'static str,
        entry: String,
    },

    #[error("{0} already exists")]
    AlreadyExists(ConfigPath),
}

/// Result type for configuration tree operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
