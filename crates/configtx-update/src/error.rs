//! Error types for computing and applying configuration updates.

use configtx_core::{ConfigError, ConfigHash, ConfigPath};
use thiserror::Error;

/// Errors that can occur while diffing or applying a configuration update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// The base and updated configurations are identical and empty updates
    /// were not allowed.
    #[error("no differences detected between original and updated config")]
    NoDifferences,

    /// The update was computed against a different base configuration.
    #[error("update was computed against config {expected}, but the base is {actual}")]
    StaleBase {
        expected: ConfigHash,
        actual: ConfigHash,
    },

    /// An element's version does not match what the update expects.
    #[error("version mismatch at {path}: expected {expected}, found {found}")]
    VersionMismatch {
        path: ConfigPath,
        expected: u64,
        found: u64,
    },

    /// The update adds an element that already exists.
    #[error("{0} already exists")]
    AlreadyExists(ConfigPath),

    /// The update modifies or removes an element that does not exist.
    #[error("{0} does not exist")]
    Missing(ConfigPath),

    /// The governing element has an empty mod_policy and cannot be changed.
    #[error("{0} has no mod_policy and cannot be modified")]
    Unmodifiable(ConfigPath),

    /// Tree error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for update operations.
pub type Result<T> = std::result::Result<T, UpdateError>;
