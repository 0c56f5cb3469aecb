//! Error types for ConfigTx operations.

use configtx_core::ConfigError;
use configtx_update::UpdateError;
use thiserror::Error;

/// Errors that can occur while staging or computing a reconfiguration.
///
/// Both variants are transparent, so structural failures keep their exact
/// messages, e.g. `orderer missing from config`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    /// Tree navigation, decoding or validation error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Update computation error.
    #[error(transparent)]
    Update(#[from] UpdateError),
}

/// Result type for ConfigTx operations.
pub type Result<T> = std::result::Result<T, TxError>;
