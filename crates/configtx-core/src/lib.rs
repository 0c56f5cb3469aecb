//! # ConfigTx Core
//!
//! The channel configuration tree and the pure operations over it.
//!
//! This crate contains no I/O and no networking. It represents the tree,
//! navigates it by name path, decodes well-known values and resolves
//! capability flags.
//!
//! ## Key Types
//!
//! - [`Config`] - Root wrapper around the channel group
//! - [`Group`] - Named node holding sub-groups, values and policies
//! - [`Value`] / [`Policy`] - Versioned leaves with their own mod_policy
//! - [`ConfigPath`] - Name path relative to the channel group
//! - [`ConfigHash`] - Blake3 fingerprint of the canonical encoding
//!
//! ## Capabilities
//!
//! [`get_capabilities`] returns `Ok(None)` when a section declares no
//! capabilities and fails with [`ConfigError::MissingSection`] when the
//! orderer or application section itself is absent.

pub mod canonical;
pub mod capabilities;
pub mod error;
pub mod path;
pub mod schema;
pub mod tree;
pub mod types;
pub mod validation;
pub mod values;

pub use canonical::{canonical_config_bytes, canonical_group_bytes};
pub use capabilities::{capabilities_in, get_capabilities};
pub use error::{ConfigError, Result};
pub use path::{ConfigPath, ElementKind, Lookup, Node};
pub use schema::Section;
pub use tree::{Config, Element, Group, ImplicitMetaRule, Policy, PolicyRule, Value};
pub use types::ConfigHash;
pub use validation::{validate_config, validate_group, validate_key};
pub use values::{
    Acls, AnchorPeers, BatchSize, BatchTimeout, BlockDataHashingStructure, Capabilities,
    CapabilityMap, ConfigValue, ConsensusState, ConsensusType, Endpoint, Endpoints,
    HashingAlgorithm, Msp, OrdererAddresses,
};
