//! # ConfigTx
//!
//! Staged reconfiguration of a channel configuration.
//!
//! ## Overview
//!
//! A [`ConfigTx`] is built from a base [`Config`]. The base is never
//! modified; every getter reads and every setter writes a working copy.
//! Once the changes are staged, [`ConfigTx::compute_update`] returns the
//! minimal [`ConfigUpdate`] turning the base into the working copy.
//!
//! - **Channel**: capabilities, policies, hashing algorithm, orderer addresses
//! - **Orderer**: capabilities, policies, batch size and timeout, consensus
//!   type and state, organizations and their endpoints
//! - **Application**: capabilities, policies, ACLs, organizations and their
//!   anchor peers
//!
//! Setters stamp the touched element's version relative to the base: one
//! bump when the content differs, the base version when it was restored,
//! version 1 when the element is new.
//!
//! ## Usage
//!
//! ```rust
//! use configtx::{Config, ConfigTx, Group};
//!
//! let base = Config::new(
//!     Group::new("Admins").with_group("Orderer", Group::new("Admins")),
//! );
//! let mut tx = ConfigTx::new(base);
//!
//! tx.add_orderer_capability("V2_0").unwrap();
//! assert!(tx.orderer_capabilities().unwrap().unwrap()["V2_0"]);
//!
//! let update = tx.compute_update().unwrap();
//! assert_eq!(update.change_count(), 1);
//!
//! // Sections are mandatory once addressed.
//! let err = tx.application_capabilities().unwrap_err();
//! assert_eq!(err.to_string(), "application missing from config");
//! ```
//!
//! ## Re-exports
//!
//! - `configtx::core` - The configuration tree and typed values
//! - `configtx::update` - Delta computation and the reference applier

pub mod application;
pub mod capabilities;
pub mod channel;
pub mod error;
pub mod orderer;
pub mod organization;
pub mod policies;
mod stamp;
pub mod tx;

pub use configtx_core as core;
pub use configtx_update as update;

pub use error::{Result, TxError};
pub use organization::Organization;
pub use tx::{ConfigTx, ConfigTxOptions};

pub use configtx_core::{
    CapabilityMap, Config, ConfigPath, Endpoint, Group, ImplicitMetaRule, Policy, PolicyRule,
    Section, Value,
};
pub use configtx_update::{apply_update, ChangeKind, ConfigUpdate, SignatureRequirement};
