//! # ConfigTx Update
//!
//! Minimal deltas between two channel configurations.
//!
//! ## Overview
//!
//! A reconfiguration is staged as an updated copy of a base configuration.
//! [`compute_update`] walks both trees and emits a [`ConfigUpdate`] holding
//! only the elements whose content changed:
//!
//! - **Modified** elements carry their new content at `base version + 1`
//! - **Added** elements carry version 1 (a whole subtree for added groups)
//! - **Removed** elements are explicit entries carrying the removed version
//!
//! Unchanged elements are omitted, so channel members only sign for what
//! actually changed. [`signature_requirements`] lists the policy that governs
//! each change.
//!
//! ## Applying
//!
//! [`apply_update`] is a reference applier: it checks the base fingerprint
//! and every version, then produces the next configuration atomically.
//!
//! ```rust
//! use configtx_core::{Config, Group, Value};
//! use configtx_update::{apply_update, compute_update};
//!
//! let base = Config::new(Group::new("Admins"));
//! let mut updated = base.clone();
//! updated
//!     .channel_group
//!     .values
//!     .insert("HashingAlgorithm".into(), Value::new(b"SHA256".to_vec(), "Admins"));
//!
//! let update = compute_update(&base, &updated);
//! assert_eq!(update.change_count(), 1);
//!
//! let next = apply_update(&base, &update).unwrap();
//! assert_eq!(next.sequence, 1);
//! ```

pub mod apply;
pub mod compute;
pub mod delta;
pub mod error;
pub mod requirements;

pub use apply::apply_update;
pub use compute::{compute_update, compute_update_with, diff_group, UpdateOptions, ADDED_VERSION};
pub use delta::{Change, ChangeKind, ChangeRecord, ConfigUpdate, GroupChange, GroupDelta};
pub use error::{Result, UpdateError};
pub use requirements::{
    qualify_policy, required_policies, signature_requirements, SignatureRequirement,
};
