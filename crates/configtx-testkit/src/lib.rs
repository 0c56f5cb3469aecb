//! # ConfigTx Testkit
//!
//! Testing utilities for channel configuration trees.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A sample channel with orderer and application sections,
//!   shaped like a freshly bootstrapped network
//! - **Generators**: Proptest strategies for trees whose keys overlap, so
//!   two generated trees differ by additions, removals and modifications
//!
//! ## Test Fixtures
//!
//! ```rust
//! use configtx_core::{get_capabilities, Section};
//! use configtx_testkit::fixtures::{sample_config, ORDERER_CAPABILITIES};
//!
//! let config = sample_config();
//! let capabilities = get_capabilities(Section::Orderer, &config).unwrap().unwrap();
//! assert!(capabilities.contains_key(ORDERER_CAPABILITIES[0]));
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use configtx_testkit::generators::config_pair;
//! use configtx_update::compute_update;
//!
//! proptest! {
//!     #[test]
//!     fn diff_is_deterministic((base, updated) in config_pair()) {
//!         prop_assert_eq!(compute_update(&base, &updated), compute_update(&base, &updated));
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{
    base_application_group, base_orderer_group, sample_config, without_versions,
};
pub use generators::{config, config_pair, group};
