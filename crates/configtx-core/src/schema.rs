//! Well-known keys of the channel configuration tree.
//!
//! Every lookup of a section, value or policy by its protocol name goes through
//! these constants so the resolver and the transaction surface stay in sync.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::path::ConfigPath;

// Groups
pub const CHANNEL_GROUP_KEY: &str = "Channel";
pub const ORDERER_GROUP_KEY: &str = "Orderer";
pub const APPLICATION_GROUP_KEY: &str = "Application";

// Values
pub const CAPABILITIES_KEY: &str = "Capabilities";
pub const HASHING_ALGORITHM_KEY: &str = "HashingAlgorithm";
pub const BLOCK_DATA_HASHING_STRUCTURE_KEY: &str = "BlockDataHashingStructure";
pub const ORDERER_ADDRESSES_KEY: &str = "OrdererAddresses";
pub const BATCH_SIZE_KEY: &str = "BatchSize";
pub const BATCH_TIMEOUT_KEY: &str = "BatchTimeout";
pub const CONSENSUS_TYPE_KEY: &str = "ConsensusType";
pub const ACLS_KEY: &str = "ACLs";
pub const ANCHOR_PEERS_KEY: &str = "AnchorPeers";
pub const ENDPOINTS_KEY: &str = "Endpoints";
pub const MSP_KEY: &str = "MSP";

// Policies
pub const ADMINS_POLICY_KEY: &str = "Admins";
pub const READERS_POLICY_KEY: &str = "Readers";
pub const WRITERS_POLICY_KEY: &str = "Writers";
pub const ENDORSEMENT_POLICY_KEY: &str = "Endorsement";
pub const LIFECYCLE_ENDORSEMENT_POLICY_KEY: &str = "LifecycleEndorsement";
pub const BLOCK_VALIDATION_POLICY_KEY: &str = "BlockValidation";

/// A scoping level of the configuration tree.
///
/// `Channel` is the root group and always exists. `Orderer` and `Application`
/// are mandatory subgroups of an active channel; their absence is a
/// structural error rather than a soft miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    Channel,
    Orderer,
    Application,
}

impl Section {
    /// The key of this section's group under the channel group, if any.
    pub const fn group_key(self) -> Option<&'static str> {
        match self {
            Section::Channel => None,
            Section::Orderer => Some(ORDERER_GROUP_KEY),
            Section::Application => Some(APPLICATION_GROUP_KEY),
        }
    }

    /// Lowercase name used in error messages.
    pub const fn label(self) -> &'static str {
        match self {
            Section::Channel => "channel",
            Section::Orderer => "orderer",
            Section::Application => "application",
        }
    }

    /// Path of this section's group, relative to the channel group.
    pub fn path(self) -> ConfigPath {
        match self.group_key() {
            Some(key) => ConfigPath::root().child(key),
            None => ConfigPath::root(),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_paths() {
        assert_eq!(Section::Channel.path(), ConfigPath::root());
        assert_eq!(Section::Orderer.path().to_string(), "/Channel/Orderer");
        assert_eq!(Section::Application.path().groups(), ["Application"]);
    }
}
