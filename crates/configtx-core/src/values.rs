//! Typed payloads for well-known configuration values.
//!
//! The tree stores payloads as opaque bytes. Values with a protocol meaning
//! implement [`ConfigValue`], which binds the type to its key and encodes it
//! as CBOR. Collections use ordered containers so the encoding is
//! deterministic.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::schema::{
    ACLS_KEY, ANCHOR_PEERS_KEY, BATCH_SIZE_KEY, BATCH_TIMEOUT_KEY,
    BLOCK_DATA_HASHING_STRUCTURE_KEY, CAPABILITIES_KEY, CONSENSUS_TYPE_KEY, ENDPOINTS_KEY,
    HASHING_ALGORITHM_KEY, MSP_KEY, ORDERER_ADDRESSES_KEY,
};

/// A value payload with a fixed key and a CBOR encoding.
pub trait ConfigValue: Serialize + DeserializeOwned {
    /// Key under which the value is stored in its group.
    const KEY: &'static str;

    fn encode(&self) -> Result<Bytes> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| ConfigError::Encode {
            key: Self::KEY,
            reason: e.to_string(),
        })?;
        Ok(buf.into())
    }

    fn decode(payload: &[u8]) -> Result<Self> {
        ciborium::from_reader(payload).map_err(|e| ConfigError::Decode {
            key: Self::KEY,
            reason: e.to_string(),
        })
    }
}

/// Capability flags as returned to callers: every declared flag maps to
/// `true`; undeclared flags have no entry.
pub type CapabilityMap = BTreeMap<String, bool>;

/// The set of enabled capability flags at one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub capabilities: BTreeSet<String>,
}

impl Capabilities {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            capabilities: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from a capability map; `false` entries are dropped.
    pub fn from_map(map: &CapabilityMap) -> Self {
        Self {
            capabilities: map
                .iter()
                .filter(|(_, enabled)| **enabled)
                .map(|(name, _)| name.clone())
                .collect(),
        }
    }

    pub fn to_map(&self) -> CapabilityMap {
        self.capabilities
            .iter()
            .map(|name| (name.clone(), true))
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.capabilities.contains(name)
    }
}

impl ConfigValue for Capabilities {
    const KEY: &'static str = CAPABILITIES_KEY;
}

/// Hash function used for block hashing, e.g. `SHA256`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingAlgorithm {
    pub name: String,
}

impl Default for HashingAlgorithm {
    fn default() -> Self {
        Self {
            name: "SHA256".into(),
        }
    }
}

impl ConfigValue for HashingAlgorithm {
    const KEY: &'static str = HASHING_ALGORITHM_KEY;
}

/// Merkle width used to hash block data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDataHashingStructure {
    pub width: u32,
}

impl Default for BlockDataHashingStructure {
    fn default() -> Self {
        Self { width: u32::MAX }
    }
}

impl ConfigValue for BlockDataHashingStructure {
    const KEY: &'static str = BLOCK_DATA_HASHING_STRUCTURE_KEY;
}

/// Channel-wide list of ordering service endpoints (`host:port`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdererAddresses {
    pub addresses: Vec<String>,
}

impl ConfigValue for OrdererAddresses {
    const KEY: &'static str = ORDERER_ADDRESSES_KEY;
}

/// Block cutting limits of the ordering service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSize {
    pub max_message_count: u32,
    pub absolute_max_bytes: u32,
    pub preferred_max_bytes: u32,
}

impl BatchSize {
    pub fn validate(&self) -> Result<()> {
        if self.max_message_count == 0 {
            return Err(invalid(BATCH_SIZE_KEY, "max_message_count must be positive"));
        }
        if self.absolute_max_bytes == 0 {
            return Err(invalid(BATCH_SIZE_KEY, "absolute_max_bytes must be positive"));
        }
        if self.preferred_max_bytes > self.absolute_max_bytes {
            return Err(invalid(
                BATCH_SIZE_KEY,
                format!(
                    "preferred_max_bytes ({}) exceeds absolute_max_bytes ({})",
                    self.preferred_max_bytes, self.absolute_max_bytes
                ),
            ));
        }
        Ok(())
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self {
            max_message_count: 500,
            absolute_max_bytes: 10 * 1024 * 1024,
            preferred_max_bytes: 2 * 1024 * 1024,
        }
    }
}

impl ConfigValue for BatchSize {
    const KEY: &'static str = BATCH_SIZE_KEY;
}

/// How long the orderer waits before cutting a batch, e.g. `"2s"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTimeout {
    pub timeout: String,
}

impl BatchTimeout {
    /// Rounds `timeout` down to whole milliseconds.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout: format_duration(timeout),
        }
    }

    /// Like [`BatchTimeout::new`] but rejects a `timeout` that is zero or not
    /// a whole number of milliseconds.
    pub fn exact(timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(invalid(BATCH_TIMEOUT_KEY, "duration must be positive"));
        }
        if timeout.subsec_nanos() % 1_000_000 != 0 {
            return Err(invalid(
                BATCH_TIMEOUT_KEY,
                format!("duration {timeout:?} is not a whole number of milliseconds"),
            ));
        }
        Ok(Self::new(timeout))
    }

    /// Interpret the stored timeout. A malformed string is a decode failure,
    /// the same as a malformed payload.
    pub fn duration(&self) -> Result<Duration> {
        parse_duration(&self.timeout).map_err(|e| match e {
            ConfigError::InvalidValue { key, reason } => ConfigError::Decode { key, reason },
            other => other,
        })
    }
}

impl Default for BatchTimeout {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

impl ConfigValue for BatchTimeout {
    const KEY: &'static str = BATCH_TIMEOUT_KEY;
}

/// Operating state of the consensus implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsensusState {
    #[default]
    Normal,
    Maintenance,
}

/// Consensus implementation and its opaque metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusType {
    #[serde(rename = "type")]
    pub kind: String,
    pub metadata: Bytes,
    pub state: ConsensusState,
}

impl ConsensusType {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            metadata: Bytes::new(),
            state: ConsensusState::Normal,
        }
    }
}

impl ConfigValue for ConsensusType {
    const KEY: &'static str = CONSENSUS_TYPE_KEY;
}

/// Resource name to policy reference, e.g. `peer/Propose` to
/// `/Channel/Application/Writers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acls {
    pub acls: BTreeMap<String, String>,
}

impl ConfigValue for Acls {
    const KEY: &'static str = ACLS_KEY;
}

/// A network endpoint of a peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = |reason: &'static str| ConfigError::InvalidEndpoint {
            endpoint: s.to_string(),
            reason,
        };
        let (host, port) = s.rsplit_once(':').ok_or_else(|| bad("missing port"))?;
        if host.is_empty() {
            return Err(bad("missing host"));
        }
        let port = port.parse().map_err(|_| bad("invalid port"))?;
        Ok(Self::new(host, port))
    }
}

/// Gossip anchor peers of an application organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorPeers {
    pub anchor_peers: Vec<Endpoint>,
}

impl ConfigValue for AnchorPeers {
    const KEY: &'static str = ANCHOR_PEERS_KEY;
}

/// Ordering endpoints of an orderer organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub addresses: Vec<String>,
}

impl ConfigValue for Endpoints {
    const KEY: &'static str = ENDPOINTS_KEY;
}

/// Membership service provider of an organization.
///
/// The definition (root certificates, admins, ...) is opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Msp {
    pub msp_id: String,
    pub definition: Bytes,
}

impl Msp {
    pub fn new(msp_id: impl Into<String>) -> Self {
        Self {
            msp_id: msp_id.into(),
            definition: Bytes::new(),
        }
    }
}

impl ConfigValue for Msp {
    const KEY: &'static str = MSP_KEY;
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        reason: reason.into(),
    }
}

/// Format a duration the way batch timeouts are written, e.g. `2s`, `500ms`.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{}ms", millis)
    }
}

/// Parse `<integer><unit>` with unit `ms`, `s`, `m` or `h`.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| invalid(BATCH_TIMEOUT_KEY, format!("duration {s:?} has no unit")))?;
    let (amount, unit) = s.split_at(split);
    let amount: u64 = amount
        .parse()
        .map_err(|_| invalid(BATCH_TIMEOUT_KEY, format!("duration {s:?} has no amount")))?;
    let seconds = |factor: u64| {
        amount
            .checked_mul(factor)
            .map(Duration::from_secs)
            .ok_or_else(|| invalid(BATCH_TIMEOUT_KEY, format!("duration {s:?} overflows")))
    };
    let duration = match unit {
        "ms" => Duration::from_millis(amount),
        "s" => Duration::from_secs(amount),
        "m" => seconds(60)?,
        "h" => seconds(3600)?,
        _ => {
            return Err(invalid(
                BATCH_TIMEOUT_KEY,
                format!("duration {s:?} has unknown unit {unit:?}"),
            ))
        }
    };
    if duration.is_zero() {
        return Err(invalid(BATCH_TIMEOUT_KEY, "duration must be positive"));
    }
    Ok(duration)
}
