//! Strong type definitions for configuration fingerprints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte configuration fingerprint, computed as
/// Blake3(canonical_config_bytes(config)).
///
/// Two configurations with identical content, versions and sequence have the
/// same fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub [u8; 32]);

impl ConfigHash {
    /// Compute the Blake3 hash of the given data.
    pub fn hash(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }

    /// The zero hash (sentinel value).
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for ConfigHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_hash_hex_roundtrip() {
        let hash = ConfigHash::hash(b"channel");
        assert_eq!(ConfigHash::from_hex(&hash.to_hex()).unwrap(), hash);
        assert!(ConfigHash::from_hex("abcd").is_err());
    }

    #[test]
    fn test_config_hash_display() {
        let hash = ConfigHash::from_bytes([0xab; 32]);
        assert_eq!(hash.to_string(), "abababababababab");
        assert!(format!("{:?}", hash).starts_with("ConfigHash("));
    }
}
