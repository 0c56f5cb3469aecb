//! Canonical CBOR encoding of a configuration tree.
//!
//! This follows RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//!
//! The encoding is used to fingerprint a configuration so a computed update
//! can be bound to the exact base it was diffed against. It is not a wire
//! format.

use ciborium::value::{Integer, Value as Cbor};

use crate::tree::{Config, Group, Policy, PolicyRule, Value};
use crate::types::ConfigHash;

/// Field keys (integer keys for compact encoding).
mod keys {
    pub const VERSION: u64 = 0;
    pub const MOD_POLICY: u64 = 1;
    pub const GROUPS: u64 = 2;
    pub const VALUES: u64 = 3;
    pub const POLICIES: u64 = 4;

    pub const PAYLOAD: u64 = 2;
    pub const RULE: u64 = 2;

    pub const SEQUENCE: u64 = 0;
    pub const CHANNEL_GROUP: u64 = 1;
}

/// Rule discriminators inside an encoded policy.
mod rule_kind {
    pub const IMPLICIT_META: u64 = 1;
    pub const SIGNATURE: u64 = 2;
}

/// Encode a configuration to canonical CBOR bytes.
pub fn canonical_config_bytes(config: &Config) -> Vec<u8> {
    let value = Cbor::Map(vec![
        (int(keys::SEQUENCE), int(config.sequence)),
        (int(keys::CHANNEL_GROUP), group_to_cbor(&config.channel_group)),
    ]);
    let mut buf = Vec::new();
    encode_value_to(&mut buf, &value);
    buf
}

/// Encode a single group subtree to canonical CBOR bytes.
pub fn canonical_group_bytes(group: &Group) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, &group_to_cbor(group));
    buf
}

impl Config {
    /// Blake3 fingerprint of the canonical encoding.
    pub fn fingerprint(&self) -> ConfigHash {
        ConfigHash::hash(&canonical_config_bytes(self))
    }
}

fn int(n: u64) -> Cbor {
    Cbor::Integer(n.into())
}

fn group_to_cbor(group: &Group) -> Cbor {
    let groups = group
        .groups
        .iter()
        .map(|(name, child)| (Cbor::Text(name.clone()), group_to_cbor(child)))
        .collect();
    let values = group
        .values
        .iter()
        .map(|(name, value)| (Cbor::Text(name.clone()), value_to_cbor(value)))
        .collect();
    let policies = group
        .policies
        .iter()
        .map(|(name, policy)| (Cbor::Text(name.clone()), policy_to_cbor(policy)))
        .collect();

    Cbor::Map(vec![
        (int(keys::VERSION), int(group.version)),
        (int(keys::MOD_POLICY), Cbor::Text(group.mod_policy.clone())),
        (int(keys::GROUPS), Cbor::Map(groups)),
        (int(keys::VALUES), Cbor::Map(values)),
        (int(keys::POLICIES), Cbor::Map(policies)),
    ])
}

fn value_to_cbor(value: &Value) -> Cbor {
    Cbor::Map(vec![
        (int(keys::VERSION), int(value.version)),
        (int(keys::MOD_POLICY), Cbor::Text(value.mod_policy.clone())),
        (int(keys::PAYLOAD), Cbor::Bytes(value.payload.to_vec())),
    ])
}

fn policy_to_cbor(policy: &Policy) -> Cbor {
    let rule = match &policy.rule {
        PolicyRule::ImplicitMeta { rule, sub_policy } => Cbor::Array(vec![
            int(rule_kind::IMPLICIT_META),
            Cbor::Text(rule.as_str().to_string()),
            Cbor::Text(sub_policy.clone()),
        ]),
        PolicyRule::Signature { expression } => Cbor::Array(vec![
            int(rule_kind::SIGNATURE),
            Cbor::Text(expression.clone()),
        ]),
    };
    Cbor::Map(vec![
        (int(keys::VERSION), int(policy.version)),
        (int(keys::MOD_POLICY), Cbor::Text(policy.mod_policy.clone())),
        (int(keys::RULE), rule),
    ])
}

/// Recursively encode a CBOR value.
///
/// Only the variants built by this module are reachable.
fn encode_value_to(buf: &mut Vec<u8>, value: &Cbor) {
    match value {
        Cbor::Integer(i) => encode_integer(buf, *i),
        Cbor::Bytes(b) => {
            encode_uint(buf, 2, b.len() as u64);
            buf.extend_from_slice(b);
        }
        Cbor::Text(s) => {
            encode_uint(buf, 3, s.len() as u64);
            buf.extend_from_slice(s.as_bytes());
        }
        Cbor::Array(items) => {
            encode_uint(buf, 4, items.len() as u64);
            for item in items {
                encode_value_to(buf, item);
            }
        }
        Cbor::Map(entries) => encode_map_canonical(buf, entries),
        other => unreachable!("canonical config encoding never produces {other:?}"),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: Integer) {
    let n: i128 = i.into();
    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison, which for text keys
/// orders shorter names first.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Cbor, Cbor)]) {
    let mut pairs: Vec<(Vec<u8>, &Cbor)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_value_to(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}
