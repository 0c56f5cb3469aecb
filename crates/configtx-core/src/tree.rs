//! The configuration tree: groups, values and policies.
//!
//! Nodes are owned by their parent and addressed by name. Cloning a
//! [`Config`] yields a fully independent tree; payloads are immutable
//! [`Bytes`], so the only shared state after a clone is read-only.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, Result};
use crate::path::{ConfigPath, ElementKind, Lookup, Node};
use crate::schema::Section;
use crate::values::ConfigValue;

/// Common surface of versioned tree elements.
///
/// `content_eq` compares an element's own content only: for a group that is
/// its mod_policy, never its children.
pub trait Element {
    fn version(&self) -> u64;
    fn set_version(&mut self, version: u64);
    fn mod_policy(&self) -> &str;
    fn content_eq(&self, other: &Self) -> bool;
}

/// A named leaf payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    pub version: u64,
    pub mod_policy: String,
    /// Opaque, application-interpreted bytes.
    pub payload: Bytes,
}

impl Value {
    pub fn new(payload: impl Into<Bytes>, mod_policy: impl Into<String>) -> Self {
        Self {
            version: 0,
            mod_policy: mod_policy.into(),
            payload: payload.into(),
        }
    }

    /// Encode a typed value.
    pub fn typed<T: ConfigValue>(value: &T, mod_policy: impl Into<String>) -> Result<Self> {
        Ok(Self::new(value.encode()?, mod_policy))
    }

    /// Decode the payload as `T`.
    pub fn decode<T: ConfigValue>(&self) -> Result<T> {
        T::decode(&self.payload)
    }
}

impl Element for Value {
    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn mod_policy(&self) -> &str {
        &self.mod_policy
    }

    fn content_eq(&self, other: &Self) -> bool {
        self.payload == other.payload && self.mod_policy == other.mod_policy
    }
}

/// Combination rule of an implicit meta policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImplicitMetaRule {
    Any,
    All,
    Majority,
}

impl ImplicitMetaRule {
    pub const fn as_str(self) -> &'static str {
        match self {
            ImplicitMetaRule::Any => "ANY",
            ImplicitMetaRule::All => "ALL",
            ImplicitMetaRule::Majority => "MAJORITY",
        }
    }
}

/// A policy expression. Never evaluated here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyRule {
    /// Aggregates the same-named sub-policy of every child group,
    /// e.g. `MAJORITY Admins`.
    ImplicitMeta {
        rule: ImplicitMetaRule,
        sub_policy: String,
    },
    /// A signature policy expression kept verbatim, e.g. `OR('Org1MSP.admin')`.
    Signature { expression: String },
}

impl PolicyRule {
    pub fn implicit_meta(rule: ImplicitMetaRule, sub_policy: impl Into<String>) -> Self {
        PolicyRule::ImplicitMeta {
            rule,
            sub_policy: sub_policy.into(),
        }
    }

    pub fn signature(expression: impl Into<String>) -> Self {
        PolicyRule::Signature {
            expression: expression.into(),
        }
    }
}

impl fmt::Display for PolicyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyRule::ImplicitMeta { rule, sub_policy } => {
                write!(f, "{} {}", rule.as_str(), sub_policy)
            }
            PolicyRule::Signature { expression } => f.write_str(expression),
        }
    }
}

impl FromStr for PolicyRule {
    type Err = ConfigError;

    /// Parses `ANY|ALL|MAJORITY <SubPolicy>` as an implicit meta rule and
    /// anything else as a signature expression.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConfigError::InvalidPolicy("empty policy rule".into()));
        }
        let mut parts = s.split_whitespace();
        let rule = match parts.next() {
            Some("ANY") => Some(ImplicitMetaRule::Any),
            Some("ALL") => Some(ImplicitMetaRule::All),
            Some("MAJORITY") => Some(ImplicitMetaRule::Majority),
            _ => None,
        };
        match rule {
            Some(rule) => match (parts.next(), parts.next()) {
                (Some(sub_policy), None) => Ok(PolicyRule::implicit_meta(rule, sub_policy)),
                _ => Err(ConfigError::InvalidPolicy(format!(
                    "implicit meta rule {s:?} must name exactly one sub-policy"
                ))),
            },
            None => Ok(PolicyRule::signature(s)),
        }
    }
}

/// A named rule reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub version: u64,
    pub mod_policy: String,
    pub rule: PolicyRule,
}

impl Policy {
    pub fn new(rule: PolicyRule, mod_policy: impl Into<String>) -> Self {
        Self {
            version: 0,
            mod_policy: mod_policy.into(),
            rule,
        }
    }
}

impl Element for Policy {
    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn mod_policy(&self) -> &str {
        &self.mod_policy
    }

    fn content_eq(&self, other: &Self) -> bool {
        self.rule == other.rule && self.mod_policy == other.mod_policy
    }
}

/// A named internal node holding sub-groups, values and policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub version: u64,
    /// Policy governing changes to this group's own content.
    pub mod_policy: String,
    pub groups: BTreeMap<String, Group>,
    pub values: BTreeMap<String, Value>,
    pub policies: BTreeMap<String, Policy>,
}

impl Group {
    pub fn new(mod_policy: impl Into<String>) -> Self {
        Self {
            mod_policy: mod_policy.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn with_group(mut self, name: impl Into<String>, group: Group) -> Self {
        self.groups.insert(name.into(), group);
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn with_policy(mut self, name: impl Into<String>, policy: Policy) -> Self {
        self.policies.insert(name.into(), policy);
        self
    }

    /// Add a typed value under its well-known key.
    pub fn with_typed<T: ConfigValue>(mut self, value: &T, mod_policy: &str) -> Result<Self> {
        self.insert_typed(value, mod_policy)?;
        Ok(self)
    }

    /// Insert or replace a typed value under its well-known key.
    pub fn insert_typed<T: ConfigValue>(&mut self, value: &T, mod_policy: &str) -> Result<()> {
        self.values
            .insert(T::KEY.to_string(), Value::typed(value, mod_policy)?);
        Ok(())
    }

    /// Decode the typed value stored under `T::KEY`, if any.
    pub fn typed<T: ConfigValue>(&self) -> Result<Option<T>> {
        self.values.get(T::KEY).map(Value::decode).transpose()
    }

    pub fn child(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.groups.get_mut(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn policy(&self, name: &str) -> Option<&Policy> {
        self.policies.get(name)
    }

    /// Kind of the element called `name` directly inside this group.
    ///
    /// Groups win over values, values over policies.
    pub fn kind_of(&self, name: &str) -> Option<ElementKind> {
        if self.groups.contains_key(name) {
            Some(ElementKind::Group)
        } else if self.values.contains_key(name) {
            Some(ElementKind::Value)
        } else if self.policies.contains_key(name) {
            Some(ElementKind::Policy)
        } else {
            None
        }
    }

    /// Resolve a path relative to this group.
    pub fn resolve(&self, path: &ConfigPath) -> Lookup<'_> {
        let mut current = self;
        for (depth, segment) in path.groups().iter().enumerate() {
            match current.groups.get(segment) {
                Some(next) => current = next,
                None => {
                    let prefix = ConfigPath::group(path.groups()[..=depth].iter().cloned());
                    return match current.kind_of(segment) {
                        Some(found) => Lookup::WrongType {
                            path: prefix,
                            expected: ElementKind::Group,
                            found,
                        },
                        None => Lookup::NotFound(prefix),
                    };
                }
            }
        }

        let Some((kind, name)) = path.leaf() else {
            return Lookup::Found(Node::Group(current));
        };
        let node = match kind {
            ElementKind::Value => current.values.get(name).map(Node::Value),
            ElementKind::Policy => current.policies.get(name).map(Node::Policy),
            ElementKind::Group => current.groups.get(name).map(Node::Group),
        };
        match (node, current.kind_of(name)) {
            (Some(node), _) => Lookup::Found(node),
            (None, Some(found)) => Lookup::WrongType {
                path: path.clone(),
                expected: kind,
                found,
            },
            (None, None) => Lookup::NotFound(path.clone()),
        }
    }

    /// The group at `path`; fails with `NotFound` on the first missing segment.
    pub fn group_at(&self, path: &ConfigPath) -> Result<&Group> {
        match self.resolve(path).into_result()? {
            Node::Group(group) => Ok(group),
            other => Err(wrong_type(path, ElementKind::Group, other.kind())),
        }
    }

    pub fn value_at(&self, path: &ConfigPath) -> Result<&Value> {
        match self.resolve(path).into_result()? {
            Node::Value(value) => Ok(value),
            other => Err(wrong_type(path, ElementKind::Value, other.kind())),
        }
    }

    pub fn policy_at(&self, path: &ConfigPath) -> Result<&Policy> {
        match self.resolve(path).into_result()? {
            Node::Policy(policy) => Ok(policy),
            other => Err(wrong_type(path, ElementKind::Policy, other.kind())),
        }
    }

    /// Mutable access to the group named by the group segments of `path`.
    pub fn group_at_mut(&mut self, path: &ConfigPath) -> Result<&mut Group> {
        let mut current = self;
        for (depth, segment) in path.groups().iter().enumerate() {
            let kind = current.kind_of(segment);
            current = match current.groups.get_mut(segment) {
                Some(next) => next,
                None => {
                    let prefix = ConfigPath::group(path.groups()[..=depth].iter().cloned());
                    return Err(match kind {
                        Some(found) => wrong_type(&prefix, ElementKind::Group, found),
                        None => ConfigError::NotFound(prefix),
                    });
                }
            };
        }
        Ok(current)
    }

    /// Mutable access to the group at `path`, creating missing segments with
    /// `mod_policy`.
    pub fn ensure_group(&mut self, path: &ConfigPath, mod_policy: &str) -> &mut Group {
        let mut current = self;
        for segment in path.groups() {
            current = current
                .groups
                .entry(segment.clone())
                .or_insert_with(|| Group::new(mod_policy));
        }
        current
    }

    /// Number of groups, values and policies in this subtree, itself included.
    pub fn element_count(&self) -> usize {
        1 + self.values.len()
            + self.policies.len()
            + self.groups.values().map(Group::element_count).sum::<usize>()
    }
}

impl Element for Group {
    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn mod_policy(&self) -> &str {
        &self.mod_policy
    }

    fn content_eq(&self, other: &Self) -> bool {
        self.mod_policy == other.mod_policy
    }
}

fn wrong_type(path: &ConfigPath, expected: ElementKind, found: ElementKind) -> ConfigError {
    ConfigError::WrongType {
        path: path.clone(),
        expected,
        found,
    }
}

/// Root wrapper around the channel group.
///
/// The channel group always exists; there is no empty `Config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Number of reconfigurations committed so far.
    pub sequence: u64,
    pub channel_group: Group,
}

impl Config {
    pub fn new(channel_group: Group) -> Self {
        Self {
            sequence: 0,
            channel_group,
        }
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn resolve(&self, path: &ConfigPath) -> Lookup<'_> {
        self.channel_group.resolve(path)
    }

    /// The group of a section.
    ///
    /// Fails with [`ConfigError::MissingSection`] when the orderer or
    /// application group is absent.
    pub fn section(&self, section: Section) -> Result<&Group> {
        match section.group_key() {
            None => Ok(&self.channel_group),
            Some(key) => self
                .channel_group
                .groups
                .get(key)
                .ok_or(ConfigError::MissingSection(section)),
        }
    }

    pub fn section_mut(&mut self, section: Section) -> Result<&mut Group> {
        match section.group_key() {
            None => Ok(&mut self.channel_group),
            Some(key) => self
                .channel_group
                .groups
                .get_mut(key)
                .ok_or(ConfigError::MissingSection(section)),
        }
    }
}
