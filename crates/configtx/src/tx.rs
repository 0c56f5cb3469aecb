//! The configuration transaction.
//!
//! A [`ConfigTx`] owns an immutable base configuration and a working copy.
//! Reads and writes go to the working copy; [`ConfigTx::compute_update`]
//! diffs the two. Every write stamps the touched element's version relative
//! to the base, see [`crate::stamp`].

use bytes::Bytes;
use tracing::debug;

use configtx_core::schema::ADMINS_POLICY_KEY;
use configtx_core::{
    validate_group, validate_key, Config, ConfigError, ConfigPath, ConfigValue, ElementKind,
    Group, Policy, PolicyRule, Section, Value,
};
use configtx_update::{
    compute_update_with, signature_requirements, ConfigUpdate, SignatureRequirement,
    UpdateOptions,
};

use crate::error::Result;
use crate::stamp::{stamp, stamp_group};

/// Behavior switches of a [`ConfigTx`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTxOptions {
    /// Channel the computed update is addressed to.
    pub channel_id: Option<String>,
    /// Reject names outside `[A-Za-z0-9._-]{1,249}` on write.
    pub validate_keys: bool,
    /// Return an empty update instead of failing with `NoDifferences`.
    pub allow_empty_update: bool,
}

impl Default for ConfigTxOptions {
    fn default() -> Self {
        Self {
            channel_id: None,
            validate_keys: true,
            allow_empty_update: true,
        }
    }
}

/// A base configuration and the staged changes against it.
#[derive(Debug, Clone)]
pub struct ConfigTx {
    base: Config,
    updated: Config,
    options: ConfigTxOptions,
}

impl ConfigTx {
    pub fn new(base: Config) -> Self {
        Self::with_options(base, ConfigTxOptions::default())
    }

    pub fn with_options(base: Config, options: ConfigTxOptions) -> Self {
        let updated = base.clone();
        Self {
            base,
            updated,
            options,
        }
    }

    /// The configuration the transaction started from.
    pub fn original(&self) -> &Config {
        &self.base
    }

    /// The working copy with every staged change.
    pub fn updated(&self) -> &Config {
        &self.updated
    }

    pub fn options(&self) -> &ConfigTxOptions {
        &self.options
    }

    /// Consume the transaction, returning `(base, updated)`.
    pub fn into_parts(self) -> (Config, Config) {
        (self.base, self.updated)
    }

    /// Discard every staged change.
    pub fn reset(&mut self) {
        self.updated = self.base.clone();
        debug!("discarded staged config changes");
    }

    /// Diff the working copy against the base.
    pub fn compute_update(&self) -> Result<ConfigUpdate> {
        let options = UpdateOptions {
            channel_id: self.options.channel_id.clone(),
            allow_empty: self.options.allow_empty_update,
        };
        Ok(compute_update_with(&self.base, &self.updated, &options)?)
    }

    /// The policies that must sign the staged changes.
    pub fn signature_requirements(&self) -> Result<Vec<SignatureRequirement>> {
        let update = configtx_update::compute_update(&self.base, &self.updated);
        Ok(signature_requirements(&self.base, &update)?)
    }

    // Generic access by path.

    pub fn group(&self, path: &ConfigPath) -> Result<&Group> {
        Ok(self.updated.channel_group.group_at(path)?)
    }

    pub fn value(&self, path: &ConfigPath) -> Result<&Value> {
        Ok(self.updated.channel_group.value_at(path)?)
    }

    pub fn policy(&self, path: &ConfigPath) -> Result<&Policy> {
        Ok(self.updated.channel_group.policy_at(path)?)
    }

    /// Write a raw value payload. The containing group must exist.
    pub fn set_value(
        &mut self,
        path: &ConfigPath,
        payload: impl Into<Bytes>,
        mod_policy: &str,
    ) -> Result<()> {
        let name = leaf_name(path, ElementKind::Value)?;
        self.write_value(&path.group_path(), name, Value::new(payload, mod_policy))
    }

    pub fn remove_value(&mut self, path: &ConfigPath) -> Result<Value> {
        let name = leaf_name(path, ElementKind::Value)?;
        self.delete_value(&path.group_path(), name)
    }

    /// Write a policy. The containing group must exist.
    pub fn set_policy(&mut self, path: &ConfigPath, rule: PolicyRule, mod_policy: &str) -> Result<()> {
        let name = leaf_name(path, ElementKind::Policy)?;
        self.write_policy(&path.group_path(), name, Policy::new(rule, mod_policy))
    }

    pub fn remove_policy(&mut self, path: &ConfigPath) -> Result<Policy> {
        let name = leaf_name(path, ElementKind::Policy)?;
        self.delete_policy(&path.group_path(), name)
    }

    /// Change the mod_policy of an existing group.
    pub fn set_group_mod_policy(&mut self, path: &ConfigPath, mod_policy: &str) -> Result<()> {
        let base = self.base.channel_group.group_at(path).ok();
        let group = self.updated.channel_group.group_at_mut(path)?;
        group.mod_policy = mod_policy.to_string();
        stamp(base, group);
        debug!(path = %path, version = group.version, "set group mod_policy");
        Ok(())
    }

    /// Insert a new sub-group at `path`. The parent must exist.
    pub fn add_group(&mut self, path: &ConfigPath, group: Group) -> Result<()> {
        let (parent, name) = split_group_path(path)?;
        self.insert_group(&parent, name, group)
    }

    pub fn remove_group(&mut self, path: &ConfigPath) -> Result<Group> {
        let (parent, name) = split_group_path(path)?;
        self.delete_group(&parent, name)
    }

    // Helpers shared by the section modules.

    /// The path of `section`, failing when the section is absent.
    pub(crate) fn section_path(&self, section: Section) -> Result<ConfigPath> {
        self.updated.section(section)?;
        Ok(section.path())
    }

    pub(crate) fn section_group(&self, section: Section) -> Result<&Group> {
        Ok(self.updated.section(section)?)
    }

    pub(crate) fn read_typed<T: ConfigValue>(&self, group_path: &ConfigPath) -> Result<Option<T>> {
        Ok(self.updated.channel_group.group_at(group_path)?.typed::<T>()?)
    }

    /// Write a typed value, keeping the mod_policy of the value it replaces.
    pub(crate) fn write_typed<T: ConfigValue>(&mut self, group_path: &ConfigPath, value: &T) -> Result<()> {
        let mod_policy = self
            .updated
            .channel_group
            .group_at(group_path)?
            .value(T::KEY)
            .map_or(ADMINS_POLICY_KEY, |existing| existing.mod_policy.as_str())
            .to_string();
        self.write_value(group_path, T::KEY, Value::typed(value, mod_policy)?)
    }

    pub(crate) fn write_value(&mut self, group_path: &ConfigPath, name: &str, mut value: Value) -> Result<()> {
        self.check_key(name)?;
        let base = self
            .base
            .channel_group
            .group_at(group_path)
            .ok()
            .and_then(|group| group.values.get(name));
        let group = self.updated.channel_group.group_at_mut(group_path)?;
        stamp(base, &mut value);
        let version = value.version;
        group.values.insert(name.to_string(), value);
        debug!(path = %group_path.value(name), version, "set config value");
        Ok(())
    }

    pub(crate) fn delete_value(&mut self, group_path: &ConfigPath, name: &str) -> Result<Value> {
        let group = self.updated.channel_group.group_at_mut(group_path)?;
        let removed = group
            .values
            .remove(name)
            .ok_or_else(|| ConfigError::NotFound(group_path.value(name)))?;
        debug!(path = %group_path.value(name), "removed config value");
        Ok(removed)
    }

    /// Write a policy rule, keeping the mod_policy of the policy it replaces.
    pub(crate) fn write_rule(&mut self, group_path: &ConfigPath, name: &str, rule: PolicyRule) -> Result<()> {
        let mod_policy = self
            .updated
            .channel_group
            .group_at(group_path)?
            .policy(name)
            .map_or(ADMINS_POLICY_KEY, |existing| existing.mod_policy.as_str())
            .to_string();
        self.write_policy(group_path, name, Policy::new(rule, mod_policy))
    }

    pub(crate) fn write_policy(&mut self, group_path: &ConfigPath, name: &str, mut policy: Policy) -> Result<()> {
        self.check_key(name)?;
        let base = self
            .base
            .channel_group
            .group_at(group_path)
            .ok()
            .and_then(|group| group.policies.get(name));
        let group = self.updated.channel_group.group_at_mut(group_path)?;
        stamp(base, &mut policy);
        let version = policy.version;
        group.policies.insert(name.to_string(), policy);
        debug!(path = %group_path.policy(name), version, "set config policy");
        Ok(())
    }

    pub(crate) fn delete_policy(&mut self, group_path: &ConfigPath, name: &str) -> Result<Policy> {
        let group = self.updated.channel_group.group_at_mut(group_path)?;
        let removed = group
            .policies
            .remove(name)
            .ok_or_else(|| ConfigError::NotFound(group_path.policy(name)))?;
        debug!(path = %group_path.policy(name), "removed config policy");
        Ok(removed)
    }

    pub(crate) fn insert_group(&mut self, parent: &ConfigPath, name: &str, mut group: Group) -> Result<()> {
        self.check_key(name)?;
        if self.options.validate_keys {
            validate_group(&group)?;
        }
        let path = parent.child(name);
        let base = self.base.channel_group.group_at(&path).ok();
        let parent_group = self.updated.channel_group.group_at_mut(parent)?;
        if parent_group.groups.contains_key(name) {
            return Err(ConfigError::AlreadyExists(path).into());
        }
        stamp_group(base, &mut group);
        let version = group.version;
        parent_group.groups.insert(name.to_string(), group);
        debug!(path = %path, version, "added config group");
        Ok(())
    }

    pub(crate) fn delete_group(&mut self, parent: &ConfigPath, name: &str) -> Result<Group> {
        let path = parent.child(name);
        let parent_group = self.updated.channel_group.group_at_mut(parent)?;
        let removed = parent_group
            .groups
            .remove(name)
            .ok_or_else(|| ConfigError::NotFound(path.clone()))?;
        debug!(path = %path, "removed config group");
        Ok(removed)
    }

    fn check_key(&self, name: &str) -> Result<()> {
        if self.options.validate_keys {
            validate_key(name)?;
        }
        Ok(())
    }
}

fn leaf_name(path: &ConfigPath, expected: ElementKind) -> Result<&str> {
    match path.leaf() {
        Some((kind, name)) if kind == expected => Ok(name),
        _ => Err(ConfigError::WrongType {
            path: path.clone(),
            expected,
            found: path.kind(),
        }
        .into()),
    }
}

fn split_group_path(path: &ConfigPath) -> Result<(ConfigPath, &str)> {
    match (path.kind(), path.parent(), path.name()) {
        (ElementKind::Group, Some(parent), Some(name)) => Ok((parent, name)),
        _ => Err(ConfigError::WrongType {
            path: path.clone(),
            expected: ElementKind::Group,
            found: path.kind(),
        }
        .into()),
    }
}
