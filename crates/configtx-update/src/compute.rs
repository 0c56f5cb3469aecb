//! Delta computation between a base and an updated configuration.
//!
//! The walk compares content, never versions: an element is changed when its
//! payload, rule or mod_policy differs, and a group when its own mod_policy
//! differs. Every sub-group present on both sides is visited whether or not
//! it changed itself, since a descendant may have.

use std::collections::BTreeMap;

use tracing::debug;

use configtx_core::{Config, Element, Group};

use crate::delta::{Change, ConfigUpdate, GroupChange, GroupDelta};
use crate::error::{Result, UpdateError};

/// Version given to an element with no base counterpart.
pub const ADDED_VERSION: u64 = 1;

/// Options for [`compute_update_with`].
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Channel the update is addressed to.
    pub channel_id: Option<String>,
    /// Whether an update with no changes is returned instead of rejected.
    pub allow_empty: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            channel_id: None,
            allow_empty: true,
        }
    }
}

/// Compute the minimal update turning `base` into `updated`.
///
/// Diffing a configuration against itself yields an empty update.
pub fn compute_update(base: &Config, updated: &Config) -> ConfigUpdate {
    let channel_group = diff_group(&base.channel_group, &updated.channel_group);
    let update = ConfigUpdate {
        channel_id: None,
        base_fingerprint: base.fingerprint(),
        channel_group,
    };
    debug!(
        changes = update.change_count(),
        base = %update.base_fingerprint,
        "computed config update"
    );
    update
}

/// Compute an update with explicit options.
pub fn compute_update_with(
    base: &Config,
    updated: &Config,
    options: &UpdateOptions,
) -> Result<ConfigUpdate> {
    let mut update = compute_update(base, updated);
    if update.is_empty() && !options.allow_empty {
        return Err(UpdateError::NoDifferences);
    }
    update.channel_id = options.channel_id.clone();
    Ok(update)
}

/// Diff two versions of the same group.
pub fn diff_group(base: &Group, updated: &Group) -> GroupDelta {
    let mut delta = GroupDelta::unchanged(base.version);
    if !base.content_eq(updated) {
        delta.version = base.version + 1;
        delta.mod_policy = Some(updated.mod_policy.clone());
    }

    delta.values = diff_elements(&base.values, &updated.values);
    delta.policies = diff_elements(&base.policies, &updated.policies);

    for (name, base_child) in &base.groups {
        match updated.groups.get(name) {
            Some(updated_child) => {
                let child = diff_group(base_child, updated_child);
                if !child.is_empty() {
                    delta.groups.insert(name.clone(), GroupChange::Updated(child));
                }
            }
            None => {
                delta.groups.insert(
                    name.clone(),
                    GroupChange::Removed {
                        version: base_child.version,
                    },
                );
            }
        }
    }
    for (name, updated_child) in &updated.groups {
        if !base.groups.contains_key(name) {
            delta
                .groups
                .insert(name.clone(), GroupChange::Added(added_group(updated_child)));
        }
    }

    delta
}

fn diff_elements<T>(base: &BTreeMap<String, T>, updated: &BTreeMap<String, T>) -> BTreeMap<String, Change<T>>
where
    T: Element + Clone,
{
    let mut changes = BTreeMap::new();
    for (name, old) in base {
        match updated.get(name) {
            Some(new) if old.content_eq(new) => {}
            Some(new) => {
                let mut element = new.clone();
                element.set_version(old.version() + 1);
                changes.insert(name.clone(), Change::Modified(element));
            }
            None => {
                changes.insert(
                    name.clone(),
                    Change::Removed {
                        version: old.version(),
                    },
                );
            }
        }
    }
    for (name, new) in updated {
        if !base.contains_key(name) {
            let mut element = new.clone();
            element.set_version(ADDED_VERSION);
            changes.insert(name.clone(), Change::Added(element));
        }
    }
    changes
}

/// Copy of an added subtree with every element at [`ADDED_VERSION`].
pub fn added_group(group: &Group) -> Group {
    let mut group = group.clone();
    stamp_added(&mut group);
    group
}

fn stamp_added(group: &mut Group) {
    group.version = ADDED_VERSION;
    for value in group.values.values_mut() {
        value.version = ADDED_VERSION;
    }
    for policy in group.policies.values_mut() {
        policy.version = ADDED_VERSION;
    }
    for child in group.groups.values_mut() {
        stamp_added(child);
    }
}
