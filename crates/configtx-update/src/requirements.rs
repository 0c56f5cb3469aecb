//! Signature requirements of an update.
//!
//! Each changed element must be authorized by a policy: the element's own
//! mod_policy when it is modified or removed, the enclosing group's
//! mod_policy when it is added. Policy references are resolved to absolute
//! paths: a relative name such as `Admins` is relative to the group that owns
//! the governed element, and a reference starting with `/` is already
//! absolute.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use configtx_core::schema::CHANNEL_GROUP_KEY;
use configtx_core::{Config, ConfigPath, Group};

use crate::delta::{ChangeKind, ConfigUpdate, GroupChange, GroupDelta};
use crate::error::{Result, UpdateError};

/// The policy that must be satisfied for one change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRequirement {
    pub path: ConfigPath,
    pub kind: ChangeKind,
    /// Absolute policy reference, e.g. `/Channel/Application/Admins`.
    pub policy: String,
}

/// Resolve a mod_policy against the group that owns it.
pub fn qualify_policy(owner: &ConfigPath, mod_policy: &str) -> String {
    if mod_policy.starts_with('/') {
        return mod_policy.to_string();
    }
    let mut qualified = format!("/{}", CHANNEL_GROUP_KEY);
    for segment in owner.groups() {
        qualified.push('/');
        qualified.push_str(segment);
    }
    qualified.push('/');
    qualified.push_str(mod_policy);
    qualified
}

/// List the policy governing every change of `update` against `base`.
///
/// Fails with [`UpdateError::Unmodifiable`] when a governing mod_policy is
/// empty and [`UpdateError::Missing`] when the update references elements
/// absent from `base`.
pub fn signature_requirements(
    base: &Config,
    update: &ConfigUpdate,
) -> Result<Vec<SignatureRequirement>> {
    let mut out = Vec::new();
    collect(
        &base.channel_group,
        &update.channel_group,
        &ConfigPath::root(),
        &mut out,
    )?;
    Ok(out)
}

/// The distinct policies an update must satisfy.
pub fn required_policies(base: &Config, update: &ConfigUpdate) -> Result<BTreeSet<String>> {
    Ok(signature_requirements(base, update)?
        .into_iter()
        .map(|requirement| requirement.policy)
        .collect())
}

fn collect(
    group: &Group,
    delta: &GroupDelta,
    path: &ConfigPath,
    out: &mut Vec<SignatureRequirement>,
) -> Result<()> {
    if delta.is_modified() {
        out.push(requirement(path, path, ChangeKind::Modified, &group.mod_policy)?);
    }

    for (name, change) in &delta.values {
        let element_path = path.value(name);
        let mod_policy = match change.kind() {
            ChangeKind::Added => &group.mod_policy,
            _ => {
                &group
                    .values
                    .get(name)
                    .ok_or_else(|| UpdateError::Missing(element_path.clone()))?
                    .mod_policy
            }
        };
        out.push(requirement(&element_path, path, change.kind(), mod_policy)?);
    }

    for (name, change) in &delta.policies {
        let element_path = path.policy(name);
        let mod_policy = match change.kind() {
            ChangeKind::Added => &group.mod_policy,
            _ => {
                &group
                    .policies
                    .get(name)
                    .ok_or_else(|| UpdateError::Missing(element_path.clone()))?
                    .mod_policy
            }
        };
        out.push(requirement(&element_path, path, change.kind(), mod_policy)?);
    }

    for (name, change) in &delta.groups {
        let child_path = path.child(name);
        match change {
            GroupChange::Added(_) => {
                out.push(requirement(&child_path, path, ChangeKind::Added, &group.mod_policy)?);
            }
            GroupChange::Removed { .. } => {
                let child = group
                    .groups
                    .get(name)
                    .ok_or_else(|| UpdateError::Missing(child_path.clone()))?;
                out.push(requirement(
                    &child_path,
                    &child_path,
                    ChangeKind::Removed,
                    &child.mod_policy,
                )?);
            }
            GroupChange::Updated(child_delta) => {
                let child = group
                    .groups
                    .get(name)
                    .ok_or_else(|| UpdateError::Missing(child_path.clone()))?;
                collect(child, child_delta, &child_path, out)?;
            }
        }
    }
    Ok(())
}

fn requirement(
    path: &ConfigPath,
    owner: &ConfigPath,
    kind: ChangeKind,
    mod_policy: &str,
) -> Result<SignatureRequirement> {
    if mod_policy.is_empty() {
        return Err(UpdateError::Unmodifiable(path.clone()));
    }
    Ok(SignatureRequirement {
        path: path.clone(),
        kind,
        policy: qualify_policy(owner, mod_policy),
    })
}
