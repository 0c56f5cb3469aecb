//! The configuration update: a minimal delta between two trees.
//!
//! Only changed elements appear. Unchanged groups are present only as
//! containers on the way to a changed descendant, carrying their base version
//! and no mod_policy. Removals are explicit entries so an applier can tell a
//! deletion apart from an omission.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use configtx_core::{ConfigHash, ConfigPath, Element, ElementKind, Group, Policy, Value};

/// What happened to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Removed => "removed",
        })
    }
}

/// Change to a value or policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Change<T> {
    /// New element, version 1.
    Added(T),
    /// New content, version is the base version plus one.
    Modified(T),
    /// The element at `version` is deleted.
    Removed { version: u64 },
}

impl<T: Element> Change<T> {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::Added(_) => ChangeKind::Added,
            Change::Modified(_) => ChangeKind::Modified,
            Change::Removed { .. } => ChangeKind::Removed,
        }
    }

    /// New version for added and modified elements, the removed version
    /// otherwise.
    pub fn version(&self) -> u64 {
        match self {
            Change::Added(element) | Change::Modified(element) => element.version(),
            Change::Removed { version } => *version,
        }
    }

    /// The new element, if it was not removed.
    pub fn element(&self) -> Option<&T> {
        match self {
            Change::Added(element) | Change::Modified(element) => Some(element),
            Change::Removed { .. } => None,
        }
    }
}

/// Change to a sub-group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupChange {
    /// New group; the whole subtree is carried with version 1 throughout.
    Added(Group),
    /// Existing group whose own fields or descendants changed.
    Updated(GroupDelta),
    /// The group at `version` and its whole subtree are deleted.
    Removed { version: u64 },
}

/// Delta of one group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDelta {
    /// Version after the update. Equals the base version unless the group's
    /// own fields changed.
    pub version: u64,
    /// New mod_policy, present only when the group itself changed.
    pub mod_policy: Option<String>,
    pub groups: BTreeMap<String, GroupChange>,
    pub values: BTreeMap<String, Change<Value>>,
    pub policies: BTreeMap<String, Change<Policy>>,
}

impl GroupDelta {
    /// A container delta for a group at `version`.
    pub fn unchanged(version: u64) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Whether the group's own fields changed.
    pub fn is_modified(&self) -> bool {
        self.mod_policy.is_some()
    }

    /// True when neither the group nor any descendant changed.
    pub fn is_empty(&self) -> bool {
        !self.is_modified()
            && self.groups.is_empty()
            && self.values.is_empty()
            && self.policies.is_empty()
    }

    fn collect_changes(&self, path: &ConfigPath, out: &mut Vec<ChangeRecord>) {
        if self.is_modified() {
            out.push(ChangeRecord::new(path.clone(), ChangeKind::Modified, self.version));
        }
        for (name, change) in &self.values {
            out.push(ChangeRecord::new(path.value(name), change.kind(), change.version()));
        }
        for (name, change) in &self.policies {
            out.push(ChangeRecord::new(path.policy(name), change.kind(), change.version()));
        }
        for (name, change) in &self.groups {
            let child = path.child(name);
            match change {
                GroupChange::Added(group) => {
                    out.push(ChangeRecord::new(child, ChangeKind::Added, group.version))
                }
                GroupChange::Removed { version } => {
                    out.push(ChangeRecord::new(child, ChangeKind::Removed, *version))
                }
                GroupChange::Updated(delta) => delta.collect_changes(&child, out),
            }
        }
    }
}

/// One changed element of an update, flattened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub path: ConfigPath,
    pub kind: ChangeKind,
    /// Post-update version, or the removed version for removals.
    pub version: u64,
}

impl ChangeRecord {
    fn new(path: ConfigPath, kind: ChangeKind, version: u64) -> Self {
        Self {
            path,
            kind,
            version,
        }
    }

    pub fn element_kind(&self) -> ElementKind {
        self.path.kind()
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (version {})", self.kind, self.path, self.version)
    }
}

/// A computed configuration update.
///
/// Created once per reconfiguration round and consumed once by whatever
/// signs and applies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub channel_id: Option<String>,
    /// Fingerprint of the base configuration the delta was computed against.
    pub base_fingerprint: ConfigHash,
    pub channel_group: GroupDelta,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.channel_group.is_empty()
    }

    /// Every changed element, depth first, values before policies before
    /// sub-groups.
    pub fn changes(&self) -> Vec<ChangeRecord> {
        let mut out = Vec::new();
        self.channel_group
            .collect_changes(&ConfigPath::root(), &mut out);
        out
    }

    pub fn change_count(&self) -> usize {
        self.changes().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_delta() {
        let update = ConfigUpdate {
            channel_id: None,
            base_fingerprint: ConfigHash::ZERO,
            channel_group: GroupDelta::unchanged(4),
        };
        assert!(update.is_empty());
        assert_eq!(update.change_count(), 0);
    }

    #[test]
    fn test_changes_are_flattened() {
        let mut org = GroupDelta::unchanged(1);
        org.values.insert("AnchorPeers".into(), Change::Removed { version: 2 });

        let mut application = GroupDelta::unchanged(0);
        application.mod_policy = Some("Admins".into());
        application.version = 1;
        application
            .groups
            .insert("Org1MSP".into(), GroupChange::Updated(org));
        application
            .groups
            .insert("Org2MSP".into(), GroupChange::Added(Group::new("Admins").with_version(1)));

        let mut root = GroupDelta::unchanged(0);
        root.groups
            .insert("Application".into(), GroupChange::Updated(application));

        let update = ConfigUpdate {
            channel_id: Some("mychannel".into()),
            base_fingerprint: ConfigHash::ZERO,
            channel_group: root,
        };

        let changes = update.changes();
        let rendered: Vec<String> = changes.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "modified /Channel/Application (version 1)",
                "removed /Channel/Application/Org1MSP/Values/AnchorPeers (version 2)",
                "added /Channel/Application/Org2MSP (version 1)",
            ]
        );
        assert_eq!(changes[1].element_kind(), ElementKind::Value);
        assert!(!update.is_empty());
    }
}
