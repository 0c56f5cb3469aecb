//! Reference applier for configuration updates.
//!
//! The applier checks that an update fits the configuration it is applied to
//! and produces the next configuration. It works on a copy: on any error the
//! base is left untouched and nothing of the update is applied.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use configtx_core::{Config, ConfigPath, Element, ElementKind, Group};

use crate::delta::{Change, ConfigUpdate, GroupChange, GroupDelta};
use crate::error::{Result, UpdateError};

/// Apply `update` to `base`, returning the next configuration.
///
/// The resulting sequence number is `base.sequence + 1`.
pub fn apply_update(base: &Config, update: &ConfigUpdate) -> Result<Config> {
    let actual = base.fingerprint();
    if actual != update.base_fingerprint {
        warn!(
            expected = %update.base_fingerprint,
            actual = %actual,
            "rejecting config update computed against a different base"
        );
        return Err(UpdateError::StaleBase {
            expected: update.base_fingerprint,
            actual,
        });
    }

    let mut next = base.clone();
    if let Err(e) = apply_group(&mut next.channel_group, &update.channel_group, &ConfigPath::root()) {
        warn!(error = %e, "rejecting config update");
        return Err(e);
    }
    next.sequence = base.sequence + 1;

    debug!(sequence = next.sequence, "applied config update");
    Ok(next)
}

fn apply_group(group: &mut Group, delta: &GroupDelta, path: &ConfigPath) -> Result<()> {
    match &delta.mod_policy {
        Some(mod_policy) => {
            expect_version(path, group.version + 1, delta.version)?;
            group.mod_policy = mod_policy.clone();
            group.version = delta.version;
        }
        // An unchanged container must still match the version it was read at.
        None => expect_version(path, group.version, delta.version)?,
    }

    apply_elements(&mut group.values, &delta.values, path, ElementKind::Value)?;
    apply_elements(&mut group.policies, &delta.policies, path, ElementKind::Policy)?;

    for (name, change) in &delta.groups {
        let child_path = path.child(name);
        match change {
            GroupChange::Added(child) => {
                if group.groups.contains_key(name) {
                    return Err(UpdateError::AlreadyExists(child_path));
                }
                group.groups.insert(name.clone(), child.clone());
            }
            GroupChange::Updated(child_delta) => {
                let child = group
                    .groups
                    .get_mut(name)
                    .ok_or_else(|| UpdateError::Missing(child_path.clone()))?;
                apply_group(child, child_delta, &child_path)?;
            }
            GroupChange::Removed { version } => {
                let child = group
                    .groups
                    .get(name)
                    .ok_or_else(|| UpdateError::Missing(child_path.clone()))?;
                expect_version(&child_path, child.version, *version)?;
                group.groups.remove(name);
            }
        }
    }
    Ok(())
}

fn apply_elements<T>(
    elements: &mut BTreeMap<String, T>,
    changes: &BTreeMap<String, Change<T>>,
    path: &ConfigPath,
    kind: ElementKind,
) -> Result<()>
where
    T: Element + Clone,
{
    for (name, change) in changes {
        let element_path = path.join(kind, name);
        match change {
            Change::Added(element) => {
                if elements.contains_key(name) {
                    return Err(UpdateError::AlreadyExists(element_path));
                }
                elements.insert(name.clone(), element.clone());
            }
            Change::Modified(element) => {
                let current = elements
                    .get(name)
                    .ok_or_else(|| UpdateError::Missing(element_path.clone()))?;
                expect_version(&element_path, current.version() + 1, element.version())?;
                elements.insert(name.clone(), element.clone());
            }
            Change::Removed { version } => {
                let current = elements
                    .get(name)
                    .ok_or_else(|| UpdateError::Missing(element_path.clone()))?;
                expect_version(&element_path, current.version(), *version)?;
                elements.remove(name);
            }
        }
    }
    Ok(())
}

fn expect_version(path: &ConfigPath, expected: u64, found: u64) -> Result<()> {
    if expected != found {
        return Err(UpdateError::VersionMismatch {
            path: path.clone(),
            expected,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::compute_update;
    use configtx_core::{Policy, PolicyRule, Value};

    fn base() -> Config {
        Config::new(
            Group::new("Admins")
                .with_value("HashingAlgorithm", Value::new(b"SHA256".to_vec(), "Admins"))
                .with_policy(
                    "Admins",
                    Policy::new(PolicyRule::signature("OR('Org1.admin')"), "Admins"),
                )
                .with_group(
                    "Application",
                    Group::new("Admins")
                        .with_version(3)
                        .with_group("Org1", Group::new("Admins")),
                ),
        )
    }

    #[test]
    fn test_apply_roundtrip() {
        let base = base();
        let mut updated = base.clone();
        updated.channel_group.values.remove("HashingAlgorithm");
        updated.channel_group.policies.get_mut("Admins").unwrap().mod_policy = "Writers".into();
        let application = updated.channel_group.groups.get_mut("Application").unwrap();
        application.mod_policy = "MAJORITY Admins".into();
        application.groups.remove("Org1");
        application
            .groups
            .insert("Org2".into(), Group::new("Admins").with_value("MSP", Value::default()));

        let update = compute_update(&base, &updated);
        let next = apply_update(&base, &update).unwrap();

        assert_eq!(next.sequence, 1);
        assert!(next.channel_group.values.is_empty());
        assert_eq!(next.channel_group.policies["Admins"].version, 1);
        assert_eq!(next.channel_group.policies["Admins"].mod_policy, "Writers");

        let application = &next.channel_group.groups["Application"];
        assert_eq!(application.version, 4);
        assert_eq!(application.mod_policy, "MAJORITY Admins");
        assert!(!application.groups.contains_key("Org1"));
        assert_eq!(application.groups["Org2"].version, 1);
        assert_eq!(application.groups["Org2"].values["MSP"].version, 1);

        // Nothing left to apply.
        assert!(compute_update(&next, &next).is_empty());
    }

    #[test]
    fn test_apply_rejects_stale_base() {
        let base = base();
        let mut updated = base.clone();
        updated.channel_group.mod_policy = "Writers".into();
        let update = compute_update(&base, &updated);

        let other = base.clone().with_sequence(7);
        assert!(matches!(
            apply_update(&other, &update),
            Err(UpdateError::StaleBase { .. })
        ));
    }

    #[test]
    fn test_apply_checks_versions() {
        let base = base();
        let mut updated = base.clone();
        updated.channel_group.values.get_mut("HashingAlgorithm").unwrap().payload =
            b"SHA3_256".to_vec().into();
        let mut update = compute_update(&base, &updated);

        let Change::Modified(value) = update.channel_group.values.get_mut("HashingAlgorithm").unwrap()
        else {
            panic!("expected a modification");
        };
        value.version = 5;

        let err = apply_update(&base, &update).unwrap_err();
        assert_eq!(
            err,
            UpdateError::VersionMismatch {
                path: ConfigPath::root().value("HashingAlgorithm"),
                expected: 1,
                found: 5,
            }
        );
    }

    #[test]
    fn test_apply_rejects_duplicate_add_and_missing_removal() {
        let base = base();

        let mut delta = GroupDelta::unchanged(0);
        delta
            .groups
            .insert("Application".into(), GroupChange::Added(Group::new("Admins")));
        let update = ConfigUpdate {
            channel_id: None,
            base_fingerprint: base.fingerprint(),
            channel_group: delta,
        };
        assert_eq!(
            apply_update(&base, &update),
            Err(UpdateError::AlreadyExists(ConfigPath::group(["Application"])))
        );

        let mut delta = GroupDelta::unchanged(0);
        delta
            .policies
            .insert("Writers".into(), Change::Removed { version: 0 });
        let update = ConfigUpdate {
            channel_id: None,
            base_fingerprint: base.fingerprint(),
            channel_group: delta,
        };
        assert_eq!(
            apply_update(&base, &update),
            Err(UpdateError::Missing(ConfigPath::root().policy("Writers")))
        );
    }
}
