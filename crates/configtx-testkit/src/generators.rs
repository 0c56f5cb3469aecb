//! Proptest generators for property-based testing.
//!
//! Names are drawn from a small alphabet so that two independently generated
//! trees share most of their keys and differ by a mix of added, removed and
//! modified elements.

use proptest::prelude::*;

use configtx_core::{Config, Group, ImplicitMetaRule, Policy, PolicyRule, Value};

/// Generate an element name.
pub fn key() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["Admins", "Writers", "MSP", "Org1", "Org2"]).prop_map(String::from)
}

/// Generate a non-empty mod_policy reference.
pub fn mod_policy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["Admins", "Writers", "/Channel/Orderer/Admins"]).prop_map(String::from)
}

/// Generate a value with a short payload.
pub fn value() -> impl Strategy<Value = Value> {
    (prop::collection::vec(0u8..3, 0..3), mod_policy(), 0u64..4).prop_map(
        |(payload, mod_policy, version)| {
            let mut value = Value::new(payload, mod_policy);
            value.version = version;
            value
        },
    )
}

/// Generate a policy rule.
pub fn policy_rule() -> impl Strategy<Value = PolicyRule> {
    prop_oneof![
        Just(PolicyRule::implicit_meta(ImplicitMetaRule::Any, "Readers")),
        Just(PolicyRule::implicit_meta(ImplicitMetaRule::Majority, "Admins")),
        Just(PolicyRule::signature("OR('Org1MSP.admin')")),
    ]
}

/// Generate a policy.
pub fn policy() -> impl Strategy<Value = Policy> {
    (policy_rule(), mod_policy(), 0u64..4).prop_map(|(rule, mod_policy, version)| {
        let mut policy = Policy::new(rule, mod_policy);
        policy.version = version;
        policy
    })
}

fn leaf_group() -> impl Strategy<Value = Group> {
    (
        mod_policy(),
        0u64..4,
        prop::collection::btree_map(key(), value(), 0..3),
        prop::collection::btree_map(key(), policy(), 0..3),
    )
        .prop_map(|(mod_policy, version, values, policies)| Group {
            version,
            mod_policy,
            groups: Default::default(),
            values,
            policies,
        })
}

/// Generate a group subtree up to three levels deep.
pub fn group() -> impl Strategy<Value = Group> {
    leaf_group().prop_recursive(3, 24, 3, |inner| {
        (leaf_group(), prop::collection::btree_map(key(), inner, 0..3)).prop_map(
            |(mut group, children)| {
                group.groups = children;
                group
            },
        )
    })
}

/// Generate a configuration.
pub fn config() -> impl Strategy<Value = Config> {
    (group(), 0u64..8).prop_map(|(channel_group, sequence)| Config {
        sequence,
        channel_group,
    })
}

/// Generate a base configuration and an updated one over the same names.
pub fn config_pair() -> impl Strategy<Value = (Config, Config)> {
    (config(), config())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::without_versions;
    use configtx_core::Node;
    use configtx_update::{apply_update, compute_update, ChangeKind, UpdateError};

    fn base_version(config: &Config, path: &configtx_core::ConfigPath) -> Option<u64> {
        match config.resolve(path).found()? {
            Node::Group(group) => Some(group.version),
            Node::Value(value) => Some(value.version),
            Node::Policy(policy) => Some(policy.version),
        }
    }

    proptest! {
        #[test]
        fn test_self_diff_is_empty(config in config()) {
            prop_assert!(compute_update(&config, &config.clone()).is_empty());
        }

        #[test]
        fn test_apply_reproduces_updated((base, updated) in config_pair()) {
            let update = compute_update(&base, &updated);
            let next = apply_update(&base, &update).unwrap();

            prop_assert_eq!(next.sequence, base.sequence + 1);
            prop_assert_eq!(
                without_versions(&next).channel_group,
                without_versions(&updated).channel_group
            );
            prop_assert!(compute_update(&next, &updated).is_empty());
        }

        #[test]
        fn test_change_versions((base, updated) in config_pair()) {
            for change in compute_update(&base, &updated).changes() {
                let expected = match change.kind {
                    ChangeKind::Added => Some(1),
                    ChangeKind::Modified => base_version(&base, &change.path).map(|v| v + 1),
                    ChangeKind::Removed => base_version(&base, &change.path),
                };
                prop_assert_eq!(Some(change.version), expected, "{}", change);
            }
        }

        #[test]
        fn test_update_bound_to_base((base, updated) in config_pair(), other in config()) {
            prop_assume!(base.fingerprint() != other.fingerprint());

            let update = compute_update(&base, &updated);
            let rejected = matches!(
                apply_update(&other, &update),
                Err(UpdateError::StaleBase { .. })
            );
            prop_assert!(rejected);
        }
    }
}
