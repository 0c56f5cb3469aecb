//! Structural checks on configuration keys.

use crate::error::{ConfigError, Result};
use crate::tree::{Config, Group};

/// Maximum length of a group, value or policy name.
pub const MAX_KEY_LENGTH: usize = 249;

/// Validate a single element name.
///
/// Names are 1 to 249 characters of `[A-Za-z0-9._-]` and may not be `.` or
/// `..`.
pub fn validate_key(key: &str) -> Result<()> {
    let invalid = |reason| {
        Err(ConfigError::InvalidKey {
            key: key.to_string(),
            reason,
        })
    };

    if key.is_empty() {
        return invalid("key is empty");
    }
    if key.len() > MAX_KEY_LENGTH {
        return invalid("key is longer than 249 characters");
    }
    if key == "." || key == ".." {
        return invalid("key may not be '.' or '..'");
    }
    if !key
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
    {
        return invalid("key contains characters outside [A-Za-z0-9._-]");
    }
    Ok(())
}

/// Validate every name in a group subtree.
pub fn validate_group(group: &Group) -> Result<()> {
    for key in group.values.keys().chain(group.policies.keys()) {
        validate_key(key)?;
    }
    for (key, child) in &group.groups {
        validate_key(key)?;
        validate_group(child)?;
    }
    Ok(())
}

/// Validate every name in a configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_group(&config.channel_group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Value;
    use proptest::prelude::*;

    #[test]
    fn test_valid_keys() {
        for key in ["Org1MSP", "peer0.org1", "V1_3", "a-b", "x"] {
            assert!(validate_key(key).is_ok(), "{key} should be valid");
        }
        assert!(validate_key(&"a".repeat(MAX_KEY_LENGTH)).is_ok());
    }

    #[test]
    fn test_invalid_keys() {
        for key in ["", ".", "..", "Org 1", "Org/1", "Org:1"] {
            assert!(
                matches!(validate_key(key), Err(ConfigError::InvalidKey { .. })),
                "{key:?} should be rejected"
            );
        }
        assert!(validate_key(&"a".repeat(MAX_KEY_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_nested() {
        let bad = Group::new("Admins")
            .with_group("Application", Group::new("Admins").with_value("bad key", Value::default()));
        let err = validate_config(&Config::new(bad)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidKey { ref key, .. } if key == "bad key"));

        let good = Group::new("Admins").with_group("Application", Group::new("Admins"));
        assert!(validate_config(&Config::new(good)).is_ok());
    }

    proptest! {
        #[test]
        fn prop_charset_keys_are_valid(key in "[A-Za-z0-9_-][A-Za-z0-9._-]{0,40}") {
            prop_assert!(validate_key(&key).is_ok());
        }

        #[test]
        fn prop_keys_with_spaces_are_rejected(prefix in "[A-Za-z]{0,8}", suffix in "[A-Za-z]{0,8}") {
            let key = format!("{prefix} {suffix}");
            prop_assert!(validate_key(&key).is_err());
        }
    }
}
