//! Version stamping of staged elements.
//!
//! A staged element's version is derived from its base counterpart, never
//! incremented in place, so repeated writes to the same element bump it once
//! and restoring base content restores the base version.

use configtx_core::{Element, Group};
use configtx_update::ADDED_VERSION;

/// Set `element`'s version relative to its base counterpart.
pub(crate) fn stamp<E: Element>(base: Option<&E>, element: &mut E) {
    let version = match base {
        Some(base) if base.content_eq(element) => base.version(),
        Some(base) => base.version() + 1,
        None => ADDED_VERSION,
    };
    element.set_version(version);
}

/// Stamp a whole subtree against its base counterpart.
pub(crate) fn stamp_group(base: Option<&Group>, group: &mut Group) {
    stamp(base, group);
    for (name, value) in group.values.iter_mut() {
        stamp(base.and_then(|b| b.values.get(name)), value);
    }
    for (name, policy) in group.policies.iter_mut() {
        stamp(base.and_then(|b| b.policies.get(name)), policy);
    }
    for (name, child) in group.groups.iter_mut() {
        stamp_group(base.and_then(|b| b.groups.get(name)), child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configtx_core::Value;

    #[test]
    fn test_stamp_relative_to_base() {
        let mut base = Value::new(b"a".to_vec(), "Admins");
        base.version = 4;

        let mut same = Value::new(b"a".to_vec(), "Admins");
        stamp(Some(&base), &mut same);
        assert_eq!(same.version, 4);

        let mut changed = Value::new(b"b".to_vec(), "Admins");
        stamp(Some(&base), &mut changed);
        assert_eq!(changed.version, 5);

        // Stamping twice does not bump twice.
        stamp(Some(&base), &mut changed);
        assert_eq!(changed.version, 5);

        let mut added = Value::new(b"c".to_vec(), "Admins");
        stamp(None, &mut added);
        assert_eq!(added.version, ADDED_VERSION);
    }

    #[test]
    fn test_stamp_group_recurses() {
        let base = Group::new("Admins")
            .with_version(2)
            .with_value("MSP", Value::new(b"msp".to_vec(), "Admins"));
        let mut readded = Group::new("Admins")
            .with_value("MSP", Value::new(b"msp".to_vec(), "Admins"))
            .with_value("AnchorPeers", Value::new(b"peer".to_vec(), "Admins"));

        stamp_group(Some(&base), &mut readded);
        assert_eq!(readded.version, 2);
        assert_eq!(readded.values["MSP"].version, 0);
        assert_eq!(readded.values["AnchorPeers"].version, ADDED_VERSION);
    }
}
