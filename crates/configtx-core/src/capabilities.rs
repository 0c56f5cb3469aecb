//! Capability resolution.
//!
//! Capabilities are an opt-in feature negotiation layered on top of the
//! channel structure. A missing capabilities value is therefore a soft miss
//! (`Ok(None)`), while a missing orderer or application section is a hard
//! structural failure.

use crate::error::Result;
use crate::schema::Section;
use crate::tree::{Config, Group};
use crate::values::{Capabilities, CapabilityMap};

/// Capability flags declared at `section`.
///
/// - `Ok(None)` when the section exists but declares no capabilities.
/// - `Err(MissingSection)` when the orderer or application group is absent.
/// - `Err(Decode)` when the stored payload is malformed.
pub fn get_capabilities(section: Section, config: &Config) -> Result<Option<CapabilityMap>> {
    let group = config.section(section)?;
    capabilities_in(group)
}

/// Capability flags declared directly in `group`.
pub fn capabilities_in(group: &Group) -> Result<Option<CapabilityMap>> {
    Ok(group
        .typed::<Capabilities>()?
        .map(|capabilities| capabilities.to_map()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::schema::{ADMINS_POLICY_KEY, CAPABILITIES_KEY, ORDERER_GROUP_KEY};
    use crate::tree::Value;

    fn expected() -> CapabilityMap {
        CapabilityMap::from([("V1_3".to_string(), true)])
    }

    #[test]
    fn test_channel_capabilities_present_and_absent() {
        let mut config = Config::new(Group::new(ADMINS_POLICY_KEY));
        assert_eq!(get_capabilities(Section::Channel, &config).unwrap(), None);

        config
            .channel_group
            .insert_typed(&Capabilities::new(["V1_3"]), ADMINS_POLICY_KEY)
            .unwrap();
        assert_eq!(
            get_capabilities(Section::Channel, &config).unwrap(),
            Some(expected())
        );
    }

    #[test]
    fn test_missing_sections_are_structural() {
        let config = Config::new(Group::new(ADMINS_POLICY_KEY));

        let err = get_capabilities(Section::Orderer, &config).unwrap_err();
        assert_eq!(err.to_string(), "orderer missing from config");

        let err = get_capabilities(Section::Application, &config).unwrap_err();
        assert_eq!(err.to_string(), "application missing from config");
    }

    #[test]
    fn test_section_without_capabilities_is_none() {
        let config = Config::new(
            Group::new(ADMINS_POLICY_KEY).with_group(ORDERER_GROUP_KEY, Group::new(ADMINS_POLICY_KEY)),
        );
        assert_eq!(get_capabilities(Section::Orderer, &config).unwrap(), None);
    }

    #[test]
    fn test_empty_set_is_distinct_from_absent() {
        let group = Group::new(ADMINS_POLICY_KEY)
            .with_typed(&Capabilities::default(), ADMINS_POLICY_KEY)
            .unwrap();
        assert_eq!(capabilities_in(&group).unwrap(), Some(CapabilityMap::new()));
    }

    #[test]
    fn test_malformed_payload_is_surfaced() {
        let group = Group::new(ADMINS_POLICY_KEY).with_value(
            CAPABILITIES_KEY,
            Value::new(b"not cbor \xff".to_vec(), ADMINS_POLICY_KEY),
        );
        assert!(matches!(
            capabilities_in(&group),
            Err(ConfigError::Decode { .. })
        ));
    }
}
