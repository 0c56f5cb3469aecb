//! Capability flags per section.

use tracing::debug;

use configtx_core::schema::CAPABILITIES_KEY;
use configtx_core::{get_capabilities, Capabilities, CapabilityMap, ConfigError, Section};

use crate::error::Result;
use crate::tx::ConfigTx;

impl ConfigTx {
    /// Capability flags declared at `section`, `None` when none are declared.
    pub fn capabilities(&self, section: Section) -> Result<Option<CapabilityMap>> {
        Ok(get_capabilities(section, self.updated())?)
    }

    /// Replace the capability set of `section`. `false` entries are dropped.
    pub fn set_capabilities(&mut self, section: Section, capabilities: &CapabilityMap) -> Result<()> {
        let path = self.section_path(section)?;
        self.write_typed(&path, &Capabilities::from_map(capabilities))
    }

    /// Enable one capability flag.
    pub fn add_capability(&mut self, section: Section, name: &str) -> Result<()> {
        let path = self.section_path(section)?;
        let mut current = self
            .read_typed::<Capabilities>(&path)?
            .unwrap_or_default();
        if !current.capabilities.insert(name.to_string()) {
            return Err(ConfigError::EntryExists {
                path: path.value(CAPABILITIES_KEY),
                key: CAPABILITIES_KEY,
                entry: name.to_string(),
            }
            .into());
        }
        debug!(%section, capability = name, "enabling capability");
        self.write_typed(&path, &current)
    }

    /// Disable one capability flag. The (possibly empty) set stays declared.
    pub fn remove_capability(&mut self, section: Section, name: &str) -> Result<()> {
        let path = self.section_path(section)?;
        let mut current = self
            .read_typed::<Capabilities>(&path)?
            .unwrap_or_default();
        if !current.capabilities.remove(name) {
            return Err(ConfigError::EntryMissing {
                path: path.value(CAPABILITIES_KEY),
                key: CAPABILITIES_KEY,
                entry: name.to_string(),
            }
            .into());
        }
        debug!(%section, capability = name, "disabling capability");
        self.write_typed(&path, &current)
    }

    /// Drop the capabilities value of `section` altogether.
    pub fn remove_capabilities(&mut self, section: Section) -> Result<()> {
        let path = self.section_path(section)?;
        self.delete_value(&path, CAPABILITIES_KEY)?;
        Ok(())
    }

    pub fn channel_capabilities(&self) -> Result<Option<CapabilityMap>> {
        self.capabilities(Section::Channel)
    }

    pub fn orderer_capabilities(&self) -> Result<Option<CapabilityMap>> {
        self.capabilities(Section::Orderer)
    }

    pub fn application_capabilities(&self) -> Result<Option<CapabilityMap>> {
        self.capabilities(Section::Application)
    }

    pub fn add_channel_capability(&mut self, name: &str) -> Result<()> {
        self.add_capability(Section::Channel, name)
    }

    pub fn add_orderer_capability(&mut self, name: &str) -> Result<()> {
        self.add_capability(Section::Orderer, name)
    }

    pub fn add_application_capability(&mut self, name: &str) -> Result<()> {
        self.add_capability(Section::Application, name)
    }

    pub fn remove_channel_capability(&mut self, name: &str) -> Result<()> {
        self.remove_capability(Section::Channel, name)
    }

    pub fn remove_orderer_capability(&mut self, name: &str) -> Result<()> {
        self.remove_capability(Section::Orderer, name)
    }

    pub fn remove_application_capability(&mut self, name: &str) -> Result<()> {
        self.remove_capability(Section::Application, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TxError;
    use configtx_core::{Config, ConfigPath, Group};

    fn config() -> Config {
        Config::new(Group::new("Admins").with_group("Orderer", Group::new("Admins")))
    }

    #[test]
    fn test_add_and_remove_capability() {
        let mut tx = ConfigTx::new(config());
        assert_eq!(tx.orderer_capabilities().unwrap(), None);

        tx.add_orderer_capability("V1_4_2").unwrap();
        tx.add_orderer_capability("V2_0").unwrap();
        assert_eq!(
            tx.orderer_capabilities().unwrap(),
            Some(CapabilityMap::from([
                ("V1_4_2".to_string(), true),
                ("V2_0".to_string(), true),
            ]))
        );

        tx.remove_orderer_capability("V1_4_2").unwrap();
        tx.remove_orderer_capability("V2_0").unwrap();
        assert_eq!(tx.orderer_capabilities().unwrap(), Some(CapabilityMap::new()));
    }

    #[test]
    fn test_duplicate_and_missing_flags() {
        let mut tx = ConfigTx::new(config());
        tx.add_channel_capability("V2_0").unwrap();

        let err = tx.add_channel_capability("V2_0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Capabilities entry V2_0 already exists at /Channel/Values/Capabilities"
        );
        assert!(matches!(
            tx.remove_channel_capability("V1_3"),
            Err(TxError::Config(ConfigError::EntryMissing { .. }))
        ));
    }

    #[test]
    fn test_missing_section_is_structural() {
        let mut tx = ConfigTx::new(config());
        let err = tx.add_application_capability("V2_0").unwrap_err();
        assert_eq!(err.to_string(), "application missing from config");
        assert_eq!(tx.updated(), tx.original());
    }

    #[test]
    fn test_set_and_remove_capabilities() {
        let mut tx = ConfigTx::new(config());
        let flags = CapabilityMap::from([("V1_3".to_string(), true), ("V1_1".to_string(), false)]);
        tx.set_capabilities(Section::Channel, &flags).unwrap();
        assert_eq!(
            tx.channel_capabilities().unwrap(),
            Some(CapabilityMap::from([("V1_3".to_string(), true)]))
        );

        tx.remove_capabilities(Section::Channel).unwrap();
        assert_eq!(tx.channel_capabilities().unwrap(), None);
        assert_eq!(
            tx.remove_capabilities(Section::Channel),
            Err(TxError::Config(ConfigError::NotFound(
                ConfigPath::root().value(CAPABILITIES_KEY)
            )))
        );
    }
}
