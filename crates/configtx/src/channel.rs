//! Channel-level values.

use configtx_core::schema::ORDERER_ADDRESSES_KEY;
use configtx_core::{
    BlockDataHashingStructure, ConfigPath, Endpoint, HashingAlgorithm, OrdererAddresses,
};

use crate::error::Result;
use crate::tx::ConfigTx;

impl ConfigTx {
    /// Name of the block hashing algorithm, if declared.
    pub fn hashing_algorithm(&self) -> Result<Option<String>> {
        Ok(self
            .read_typed::<HashingAlgorithm>(&ConfigPath::root())?
            .map(|algorithm| algorithm.name))
    }

    pub fn set_hashing_algorithm(&mut self, name: &str) -> Result<()> {
        let algorithm = HashingAlgorithm {
            name: name.to_string(),
        };
        self.write_typed(&ConfigPath::root(), &algorithm)
    }

    /// Merkle width of block data hashing, if declared.
    pub fn block_data_hashing_structure(&self) -> Result<Option<u32>> {
        Ok(self
            .read_typed::<BlockDataHashingStructure>(&ConfigPath::root())?
            .map(|structure| structure.width))
    }

    /// Channel-wide orderer endpoints; empty when not declared.
    pub fn orderer_addresses(&self) -> Result<Vec<String>> {
        Ok(self
            .read_typed::<OrdererAddresses>(&ConfigPath::root())?
            .map(|addresses| addresses.addresses)
            .unwrap_or_default())
    }

    /// Replace the channel-wide orderer endpoints. Each must be `host:port`.
    pub fn set_orderer_addresses(&mut self, addresses: &[&str]) -> Result<()> {
        for address in addresses {
            address.parse::<Endpoint>()?;
        }
        let addresses = OrdererAddresses {
            addresses: addresses.iter().map(|a| a.to_string()).collect(),
        };
        self.write_typed(&ConfigPath::root(), &addresses)
    }

    /// Drop the channel-wide orderer endpoints in favor of per-organization
    /// endpoints.
    pub fn remove_orderer_addresses(&mut self) -> Result<()> {
        self.delete_value(&ConfigPath::root(), ORDERER_ADDRESSES_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TxError;
    use configtx_core::{Config, ConfigError, Group};

    fn config() -> Config {
        let channel = Group::new("Admins")
            .with_typed(&HashingAlgorithm::default(), "Admins")
            .unwrap()
            .with_typed(&BlockDataHashingStructure::default(), "Admins")
            .unwrap();
        Config::new(channel)
    }

    #[test]
    fn test_hashing_algorithm() {
        let mut tx = ConfigTx::new(config());
        assert_eq!(tx.hashing_algorithm().unwrap().as_deref(), Some("SHA256"));
        assert_eq!(tx.block_data_hashing_structure().unwrap(), Some(u32::MAX));

        tx.set_hashing_algorithm("SHA3_256").unwrap();
        assert_eq!(tx.hashing_algorithm().unwrap().as_deref(), Some("SHA3_256"));
        assert_eq!(tx.updated().channel_group.values["HashingAlgorithm"].version, 1);
    }

    #[test]
    fn test_orderer_addresses() {
        let mut tx = ConfigTx::new(config());
        assert!(tx.orderer_addresses().unwrap().is_empty());

        tx.set_orderer_addresses(&["orderer0:7050", "orderer1:7050"]).unwrap();
        assert_eq!(tx.orderer_addresses().unwrap(), vec!["orderer0:7050", "orderer1:7050"]);

        assert!(matches!(
            tx.set_orderer_addresses(&["orderer2"]),
            Err(TxError::Config(ConfigError::InvalidEndpoint { .. }))
        ));

        tx.remove_orderer_addresses().unwrap();
        assert!(tx.compute_update().unwrap().is_empty());
    }
}
