//! Orderer section values and orderer organization endpoints.

use std::time::Duration;

use tracing::debug;

use configtx_core::schema::{CONSENSUS_TYPE_KEY, ENDPOINTS_KEY};
use configtx_core::{
    BatchSize, BatchTimeout, ConfigError, ConsensusState, ConsensusType, Endpoint, Endpoints,
    Section,
};

use crate::error::Result;
use crate::tx::ConfigTx;

impl ConfigTx {
    pub fn batch_size(&self) -> Result<Option<BatchSize>> {
        let path = self.section_path(Section::Orderer)?;
        self.read_typed(&path)
    }

    pub fn set_batch_size(&mut self, batch_size: &BatchSize) -> Result<()> {
        let path = self.section_path(Section::Orderer)?;
        batch_size.validate()?;
        self.write_typed(&path, batch_size)
    }

    pub fn batch_timeout(&self) -> Result<Option<Duration>> {
        let path = self.section_path(Section::Orderer)?;
        match self.read_typed::<BatchTimeout>(&path)? {
            Some(timeout) => Ok(Some(timeout.duration()?)),
            None => Ok(None),
        }
    }

    /// Set the batch timeout. Only positive whole milliseconds are accepted.
    pub fn set_batch_timeout(&mut self, timeout: Duration) -> Result<()> {
        let path = self.section_path(Section::Orderer)?;
        let timeout = BatchTimeout::exact(timeout)?;
        self.write_typed(&path, &timeout)
    }

    pub fn consensus_type(&self) -> Result<Option<ConsensusType>> {
        let path = self.section_path(Section::Orderer)?;
        self.read_typed(&path)
    }

    pub fn set_consensus_type(&mut self, consensus: &ConsensusType) -> Result<()> {
        let path = self.section_path(Section::Orderer)?;
        self.write_typed(&path, consensus)
    }

    /// Switch the consensus implementation between normal operation and
    /// maintenance mode. The consensus type must already be declared.
    pub fn set_consensus_state(&mut self, state: ConsensusState) -> Result<()> {
        let path = self.section_path(Section::Orderer)?;
        let mut consensus = self
            .read_typed::<ConsensusType>(&path)?
            .ok_or_else(|| ConfigError::NotFound(path.value(CONSENSUS_TYPE_KEY)))?;
        consensus.state = state;
        debug!(?state, "setting consensus state");
        self.write_typed(&path, &consensus)
    }

    /// Ordering endpoints of an orderer organization; empty when not declared.
    pub fn orderer_endpoints(&self, org: &str) -> Result<Vec<String>> {
        let path = self.org_path(Section::Orderer, org)?;
        Ok(self
            .read_typed::<Endpoints>(&path)?
            .map(|endpoints| endpoints.addresses)
            .unwrap_or_default())
    }

    pub fn add_orderer_endpoint(&mut self, org: &str, address: &str) -> Result<()> {
        let path = self.org_path(Section::Orderer, org)?;
        address.parse::<Endpoint>()?;
        let mut endpoints = self.read_typed::<Endpoints>(&path)?.unwrap_or_default();
        if endpoints.addresses.iter().any(|existing| existing == address) {
            return Err(ConfigError::EntryExists {
                path: path.value(ENDPOINTS_KEY),
                key: ENDPOINTS_KEY,
                entry: address.to_string(),
            }
            .into());
        }
        endpoints.addresses.push(address.to_string());
        self.write_typed(&path, &endpoints)
    }

    pub fn remove_orderer_endpoint(&mut self, org: &str, address: &str) -> Result<()> {
        let path = self.org_path(Section::Orderer, org)?;
        let mut endpoints = self.read_typed::<Endpoints>(&path)?.unwrap_or_default();
        let before = endpoints.addresses.len();
        endpoints.addresses.retain(|existing| existing != address);
        if endpoints.addresses.len() == before {
            return Err(ConfigError::EntryMissing {
                path: path.value(ENDPOINTS_KEY),
                key: ENDPOINTS_KEY,
                entry: address.to_string(),
            }
            .into());
        }
        self.write_typed(&path, &endpoints)
    }
}
