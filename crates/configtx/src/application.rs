//! Application section ACLs and application organization anchor peers.

use std::collections::BTreeMap;

use configtx_core::schema::{ACLS_KEY, ANCHOR_PEERS_KEY};
use configtx_core::{Acls, AnchorPeers, ConfigError, Endpoint, Section};

use crate::error::Result;
use crate::tx::ConfigTx;

impl ConfigTx {
    /// Resource to policy mapping of the application section; empty when not
    /// declared.
    pub fn acls(&self) -> Result<BTreeMap<String, String>> {
        let path = self.section_path(Section::Application)?;
        Ok(self
            .read_typed::<Acls>(&path)?
            .map(|acls| acls.acls)
            .unwrap_or_default())
    }

    /// Add or overwrite ACL entries.
    pub fn add_acls(&mut self, entries: BTreeMap<String, String>) -> Result<()> {
        let path = self.section_path(Section::Application)?;
        let mut acls = self.read_typed::<Acls>(&path)?.unwrap_or_default();
        acls.acls.extend(entries);
        self.write_typed(&path, &acls)
    }

    /// Remove ACL entries. Fails without changing anything if one is absent.
    pub fn remove_acls(&mut self, resources: &[&str]) -> Result<()> {
        let path = self.section_path(Section::Application)?;
        let mut acls = self.read_typed::<Acls>(&path)?.unwrap_or_default();
        for resource in resources {
            if acls.acls.remove(*resource).is_none() {
                return Err(ConfigError::EntryMissing {
                    path: path.value(ACLS_KEY),
                    key: ACLS_KEY,
                    entry: resource.to_string(),
                }
                .into());
            }
        }
        self.write_typed(&path, &acls)
    }

    /// Anchor peers of an application organization; empty when not declared.
    pub fn anchor_peers(&self, org: &str) -> Result<Vec<Endpoint>> {
        let path = self.org_path(Section::Application, org)?;
        Ok(self
            .read_typed::<AnchorPeers>(&path)?
            .map(|peers| peers.anchor_peers)
            .unwrap_or_default())
    }

    pub fn add_anchor_peer(&mut self, org: &str, peer: Endpoint) -> Result<()> {
        let path = self.org_path(Section::Application, org)?;
        let mut peers = self.read_typed::<AnchorPeers>(&path)?.unwrap_or_default();
        if peers.anchor_peers.contains(&peer) {
            return Err(ConfigError::EntryExists {
                path: path.value(ANCHOR_PEERS_KEY),
                key: ANCHOR_PEERS_KEY,
                entry: peer.to_string(),
            }
            .into());
        }
        peers.anchor_peers.push(peer);
        self.write_typed(&path, &peers)
    }

    /// Remove an anchor peer. Removing the last one leaves an empty list.
    pub fn remove_anchor_peer(&mut self, org: &str, peer: &Endpoint) -> Result<()> {
        let path = self.org_path(Section::Application, org)?;
        let mut peers = self.read_typed::<AnchorPeers>(&path)?.unwrap_or_default();
        let Some(index) = peers.anchor_peers.iter().position(|p| p == peer) else {
            return Err(ConfigError::EntryMissing {
                path: path.value(ANCHOR_PEERS_KEY),
                key: ANCHOR_PEERS_KEY,
                entry: peer.to_string(),
            }
            .into());
        };
        peers.anchor_peers.remove(index);
        self.write_typed(&path, &peers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TxError;
    use crate::organization::Organization;
    use configtx_core::{Config, ConfigPath, Group};
    use configtx_update::ChangeKind;

    fn config() -> Config {
        let acls = Acls {
            acls: BTreeMap::from([(
                "peer/Propose".to_string(),
                "/Channel/Application/Writers".to_string(),
            )]),
        };
        let application = Group::new("Admins")
            .with_typed(&acls, "Admins")
            .unwrap()
            .with_group("Org1", Organization::new("Org1", "Org1MSP").to_group().unwrap());
        Config::new(Group::new("Admins").with_group("Application", application))
    }

    #[test]
    fn test_acls() {
        let mut tx = ConfigTx::new(config());
        assert_eq!(tx.acls().unwrap().len(), 1);

        tx.add_acls(BTreeMap::from([
            ("peer/Propose".to_string(), "/Channel/Application/Admins".to_string()),
            ("qscc/GetBlockByNumber".to_string(), "/Channel/Application/Readers".to_string()),
        ]))
        .unwrap();
        let acls = tx.acls().unwrap();
        assert_eq!(acls["peer/Propose"], "/Channel/Application/Admins");
        assert_eq!(acls.len(), 2);

        assert!(matches!(
            tx.remove_acls(&["qscc/GetBlockByNumber", "lscc/Deploy"]),
            Err(TxError::Config(ConfigError::EntryMissing { .. }))
        ));
        assert_eq!(tx.acls().unwrap().len(), 2);

        tx.remove_acls(&["qscc/GetBlockByNumber"]).unwrap();
        assert_eq!(tx.acls().unwrap().len(), 1);
    }

    #[test]
    fn test_anchor_peers() {
        let mut tx = ConfigTx::new(config());
        assert!(tx.anchor_peers("Org1").unwrap().is_empty());

        let peer = Endpoint::new("peer0.org1.example.com", 7051);
        tx.add_anchor_peer("Org1", peer.clone()).unwrap();
        assert_eq!(tx.anchor_peers("Org1").unwrap(), vec![peer.clone()]);
        assert!(matches!(
            tx.add_anchor_peer("Org1", peer.clone()),
            Err(TxError::Config(ConfigError::EntryExists { .. }))
        ));

        let changes = tx.compute_update().unwrap().changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[0].path,
            ConfigPath::group(["Application", "Org1"]).value("AnchorPeers")
        );
        assert_eq!(changes[0].kind, ChangeKind::Added);

        tx.remove_anchor_peer("Org1", &peer).unwrap();
        assert!(tx.anchor_peers("Org1").unwrap().is_empty());
        assert!(tx.remove_anchor_peer("Org1", &peer).is_err());
    }

    #[test]
    fn test_unknown_org() {
        let tx = ConfigTx::new(config());
        assert_eq!(
            tx.anchor_peers("Org9"),
            Err(TxError::Config(ConfigError::NotFound(ConfigPath::group([
                "Application",
                "Org9"
            ]))))
        );
    }
}
