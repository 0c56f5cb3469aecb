//! Organizations of the orderer and application sections.
//!
//! An organization is a sub-group of its section holding an `MSP` value,
//! its own policies and, depending on the section, `AnchorPeers` or
//! `Endpoints`.

use std::collections::BTreeMap;

use tracing::debug;

use configtx_core::schema::{
    ADMINS_POLICY_KEY, ENDORSEMENT_POLICY_KEY, MSP_KEY, READERS_POLICY_KEY, WRITERS_POLICY_KEY,
};
use configtx_core::{
    AnchorPeers, ConfigError, ConfigPath, Endpoint, Endpoints, Group, Msp, Policy, PolicyRule,
    Section,
};

use crate::error::Result;
use crate::tx::ConfigTx;

/// Definition of an organization as added to a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub name: String,
    pub msp: Msp,
    pub policies: BTreeMap<String, PolicyRule>,
    /// mod_policy of the organization group and of everything in it.
    pub mod_policy: String,
    pub anchor_peers: Vec<Endpoint>,
    pub orderer_endpoints: Vec<String>,
}

impl Organization {
    /// An organization with the standard member, admin and peer policies of
    /// its MSP.
    pub fn new(name: impl Into<String>, msp_id: impl Into<String>) -> Self {
        let msp = Msp::new(msp_id);
        let rule = |role: &str| PolicyRule::signature(format!("OR('{}.{}')", msp.msp_id, role));
        let policies = BTreeMap::from([
            (READERS_POLICY_KEY.to_string(), rule("member")),
            (WRITERS_POLICY_KEY.to_string(), rule("member")),
            (ADMINS_POLICY_KEY.to_string(), rule("admin")),
            (ENDORSEMENT_POLICY_KEY.to_string(), rule("peer")),
        ]);
        Self {
            name: name.into(),
            msp,
            policies,
            mod_policy: ADMINS_POLICY_KEY.to_string(),
            anchor_peers: Vec::new(),
            orderer_endpoints: Vec::new(),
        }
    }

    pub fn with_policy(mut self, name: impl Into<String>, rule: PolicyRule) -> Self {
        self.policies.insert(name.into(), rule);
        self
    }

    pub fn with_anchor_peer(mut self, peer: Endpoint) -> Self {
        self.anchor_peers.push(peer);
        self
    }

    pub fn with_orderer_endpoint(mut self, address: impl Into<String>) -> Self {
        self.orderer_endpoints.push(address.into());
        self
    }

    /// The organization's configuration group.
    pub fn to_group(&self) -> Result<Group> {
        let mut group = Group::new(self.mod_policy.as_str());
        group.insert_typed(&self.msp, &self.mod_policy)?;
        if !self.anchor_peers.is_empty() {
            let peers = AnchorPeers {
                anchor_peers: self.anchor_peers.clone(),
            };
            group.insert_typed(&peers, &self.mod_policy)?;
        }
        if !self.orderer_endpoints.is_empty() {
            let endpoints = Endpoints {
                addresses: self.orderer_endpoints.clone(),
            };
            group.insert_typed(&endpoints, &self.mod_policy)?;
        }
        for (name, rule) in &self.policies {
            group
                .policies
                .insert(name.clone(), Policy::new(rule.clone(), self.mod_policy.as_str()));
        }
        Ok(group)
    }

    /// Read an organization back from its group at `path`.
    pub fn from_group(path: &ConfigPath, group: &Group) -> Result<Self> {
        let msp = group
            .typed::<Msp>()?
            .ok_or_else(|| ConfigError::NotFound(path.value(MSP_KEY)))?;
        Ok(Self {
            name: path.name().unwrap_or_default().to_string(),
            msp,
            policies: group
                .policies
                .iter()
                .map(|(name, policy)| (name.clone(), policy.rule.clone()))
                .collect(),
            mod_policy: group.mod_policy.clone(),
            anchor_peers: group
                .typed::<AnchorPeers>()?
                .map(|peers| peers.anchor_peers)
                .unwrap_or_default(),
            orderer_endpoints: group
                .typed::<Endpoints>()?
                .map(|endpoints| endpoints.addresses)
                .unwrap_or_default(),
        })
    }
}

impl ConfigTx {
    /// Path of an existing organization group of `section`.
    pub(crate) fn org_path(&self, section: Section, org: &str) -> Result<ConfigPath> {
        let path = self.section_path(section)?.child(org);
        self.group(&path)?;
        Ok(path)
    }

    fn organizations(&self, section: Section) -> Result<Vec<String>> {
        Ok(self.section_group(section)?.groups.keys().cloned().collect())
    }

    fn organization(&self, section: Section, org: &str) -> Result<Organization> {
        let path = self.org_path(section, org)?;
        Organization::from_group(&path, self.group(&path)?)
    }

    fn add_organization(&mut self, section: Section, org: &Organization) -> Result<()> {
        let path = self.section_path(section)?;
        self.insert_group(&path, &org.name, org.to_group()?)?;
        debug!(%section, org = %org.name, msp = %org.msp.msp_id, "added organization");
        Ok(())
    }

    fn remove_organization(&mut self, section: Section, org: &str) -> Result<()> {
        let path = self.section_path(section)?;
        self.delete_group(&path, org)?;
        Ok(())
    }

    fn org_policies(&self, section: Section, org: &str) -> Result<&BTreeMap<String, Policy>> {
        let path = self.org_path(section, org)?;
        Ok(&self.group(&path)?.policies)
    }

    fn set_org_policy(&mut self, section: Section, org: &str, name: &str, rule: PolicyRule) -> Result<()> {
        let path = self.org_path(section, org)?;
        self.write_rule(&path, name, rule)
    }

    fn remove_org_policy(&mut self, section: Section, org: &str, name: &str) -> Result<Policy> {
        let path = self.org_path(section, org)?;
        self.delete_policy(&path, name)
    }

    fn org_msp(&self, section: Section, org: &str) -> Result<Msp> {
        let path = self.org_path(section, org)?;
        self.read_typed::<Msp>(&path)?
            .ok_or_else(|| ConfigError::NotFound(path.value(MSP_KEY)).into())
    }

    fn set_org_msp(&mut self, section: Section, org: &str, msp: &Msp) -> Result<()> {
        let path = self.org_path(section, org)?;
        self.write_typed(&path, msp)
    }

    pub fn application_organizations(&self) -> Result<Vec<String>> {
        self.organizations(Section::Application)
    }

    pub fn application_organization(&self, org: &str) -> Result<Organization> {
        self.organization(Section::Application, org)
    }

    pub fn add_application_organization(&mut self, org: &Organization) -> Result<()> {
        self.add_organization(Section::Application, org)
    }

    pub fn remove_application_organization(&mut self, org: &str) -> Result<()> {
        self.remove_organization(Section::Application, org)
    }

    pub fn application_org_policies(&self, org: &str) -> Result<&BTreeMap<String, Policy>> {
        self.org_policies(Section::Application, org)
    }

    pub fn set_application_org_policy(&mut self, org: &str, name: &str, rule: PolicyRule) -> Result<()> {
        self.set_org_policy(Section::Application, org, name, rule)
    }

    pub fn remove_application_org_policy(&mut self, org: &str, name: &str) -> Result<Policy> {
        self.remove_org_policy(Section::Application, org, name)
    }

    pub fn application_org_msp(&self, org: &str) -> Result<Msp> {
        self.org_msp(Section::Application, org)
    }

    pub fn set_application_org_msp(&mut self, org: &str, msp: &Msp) -> Result<()> {
        self.set_org_msp(Section::Application, org, msp)
    }

    pub fn orderer_organizations(&self) -> Result<Vec<String>> {
        self.organizations(Section::Orderer)
    }

    pub fn orderer_organization(&self, org: &str) -> Result<Organization> {
        self.organization(Section::Orderer, org)
    }

    pub fn add_orderer_organization(&mut self, org: &Organization) -> Result<()> {
        self.add_organization(Section::Orderer, org)
    }

    pub fn remove_orderer_organization(&mut self, org: &str) -> Result<()> {
        self.remove_organization(Section::Orderer, org)
    }

    pub fn orderer_org_policies(&self, org: &str) -> Result<&BTreeMap<String, Policy>> {
        self.org_policies(Section::Orderer, org)
    }

    pub fn set_orderer_org_policy(&mut self, org: &str, name: &str, rule: PolicyRule) -> Result<()> {
        self.set_org_policy(Section::Orderer, org, name, rule)
    }

    pub fn remove_orderer_org_policy(&mut self, org: &str, name: &str) -> Result<Policy> {
        self.remove_org_policy(Section::Orderer, org, name)
    }

    pub fn orderer_org_msp(&self, org: &str) -> Result<Msp> {
        self.org_msp(Section::Orderer, org)
    }

    pub fn set_orderer_org_msp(&mut self, org: &str, msp: &Msp) -> Result<()> {
        self.set_org_msp(Section::Orderer, org, msp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TxError;
    use configtx_core::Config;
    use configtx_update::{ChangeKind, ADDED_VERSION};

    fn config() -> Config {
        Config::new(
            Group::new("Admins")
                .with_group("Application", Group::new("Admins"))
                .with_group("Orderer", Group::new("Admins")),
        )
    }

    #[test]
    fn test_default_policies() {
        let org = Organization::new("Org1", "Org1MSP");
        assert_eq!(org.policies.len(), 4);
        assert_eq!(org.policies["Admins"].to_string(), "OR('Org1MSP.admin')");
        assert_eq!(org.policies["Readers"].to_string(), "OR('Org1MSP.member')");
    }

    #[test]
    fn test_organization_group_roundtrip() {
        let org = Organization::new("Org1", "Org1MSP").with_anchor_peer(Endpoint::new("peer0.org1", 7051));
        let group = org.to_group().unwrap();
        assert!(group.values.contains_key("MSP"));
        assert!(group.values.contains_key("AnchorPeers"));
        assert!(!group.values.contains_key("Endpoints"));

        let path = ConfigPath::group(["Application", "Org1"]);
        assert_eq!(Organization::from_group(&path, &group).unwrap(), org);
    }

    #[test]
    fn test_add_application_organization() {
        let mut tx = ConfigTx::new(config());
        let org = Organization::new("Org2", "Org2MSP");
        tx.add_application_organization(&org).unwrap();

        assert_eq!(tx.application_organizations().unwrap(), vec!["Org2".to_string()]);
        assert_eq!(tx.application_organization("Org2").unwrap(), org);
        assert_eq!(tx.application_org_msp("Org2").unwrap().msp_id, "Org2MSP");

        let org_group = tx.group(&ConfigPath::group(["Application", "Org2"])).unwrap();
        assert_eq!(org_group.version, ADDED_VERSION);
        assert!(org_group.policies.values().all(|p| p.version == ADDED_VERSION));

        assert_eq!(
            tx.add_application_organization(&org),
            Err(TxError::Config(ConfigError::AlreadyExists(ConfigPath::group([
                "Application",
                "Org2"
            ]))))
        );

        let changes = tx.compute_update().unwrap().changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Added);
    }

    #[test]
    fn test_org_policies_and_msp() {
        let mut tx = ConfigTx::new(config());
        tx.add_orderer_organization(&Organization::new("OrdererOrg", "OrdererMSP"))
            .unwrap();

        tx.set_orderer_org_policy("OrdererOrg", "BlockSigners", PolicyRule::signature("OR('OrdererMSP.orderer')"))
            .unwrap();
        assert!(tx.orderer_org_policies("OrdererOrg").unwrap().contains_key("BlockSigners"));
        tx.remove_orderer_org_policy("OrdererOrg", "Endorsement").unwrap();
        assert_eq!(tx.orderer_org_policies("OrdererOrg").unwrap().len(), 4);

        let mut msp = tx.orderer_org_msp("OrdererOrg").unwrap();
        msp.definition = bytes::Bytes::from_static(b"root-certs");
        tx.set_orderer_org_msp("OrdererOrg", &msp).unwrap();
        assert_eq!(tx.orderer_org_msp("OrdererOrg").unwrap(), msp);

        tx.remove_orderer_organization("OrdererOrg").unwrap();
        assert!(tx.orderer_organizations().unwrap().is_empty());
        assert!(tx.compute_update().unwrap().is_empty());
    }

    #[test]
    fn test_missing_organization() {
        let tx = ConfigTx::new(config());
        assert_eq!(
            tx.application_org_policies("Org9"),
            Err(TxError::Config(ConfigError::NotFound(ConfigPath::group([
                "Application",
                "Org9"
            ]))))
        );
    }
}
