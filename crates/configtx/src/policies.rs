//! Section-level policies.

use std::collections::BTreeMap;

use configtx_core::{Policy, PolicyRule, Section};

use crate::error::Result;
use crate::tx::ConfigTx;

impl ConfigTx {
    /// Policies defined directly in `section`'s group.
    pub fn section_policies(&self, section: Section) -> Result<&BTreeMap<String, Policy>> {
        Ok(&self.section_group(section)?.policies)
    }

    /// Create or replace a policy of `section`, keeping an existing
    /// mod_policy.
    pub fn set_section_policy(&mut self, section: Section, name: &str, rule: PolicyRule) -> Result<()> {
        let path = self.section_path(section)?;
        self.write_rule(&path, name, rule)
    }

    pub fn remove_section_policy(&mut self, section: Section, name: &str) -> Result<Policy> {
        let path = self.section_path(section)?;
        self.delete_policy(&path, name)
    }

    pub fn channel_policies(&self) -> Result<&BTreeMap<String, Policy>> {
        self.section_policies(Section::Channel)
    }

    pub fn set_channel_policy(&mut self, name: &str, rule: PolicyRule) -> Result<()> {
        self.set_section_policy(Section::Channel, name, rule)
    }

    pub fn remove_channel_policy(&mut self, name: &str) -> Result<Policy> {
        self.remove_section_policy(Section::Channel, name)
    }

    pub fn orderer_policies(&self) -> Result<&BTreeMap<String, Policy>> {
        self.section_policies(Section::Orderer)
    }

    pub fn set_orderer_policy(&mut self, name: &str, rule: PolicyRule) -> Result<()> {
        self.set_section_policy(Section::Orderer, name, rule)
    }

    pub fn remove_orderer_policy(&mut self, name: &str) -> Result<Policy> {
        self.remove_section_policy(Section::Orderer, name)
    }

    pub fn application_policies(&self) -> Result<&BTreeMap<String, Policy>> {
        self.section_policies(Section::Application)
    }

    pub fn set_application_policy(&mut self, name: &str, rule: PolicyRule) -> Result<()> {
        self.set_section_policy(Section::Application, name, rule)
    }

    pub fn remove_application_policy(&mut self, name: &str) -> Result<Policy> {
        self.remove_section_policy(Section::Application, name)
    }
}
