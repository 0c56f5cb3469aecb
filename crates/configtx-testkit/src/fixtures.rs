//! Test fixtures and helpers.
//!
//! A small but complete channel: channel values and policies, an orderer
//! section with one organization and an application section with two.

use std::collections::BTreeMap;

use configtx_core::schema::{
    ADMINS_POLICY_KEY, APPLICATION_GROUP_KEY, BLOCK_VALIDATION_POLICY_KEY,
    ENDORSEMENT_POLICY_KEY, LIFECYCLE_ENDORSEMENT_POLICY_KEY, ORDERER_GROUP_KEY,
    READERS_POLICY_KEY, WRITERS_POLICY_KEY,
};
use configtx_core::{
    Acls, AnchorPeers, BatchSize, BatchTimeout, BlockDataHashingStructure, Capabilities, Config,
    ConsensusType, Endpoint, Endpoints, Group, HashingAlgorithm, ImplicitMetaRule, Msp,
    OrdererAddresses, Policy, PolicyRule,
};

/// Capabilities declared by [`sample_config`] at channel scope.
pub const CHANNEL_CAPABILITIES: &[&str] = &["V2_0"];
/// Capabilities declared by [`base_orderer_group`].
pub const ORDERER_CAPABILITIES: &[&str] = &["V1_3"];
/// Capabilities declared by [`base_application_group`].
pub const APPLICATION_CAPABILITIES: &[&str] = &["V1_3"];

fn implicit(rule: ImplicitMetaRule, sub_policy: &str) -> Policy {
    Policy::new(PolicyRule::implicit_meta(rule, sub_policy), ADMINS_POLICY_KEY)
}

fn signature(msp_id: &str, role: &str) -> Policy {
    Policy::new(
        PolicyRule::signature(format!("OR('{msp_id}.{role}')")),
        ADMINS_POLICY_KEY,
    )
}

/// Readers, Writers and Admins as implicit meta policies.
fn standard_policies(group: Group) -> Group {
    group
        .with_policy(READERS_POLICY_KEY, implicit(ImplicitMetaRule::Any, READERS_POLICY_KEY))
        .with_policy(WRITERS_POLICY_KEY, implicit(ImplicitMetaRule::Any, WRITERS_POLICY_KEY))
        .with_policy(ADMINS_POLICY_KEY, implicit(ImplicitMetaRule::Majority, ADMINS_POLICY_KEY))
}

/// An organization group with an MSP and signature policies.
pub fn organization_group(msp_id: &str) -> Group {
    Group::new(ADMINS_POLICY_KEY)
        .with_typed(&Msp::new(msp_id), ADMINS_POLICY_KEY)
        .expect("fixture MSP encodes")
        .with_policy(READERS_POLICY_KEY, signature(msp_id, "member"))
        .with_policy(WRITERS_POLICY_KEY, signature(msp_id, "member"))
        .with_policy(ADMINS_POLICY_KEY, signature(msp_id, "admin"))
        .with_policy(ENDORSEMENT_POLICY_KEY, signature(msp_id, "peer"))
}

/// Orderer section of a solo ordering service.
pub fn base_orderer_group() -> Group {
    let org = organization_group("OrdererMSP")
        .with_typed(
            &Endpoints {
                addresses: vec!["orderer.example.com:7050".into()],
            },
            ADMINS_POLICY_KEY,
        )
        .expect("fixture endpoints encode");

    standard_policies(Group::new(ADMINS_POLICY_KEY))
        .with_policy(
            BLOCK_VALIDATION_POLICY_KEY,
            implicit(ImplicitMetaRule::Any, WRITERS_POLICY_KEY),
        )
        .with_typed(&Capabilities::new(ORDERER_CAPABILITIES.iter().copied()), ADMINS_POLICY_KEY)
        .and_then(|g| g.with_typed(&ConsensusType::new("solo"), ADMINS_POLICY_KEY))
        .and_then(|g| g.with_typed(&BatchSize::default(), ADMINS_POLICY_KEY))
        .and_then(|g| g.with_typed(&BatchTimeout::default(), ADMINS_POLICY_KEY))
        .expect("fixture orderer values encode")
        .with_group("OrdererOrg", org)
}

/// Application section with two peer organizations.
pub fn base_application_group() -> Group {
    let acls = Acls {
        acls: BTreeMap::from([
            ("peer/Propose".to_string(), "/Channel/Application/Writers".to_string()),
            ("qscc/GetChainInfo".to_string(), "/Channel/Application/Readers".to_string()),
        ]),
    };
    let anchor_peers = |host: &str| AnchorPeers {
        anchor_peers: vec![Endpoint::new(host, 7051)],
    };

    let org1 = organization_group("Org1MSP")
        .with_typed(&anchor_peers("peer0.org1.example.com"), ADMINS_POLICY_KEY)
        .expect("fixture anchor peers encode");
    let org2 = organization_group("Org2MSP")
        .with_typed(&anchor_peers("peer0.org2.example.com"), ADMINS_POLICY_KEY)
        .expect("fixture anchor peers encode");

    standard_policies(Group::new(ADMINS_POLICY_KEY))
        .with_policy(
            ENDORSEMENT_POLICY_KEY,
            implicit(ImplicitMetaRule::Majority, ENDORSEMENT_POLICY_KEY),
        )
        .with_policy(
            LIFECYCLE_ENDORSEMENT_POLICY_KEY,
            implicit(ImplicitMetaRule::Majority, ENDORSEMENT_POLICY_KEY),
        )
        .with_typed(
            &Capabilities::new(APPLICATION_CAPABILITIES.iter().copied()),
            ADMINS_POLICY_KEY,
        )
        .and_then(|g| g.with_typed(&acls, ADMINS_POLICY_KEY))
        .expect("fixture application values encode")
        .with_group("Org1", org1)
        .with_group("Org2", org2)
}

/// A complete channel configuration at sequence 0.
pub fn sample_config() -> Config {
    let channel = standard_policies(Group::new(ADMINS_POLICY_KEY))
        .with_typed(&Capabilities::new(CHANNEL_CAPABILITIES.iter().copied()), ADMINS_POLICY_KEY)
        .and_then(|g| g.with_typed(&HashingAlgorithm::default(), ADMINS_POLICY_KEY))
        .and_then(|g| g.with_typed(&BlockDataHashingStructure::default(), ADMINS_POLICY_KEY))
        .and_then(|g| {
            g.with_typed(
                &OrdererAddresses {
                    addresses: vec!["orderer.example.com:7050".into()],
                },
                ADMINS_POLICY_KEY,
            )
        })
        .expect("fixture channel values encode")
        .with_group(ORDERER_GROUP_KEY, base_orderer_group())
        .with_group(APPLICATION_GROUP_KEY, base_application_group());
    Config::new(channel)
}

/// Copy of `config` with every version and the sequence reset to zero, for
/// comparing content only.
pub fn without_versions(config: &Config) -> Config {
    fn strip(group: &mut Group) {
        group.version = 0;
        for value in group.values.values_mut() {
            value.version = 0;
        }
        for policy in group.policies.values_mut() {
            policy.version = 0;
        }
        for child in group.groups.values_mut() {
            strip(child);
        }
    }

    let mut config = config.clone();
    config.sequence = 0;
    strip(&mut config.channel_group);
    config
}
