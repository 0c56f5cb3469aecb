//! Capability reads through a ConfigTx.

use configtx::core::schema::{CAPABILITIES_KEY, ORDERER_GROUP_KEY};
use configtx::core::{Capabilities, ConfigError};
use configtx::{CapabilityMap, Config, ConfigTx, Group, TxError, Value};
use configtx_testkit::fixtures::{
    base_application_group, base_orderer_group, APPLICATION_CAPABILITIES, ORDERER_CAPABILITIES,
};

fn flags(names: &[&str]) -> CapabilityMap {
    names.iter().map(|name| (name.to_string(), true)).collect()
}

#[test]
fn test_channel_capabilities() -> anyhow::Result<()> {
    let expected = flags(&["V1_3"]);

    let mut channel = Group::new("Admins");
    channel.insert_typed(&Capabilities::from_map(&expected), "Admins")?;
    let tx = ConfigTx::new(Config::new(channel.clone()));
    assert_eq!(tx.channel_capabilities()?, Some(expected));

    channel.values.remove(CAPABILITIES_KEY);
    let tx = ConfigTx::new(Config::new(channel));
    assert_eq!(tx.channel_capabilities()?, None);
    Ok(())
}

#[test]
fn test_orderer_capabilities() -> anyhow::Result<()> {
    let mut config = Config::new(Group::new("Admins").with_group(ORDERER_GROUP_KEY, base_orderer_group()));
    let tx = ConfigTx::new(config.clone());
    assert_eq!(tx.orderer_capabilities()?, Some(flags(ORDERER_CAPABILITIES)));

    config
        .channel_group
        .child_mut(ORDERER_GROUP_KEY)
        .expect("orderer group")
        .values
        .remove(CAPABILITIES_KEY);
    let tx = ConfigTx::new(config);
    assert_eq!(tx.orderer_capabilities()?, None);
    Ok(())
}

#[test]
fn test_orderer_capabilities_failure() {
    let tx = ConfigTx::new(Config::new(Group::new("Admins")));

    let result = tx.orderer_capabilities();
    assert_eq!(
        result.as_ref().map_err(ToString::to_string),
        Err("orderer missing from config".to_string())
    );
}

#[test]
fn test_application_capabilities() -> anyhow::Result<()> {
    let mut config = Config::new(Group::new("Admins").with_group("Application", base_application_group()));
    let tx = ConfigTx::new(config.clone());
    assert_eq!(tx.application_capabilities()?, Some(flags(APPLICATION_CAPABILITIES)));

    config
        .channel_group
        .child_mut("Application")
        .expect("application group")
        .values
        .remove(CAPABILITIES_KEY);
    let tx = ConfigTx::new(config);
    assert_eq!(tx.application_capabilities()?, None);
    Ok(())
}

#[test]
fn test_application_capabilities_failure() {
    let tx = ConfigTx::new(Config::new(Group::new("Admins")));

    let err = tx.application_capabilities().unwrap_err();
    assert_eq!(err.to_string(), "application missing from config");
}

#[test]
fn test_malformed_capabilities_are_not_absent() {
    let channel = Group::new("Admins").with_value(CAPABILITIES_KEY, Value::new(vec![0xffu8, 0x00], "Admins"));
    let tx = ConfigTx::new(Config::new(channel));

    assert!(matches!(
        tx.channel_capabilities(),
        Err(TxError::Config(ConfigError::Decode { key: "Capabilities", .. }))
    ));
}

#[test]
fn test_capability_write_read_back() -> anyhow::Result<()> {
    let mut tx = ConfigTx::new(Config::new(Group::new("Admins")));
    tx.set_capabilities(configtx::Section::Channel, &flags(&["V1_3"]))?;

    assert_eq!(tx.channel_capabilities()?, Some(flags(&["V1_3"])));
    assert_eq!(tx.original().channel_group.values.get(CAPABILITIES_KEY), None);
    Ok(())
}
