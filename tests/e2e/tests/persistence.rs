//! Registry persistence and configuration-driven deployment

use e2e_tests::{deployment_config, token, V2Fixture};
use factory_config::DeploymentConfig;
use pair_factory::{FactoryError, PairCreated, PairRegistry};
use std::fs;
use tempfile::tempdir;
use types::{AccountAddress, InitCodeHash, PairSalt};

#[test]
fn redeploy_resumes_from_snapshot() {
    let dir = tempdir().unwrap();
    let mut config = deployment_config();
    config.persistence.snapshot_path = Some(dir.path().join("registry.json"));

    let first = V2Fixture::deploy_with(config.clone()).unwrap();
    first
        .factory_v2
        .set_fee_to(first.wallet, Some(AccountAddress::from_bytes([0x0f; 20])))
        .unwrap();
    first
        .factory_v2
        .save_to(config.persistence.snapshot_path.as_deref().unwrap())
        .unwrap();

    // the fixture's create_pair calls are idempotent against the restored registry
    let second = V2Fixture::deploy_with(config).unwrap();
    assert_eq!(second.factory_v2.len(), 2);
    assert_eq!(second.pair.address(), first.pair.address());
    assert_eq!(second.weth_pair.index(), 1);
    assert_eq!(
        second.factory_v2.fee_to(),
        Some(AccountAddress::from_bytes([0x0f; 20]))
    );
}

#[test]
fn snapshot_under_other_salt_is_refused() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("registry.json");
    let fixture = V2Fixture::deploy().unwrap();
    fixture.factory_v2.save_to(&path).unwrap();

    let other = PairSalt::new(
        fixture.config.factory.deployer,
        InitCodeHash::of_code(b"different pair code"),
    );
    assert!(matches!(
        PairRegistry::load_from(&path, &other),
        Err(FactoryError::SaltMismatch { .. })
    ));
}

#[test]
fn edited_snapshot_is_refused() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("registry.json");
    let fixture = V2Fixture::deploy().unwrap();
    fixture.factory_v2.save_to(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let original = fixture.weth_pair.address().to_string();
    let forged = format!("0x{}", "ab".repeat(20));
    fs::write(&path, text.replace(&original, &forged)).unwrap();

    assert!(matches!(
        PairRegistry::load_from(&path, &fixture.config.factory.salt()),
        Err(FactoryError::CorruptSnapshot(_))
    ));
}

#[test]
fn deploys_from_toml_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("factory.toml");
    fs::write(&config_path, deployment_config().to_toml_string().unwrap()).unwrap();

    let config = DeploymentConfig::load(Some(&config_path), None).unwrap();
    let fixture = V2Fixture::deploy_with(config).unwrap();

    let reference = V2Fixture::deploy().unwrap();
    assert_eq!(fixture.pair.address(), reference.pair.address());
    assert_eq!(fixture.weth, reference.weth);
}

#[test]
fn subscribers_see_each_creation_once() {
    let fixture = V2Fixture::deploy().unwrap();
    let events = fixture.factory_v2.subscribe();

    let created = fixture
        .factory_v2
        .create_pair(token("tokenC"), fixture.token0)
        .unwrap();
    fixture
        .factory_v2
        .create_pair(fixture.token0, token("tokenC"))
        .unwrap();
    fixture
        .factory_v2
        .create_pair(fixture.token0, fixture.token1)
        .unwrap();

    let received: Vec<PairCreated> = events.try_iter().collect();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].pair, created.address());
    assert_eq!(received[0].all_pairs_length, 3);
}

#[test]
fn fee_admin_follows_the_setter() {
    let fixture = V2Fixture::deploy().unwrap();
    let registry = &fixture.factory_v2;
    let newcomer = AccountAddress::from_bytes([0x42; 20]);

    assert_eq!(registry.fee_to_setter(), fixture.wallet);
    assert!(matches!(
        registry.set_fee_to_setter(newcomer, newcomer),
        Err(FactoryError::Forbidden { .. })
    ));

    registry.set_fee_to_setter(fixture.wallet, newcomer).unwrap();
    registry.set_fee_to(newcomer, Some(fixture.wallet)).unwrap();
    assert_eq!(registry.fee_to(), Some(fixture.wallet));
}
