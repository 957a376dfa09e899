//! Legacy-to-pair migration scenarios

use amm::AmmCollaborator;
use e2e_tests::{account, V2Fixture};
use factory_config::logging::init_logging;
use pair_factory::PairCreated;
use periphery::{
    AddLiquidity, LegacyExchange, LegacyPosition, MigrationError, MigrationLimits, MigrationStep,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn fixture() -> V2Fixture {
    let fixture = V2Fixture::deploy().unwrap();
    init_logging(&fixture.config.logging);
    fixture
}

#[tokio::test]
async fn migrates_position_into_weth_pair() {
    let fixture = fixture();
    let holder = account("holder");
    fixture
        .seed_legacy_position(holder, dec!(100), dec!(50))
        .unwrap();

    let migrated = fixture
        .migrator
        .migrate(fixture.weth_exchange_v1.as_ref(), holder)
        .await
        .unwrap();

    assert_eq!(migrated.base, dec!(100));
    assert_eq!(migrated.paired, dec!(50));
    assert_eq!(migrated.pair, fixture.weth_pair.address());
    assert!(migrated.refunded_base.is_zero());
    assert!(migrated.refunded_paired.is_zero());

    let pair = fixture
        .factory_v2
        .get_pair(fixture.weth, fixture.weth_partner)
        .unwrap();
    assert_eq!(
        fixture.amm.balance_of(pair.address(), holder).await.unwrap(),
        migrated.liquidity
    );
    assert!(fixture
        .weth_exchange_v1
        .get_position(holder)
        .await
        .unwrap()
        .is_empty());

    let again = fixture
        .migrator
        .migrate(fixture.weth_exchange_v1.as_ref(), holder)
        .await;
    assert_eq!(again, Err(MigrationError::NoPositionToMigrate { holder }));
}

#[tokio::test]
async fn migration_creates_missing_pair() {
    let fixture = fixture();
    let holder = account("holder");
    let partner = e2e_tests::token("fresh partner");
    let exchange = fixture.factory_v1.create_exchange(partner).unwrap();
    exchange.add_liquidity(holder, dec!(3), dec!(9)).unwrap();
    assert!(fixture.factory_v2.get_pair(partner, fixture.weth).is_none());

    let migrated = fixture
        .migrator
        .migrate(exchange.as_ref(), holder)
        .await
        .unwrap();

    let created = fixture.factory_v2.get_pair(fixture.weth, partner).unwrap();
    assert_eq!(created.address(), migrated.pair);
    assert_eq!(created.index(), 2);
}

#[tokio::test]
async fn failed_withdrawal_changes_nothing() {
    let fixture = fixture();
    let holder = account("holder");
    let partner = e2e_tests::token("stuck partner");
    let exchange = fixture.factory_v1.create_exchange(partner).unwrap();
    exchange.add_liquidity(holder, dec!(10), dec!(10)).unwrap();
    exchange.reject_withdrawals();

    let pairs_before = fixture.factory_v2.all_pairs_length();
    let destination = fixture.router.pair_for(partner, fixture.weth).unwrap();

    let err = fixture
        .migrator
        .migrate(exchange.as_ref(), holder)
        .await
        .unwrap_err();

    assert_eq!(err.step(), Some(MigrationStep::Withdraw));
    assert!(matches!(err, MigrationError::Aborted { withdrawn: None, .. }));
    assert_eq!(fixture.factory_v2.all_pairs_length(), pairs_before);
    assert!(fixture.factory_v2.get_pair(partner, fixture.weth).is_none());
    // no pool exists at the destination, so the holder has no balance there
    assert!(fixture.amm.balance_of(destination, holder).await.is_err());
    assert_eq!(exchange.balance_of(&holder), dec!(10));
}

#[tokio::test]
async fn failed_withdrawal_into_existing_pair_keeps_balance() {
    let fixture = fixture();
    let holder = account("holder");
    fixture
        .seed_legacy_position(holder, dec!(100), dec!(50))
        .unwrap();
    fixture
        .migrator
        .migrate(fixture.weth_exchange_v1.as_ref(), holder)
        .await
        .unwrap();
    let balance_before = fixture
        .amm
        .balance_of(fixture.weth_pair.address(), holder)
        .await
        .unwrap();

    fixture
        .seed_legacy_position(holder, dec!(1), dec!(1))
        .unwrap();
    fixture.weth_exchange_v1.reject_withdrawals();
    let pairs_before = fixture.factory_v2.len();

    let err = fixture
        .migrator
        .migrate(fixture.weth_exchange_v1.as_ref(), holder)
        .await
        .unwrap_err();

    assert_eq!(err.step(), Some(MigrationStep::Withdraw));
    assert_eq!(fixture.factory_v2.len(), pairs_before);
    assert_eq!(
        fixture
            .amm
            .balance_of(fixture.weth_pair.address(), holder)
            .await
            .unwrap(),
        balance_before
    );
}

#[tokio::test]
async fn migration_at_different_price_refunds_excess() {
    let fixture = fixture();
    let holder = account("holder");

    // pool priced at 1 WETH : 1 partner
    fixture
        .router
        .add_liquidity(AddLiquidity {
            token_a: fixture.weth,
            token_b: fixture.weth_partner,
            amount_a_desired: dec!(10),
            amount_b_desired: dec!(10),
            amount_a_min: Decimal::ZERO,
            amount_b_min: Decimal::ZERO,
            to: fixture.wallet,
        })
        .await
        .unwrap();

    fixture
        .seed_legacy_position(holder, dec!(4), dec!(2))
        .unwrap();
    let migrated = fixture
        .migrator
        .migrate(fixture.weth_exchange_v1.as_ref(), holder)
        .await
        .unwrap();

    assert_eq!(migrated.paired, dec!(2));
    assert_eq!(migrated.base, dec!(2));
    assert_eq!(migrated.refunded_base, dec!(2));
    assert_eq!(migrated.refunded_paired, Decimal::ZERO);
}

#[tokio::test]
async fn limits_rejected_before_withdrawal() {
    let fixture = fixture();
    let holder = account("holder");
    fixture
        .router
        .add_liquidity(AddLiquidity {
            token_a: fixture.weth,
            token_b: fixture.weth_partner,
            amount_a_desired: dec!(10),
            amount_b_desired: dec!(10),
            amount_a_min: Decimal::ZERO,
            amount_b_min: Decimal::ZERO,
            to: fixture.wallet,
        })
        .await
        .unwrap();
    fixture
        .seed_legacy_position(holder, dec!(4), dec!(2))
        .unwrap();

    let err = fixture
        .migrator
        .migrate_with_limits(
            fixture.weth_exchange_v1.as_ref(),
            holder,
            MigrationLimits {
                min_base: dec!(3),
                min_paired: Decimal::ZERO,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        MigrationError::Aborted {
            step: MigrationStep::ResolvePair,
            reason: "insufficient B amount".to_string(),
            withdrawn: None,
        }
    );
    assert_eq!(
        fixture
            .weth_exchange_v1
            .get_position(holder)
            .await
            .unwrap(),
        LegacyPosition {
            base_amount: dec!(4),
            paired_amount: dec!(2),
        }
    );
    assert!(fixture
        .amm
        .balance_of(fixture.weth_pair.address(), holder)
        .await
        .unwrap()
        .is_zero());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_migrations_create_pair_once() {
    let fixture = fixture();
    let partner = e2e_tests::token("crowded partner");
    let exchange = fixture.factory_v1.create_exchange(partner).unwrap();
    let holders: Vec<_> = (0..8)
        .map(|n| account(&format!("holder {n}")))
        .collect();
    for holder in &holders {
        exchange.add_liquidity(*holder, dec!(2), dec!(4)).unwrap();
    }
    let pairs_before = fixture.factory_v2.all_pairs_length();
    let events = fixture.factory_v2.subscribe();

    let tasks: Vec<_> = holders
        .iter()
        .map(|holder| {
            let migrator = fixture.migrator.clone();
            let exchange = exchange.clone();
            let holder = *holder;
            tokio::spawn(async move { migrator.migrate(exchange.as_ref(), holder).await })
        })
        .collect();

    let mut destinations = Vec::new();
    for task in tasks {
        destinations.push(task.await.unwrap().unwrap().pair);
    }

    let pair = fixture.factory_v2.get_pair(partner, fixture.weth).unwrap();
    assert!(destinations.iter().all(|d| *d == pair.address()));
    assert_eq!(fixture.factory_v2.all_pairs_length(), pairs_before + 1);

    let received: Vec<PairCreated> = events.try_iter().collect();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].pair, pair.address());

    for holder in &holders {
        assert!(exchange.get_position(*holder).await.unwrap().is_empty());
        assert!(!fixture
            .amm
            .balance_of(pair.address(), *holder)
            .await
            .unwrap()
            .is_zero());
    }
}
