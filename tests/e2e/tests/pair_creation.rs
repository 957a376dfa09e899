//! Pair creation through the deployed fixture

use e2e_tests::{add_pair, token, V2Fixture};
use pair_factory::{FactoryError, PairInstance};
use proptest::prelude::*;
use std::sync::{Arc, Barrier};
use std::thread;
use types::{PairKeyError, TokenAddress};

#[test]
fn fixture_pairs_are_canonical() {
    let fixture = V2Fixture::deploy().unwrap();

    assert_eq!(fixture.factory_v2.all_pairs_length(), 2);
    assert!(fixture.token0 < fixture.token1);
    assert_eq!(fixture.pair.token0(), fixture.token0);
    assert_eq!(fixture.pair.index(), 0);
    assert_eq!(fixture.weth_pair.index(), 1);
    assert!(fixture.weth_pair.contains(fixture.weth));
    assert!(fixture.weth_pair.contains(fixture.weth_partner));
    assert_eq!(
        fixture.weth_pair.address(),
        fixture
            .router
            .pair_for(fixture.weth_partner, fixture.weth)
            .unwrap()
    );
}

#[test]
fn add_pair_reuses_existing() {
    let fixture = V2Fixture::deploy().unwrap();

    let existing = add_pair(&fixture.factory_v2, fixture.token1, fixture.token0).unwrap();
    assert_eq!(existing.token0, fixture.token0);
    assert_eq!(fixture.factory_v2.len(), 2);

    let fresh = add_pair(&fixture.factory_v2, token("tokenC"), fixture.weth).unwrap();
    assert!(fresh.token0 < fresh.token1);
    assert_eq!(fixture.factory_v2.len(), 3);
}

#[test]
fn self_pairs_are_never_created() {
    let fixture = V2Fixture::deploy().unwrap();
    let before = fixture.factory_v2.len();

    let err = fixture
        .factory_v2
        .create_pair(fixture.weth, fixture.weth)
        .unwrap_err();
    assert!(matches!(
        err,
        FactoryError::InvalidPairKind(PairKeyError::IdenticalTokens(t)) if t == fixture.weth
    ));
    assert!(fixture.factory_v2.get_pair(fixture.weth, fixture.weth).is_none());
    assert_eq!(fixture.factory_v2.len(), before);
}

#[test]
fn threads_racing_on_one_pair() {
    const THREADS: usize = 8;
    let fixture = V2Fixture::deploy().unwrap();
    let (a, b) = (token("raceA"), token("raceB"));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let registry = Arc::clone(&fixture.factory_v2);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let (x, y) = if i % 2 == 0 { (a, b) } else { (b, a) };
                registry.create_pair(x, y).unwrap()
            })
        })
        .collect();
    let pairs: Vec<Arc<PairInstance>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(pairs.iter().all(|p| Arc::ptr_eq(p, &pairs[0])));
    assert_eq!(fixture.factory_v2.len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tasks_racing_through_the_router() {
    let fixture = V2Fixture::deploy().unwrap();
    let (a, b) = (token("taskA"), token("taskB"));

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let router = Arc::clone(&fixture.router);
            tokio::spawn(async move {
                if i % 2 == 0 {
                    router.ensure_pair(a, b).await
                } else {
                    router.ensure_pair(b, a).await
                }
            })
        })
        .collect();

    let mut pairs = Vec::new();
    for task in tasks {
        pairs.push(task.await.unwrap().unwrap());
    }

    assert!(pairs.iter().all(|p| Arc::ptr_eq(p, &pairs[0])));
    assert_eq!(fixture.factory_v2.len(), 3);
    assert_eq!(fixture.amm.pool_count(), 1);
}

fn any_token() -> impl Strategy<Value = TokenAddress> {
    any::<[u8; 20]>()
        .prop_filter("non-zero", |bytes| bytes != &[0u8; 20])
        .prop_map(TokenAddress::from_bytes)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn creation_is_symmetric_and_idempotent(a in any_token(), b in any_token()) {
        prop_assume!(a != b);
        let fixture = V2Fixture::deploy().unwrap();
        let before = fixture.factory_v2.len();

        let first = fixture.factory_v2.create_pair(a, b).unwrap();
        let second = fixture.factory_v2.create_pair(b, a).unwrap();

        prop_assert!(Arc::ptr_eq(&first, &second));
        prop_assert!(first.token0() < first.token1());
        prop_assert_eq!(
            first.address(),
            fixture.factory_v2.pair_for(b, a).unwrap()
        );
        // the fixture's own pairs may coincide with random tokens only with negligible probability
        prop_assert_eq!(fixture.factory_v2.len(), before + 1);
    }
}
