//! Concurrent pair registry
//!
//! ## Locking
//!
//! - `pairs` (DashMap): the key → instance index. Creation runs under the
//!   shard's entry guard, so check-then-insert is atomic per key.
//! - `all_pairs` (RwLock): creation order. Its write lock is only ever taken
//!   while a shard entry guard is held, never the other way round.
//! - `fees` (RwLock): fee recipient and setter, independent of the pair set.
//!
//! Events are published after every lock is released.

use crate::derive::{derive_for_key, derive_pair_address};
use crate::error::FactoryError;
use crate::events::{EventBus, PairCreated};
use crate::pair::PairInstance;
use crossbeam_channel::Receiver;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use factory_config::FactoryConfig;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};
use types::{AccountAddress, PairAddress, PairKey, PairSalt, TokenAddress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FeeSettings {
    pub(crate) fee_to: Option<AccountAddress>,
    pub(crate) fee_to_setter: AccountAddress,
}

/// Outcome of a `create_pair` call
#[derive(Debug, Clone)]
pub struct PairCreation {
    pub pair: Arc<PairInstance>,
    /// `false` when the pair already existed and was returned as-is
    pub created: bool,
}

/// Registry of every pair created under one derivation salt
#[derive(Debug)]
pub struct PairRegistry {
    salt: PairSalt,
    pairs: DashMap<PairKey, Arc<PairInstance>>,
    all_pairs: RwLock<Vec<Arc<PairInstance>>>,
    fees: RwLock<FeeSettings>,
    events: EventBus,
}

impl PairRegistry {
    pub fn new(salt: PairSalt, fee_to_setter: AccountAddress) -> Self {
        info!(deployer = %salt.deployer, init_code_hash = %salt.init_code_hash, "pair registry created");
        Self::with_state(
            salt,
            FeeSettings {
                fee_to: None,
                fee_to_setter,
            },
            Vec::new(),
        )
    }

    pub fn from_config(config: &FactoryConfig) -> Self {
        Self::new(config.salt(), config.fee_to_setter)
    }

    /// Rebuild a registry from already-validated instances in creation order
    pub(crate) fn with_state(
        salt: PairSalt,
        fees: FeeSettings,
        instances: Vec<Arc<PairInstance>>,
    ) -> Self {
        let pairs = DashMap::with_capacity(instances.len());
        for instance in &instances {
            pairs.insert(instance.key(), Arc::clone(instance));
        }
        Self {
            salt,
            pairs,
            all_pairs: RwLock::new(instances),
            fees: RwLock::new(fees),
            events: EventBus::default(),
        }
    }

    pub fn salt(&self) -> &PairSalt {
        &self.salt
    }

    /// Address the pair for these tokens has (or would have), without touching the registry
    pub fn pair_for(
        &self,
        token_a: TokenAddress,
        token_b: TokenAddress,
    ) -> Result<PairAddress, FactoryError> {
        derive_pair_address(token_a, token_b, &self.salt)
    }

    /// Look up a pair in either token order
    ///
    /// Invalid pair kinds simply have no pair.
    pub fn get_pair(&self, token_a: TokenAddress, token_b: TokenAddress) -> Option<Arc<PairInstance>> {
        let key = PairKey::new(token_a, token_b).ok()?;
        self.get_by_key(&key)
    }

    pub fn get_by_key(&self, key: &PairKey) -> Option<Arc<PairInstance>> {
        self.pairs.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, token_a: TokenAddress, token_b: TokenAddress) -> bool {
        self.get_pair(token_a, token_b).is_some()
    }

    /// Create the pair for these tokens, or return the existing one
    ///
    /// Idempotent: concurrent callers for the same unordered token set all
    /// receive the same instance and exactly one creation is recorded.
    pub fn create_pair(
        &self,
        token_a: TokenAddress,
        token_b: TokenAddress,
    ) -> Result<Arc<PairInstance>, FactoryError> {
        self.create_pair_detailed(token_a, token_b)
            .map(|creation| creation.pair)
    }

    /// [`create_pair`](Self::create_pair), also reporting whether a new pair was made
    pub fn create_pair_detailed(
        &self,
        token_a: TokenAddress,
        token_b: TokenAddress,
    ) -> Result<PairCreation, FactoryError> {
        let key = PairKey::new(token_a, token_b).map_err(|err| {
            warn!(%token_a, %token_b, error = %err, "rejected pair creation");
            FactoryError::from(err)
        })?;

        let (pair, all_pairs_length) = match self.pairs.entry(key) {
            Entry::Occupied(existing) => {
                debug!(pair = %existing.get().address(), "pair already exists");
                return Ok(PairCreation {
                    pair: Arc::clone(existing.get()),
                    created: false,
                });
            }
            Entry::Vacant(slot) => {
                let address = derive_for_key(&key, &self.salt);
                let mut all_pairs = self.all_pairs.write();
                let pair = Arc::new(PairInstance::new(address, key, all_pairs.len()));
                let _guard = slot.insert(Arc::clone(&pair));
                all_pairs.push(Arc::clone(&pair));
                (pair, all_pairs.len())
            }
        };

        info!(
            token0 = %pair.token0(),
            token1 = %pair.token1(),
            pair = %pair.address(),
            all_pairs_length,
            "pair created"
        );
        self.events.publish(PairCreated {
            token0: pair.token0(),
            token1: pair.token1(),
            pair: pair.address(),
            all_pairs_length,
        });

        Ok(PairCreation {
            pair,
            created: true,
        })
    }

    pub fn all_pairs_length(&self) -> usize {
        self.all_pairs.read().len()
    }

    pub fn len(&self) -> usize {
        self.all_pairs_length()
    }

    pub fn is_empty(&self) -> bool {
        self.all_pairs_length() == 0
    }

    /// Pair at a creation-order position
    pub fn pair_at(&self, index: usize) -> Option<Arc<PairInstance>> {
        self.all_pairs.read().get(index).cloned()
    }

    /// Every pair in creation order
    pub fn all_pairs(&self) -> Vec<Arc<PairInstance>> {
        self.all_pairs.read().clone()
    }

    pub fn fee_to(&self) -> Option<AccountAddress> {
        self.fees.read().fee_to
    }

    pub fn fee_to_setter(&self) -> AccountAddress {
        self.fees.read().fee_to_setter
    }

    /// Set or clear the protocol-fee recipient; only the fee setter may call
    pub fn set_fee_to(
        &self,
        caller: AccountAddress,
        fee_to: Option<AccountAddress>,
    ) -> Result<(), FactoryError> {
        let mut fees = self.fees.write();
        if caller != fees.fee_to_setter {
            warn!(%caller, "set_fee_to rejected");
            return Err(FactoryError::Forbidden { caller });
        }
        fees.fee_to = fee_to;
        info!(fee_to = ?fee_to, "fee recipient updated");
        Ok(())
    }

    /// Hand the fee-setter role to another account; only the current setter may call
    pub fn set_fee_to_setter(
        &self,
        caller: AccountAddress,
        new_setter: AccountAddress,
    ) -> Result<(), FactoryError> {
        let mut fees = self.fees.write();
        if caller != fees.fee_to_setter {
            warn!(%caller, "set_fee_to_setter rejected");
            return Err(FactoryError::Forbidden { caller });
        }
        fees.fee_to_setter = new_setter;
        info!(%new_setter, "fee setter updated");
        Ok(())
    }

    /// Receive a [`PairCreated`] for every pair created from now on
    pub fn subscribe(&self) -> Receiver<PairCreated> {
        self.events.subscribe()
    }

    pub(crate) fn fee_settings(&self) -> FeeSettings {
        *self.fees.read()
    }
}
