//! In-memory constant-product engine
//!
//! Reference implementation of [`AmmCollaborator`] used by tests and local
//! tooling. Pools live in a `DashMap` keyed by pair address; every operation
//! holds the pool's shard lock for its whole read-modify-write.

use crate::error::AmmError;
use crate::pool_traits::AmmCollaborator;
use crate::v2_math::{V2Math, V2PoolState, DEFAULT_FEE_BPS, MINIMUM_LIQUIDITY};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};
use types::{AccountAddress, PairAddress, TokenAddress};

/// One reserve pool with its share ledger
#[derive(Debug, Clone)]
pub struct PoolEntry {
    pub token0: TokenAddress,
    pub token1: TokenAddress,
    pub state: V2PoolState,
    balances: HashMap<AccountAddress, Decimal>,
}

impl PoolEntry {
    fn new(token0: TokenAddress, token1: TokenAddress, fee_bps: u32) -> Self {
        Self {
            token0,
            token1,
            state: V2PoolState::new(fee_bps),
            balances: HashMap::new(),
        }
    }

    pub fn balance_of(&self, holder: &AccountAddress) -> Decimal {
        self.balances.get(holder).copied().unwrap_or(Decimal::ZERO)
    }

    fn credit(&mut self, holder: AccountAddress, amount: Decimal) -> Result<(), AmmError> {
        let balance = self.balances.entry(holder).or_insert(Decimal::ZERO);
        *balance = balance
            .checked_add(amount)
            .ok_or(AmmError::Overflow("share balance"))?;
        Ok(())
    }
}

fn add(a: Decimal, b: Decimal, context: &'static str) -> Result<Decimal, AmmError> {
    a.checked_add(b).ok_or(AmmError::Overflow(context))
}

/// Constant-product pools held in process memory
pub struct InMemoryAmm {
    pools: DashMap<PairAddress, PoolEntry>,
    fee_bps: u32,
    halted: AtomicBool,
}

impl Default for InMemoryAmm {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAmm {
    pub fn new() -> Self {
        Self::with_fee_bps(DEFAULT_FEE_BPS)
    }

    pub fn with_fee_bps(fee_bps: u32) -> Self {
        Self {
            pools: DashMap::new(),
            fee_bps,
            halted: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail with [`AmmError::Unavailable`]
    pub fn halt(&self) {
        self.halted.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.halted.store(false, Ordering::SeqCst);
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Copy of a pool's current state
    pub fn pool(&self, pair: &PairAddress) -> Option<PoolEntry> {
        self.pools.get(pair).map(|entry| entry.clone())
    }

    fn ensure_available(&self) -> Result<(), AmmError> {
        if self.halted.load(Ordering::SeqCst) {
            return Err(AmmError::Unavailable("engine halted".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AmmCollaborator for InMemoryAmm {
    async fn create_instance(
        &self,
        token0: TokenAddress,
        token1: TokenAddress,
        pair: PairAddress,
    ) -> Result<(), AmmError> {
        self.ensure_available()?;
        if token0 >= token1 {
            return Err(AmmError::InvalidToken {
                token: token0,
                pair,
            });
        }

        match self.pools.entry(pair) {
            Entry::Occupied(existing) => {
                let pool = existing.get();
                if pool.token0 != token0 || pool.token1 != token1 {
                    return Err(AmmError::PairConflict { pair });
                }
                trace!(%pair, "pool instance already present");
            }
            Entry::Vacant(slot) => {
                slot.insert(PoolEntry::new(token0, token1, self.fee_bps));
                debug!(%pair, %token0, %token1, "pool instance created");
            }
        }
        Ok(())
    }

    async fn reserves(&self, pair: PairAddress) -> Result<(Decimal, Decimal), AmmError> {
        self.ensure_available()?;
        let pool = self.pools.get(&pair).ok_or(AmmError::UnknownPair(pair))?;
        Ok((pool.state.reserve0, pool.state.reserve1))
    }

    async fn total_supply(&self, pair: PairAddress) -> Result<Decimal, AmmError> {
        self.ensure_available()?;
        let pool = self.pools.get(&pair).ok_or(AmmError::UnknownPair(pair))?;
        Ok(pool.state.total_supply)
    }

    async fn balance_of(
        &self,
        pair: PairAddress,
        holder: AccountAddress,
    ) -> Result<Decimal, AmmError> {
        self.ensure_available()?;
        let pool = self.pools.get(&pair).ok_or(AmmError::UnknownPair(pair))?;
        Ok(pool.balance_of(&holder))
    }

    async fn mint(
        &self,
        pair: PairAddress,
        amount0: Decimal,
        amount1: Decimal,
        to: AccountAddress,
    ) -> Result<Decimal, AmmError> {
        self.ensure_available()?;
        let mut pool = self.pools.get_mut(&pair).ok_or(AmmError::UnknownPair(pair))?;

        let liquidity = V2Math::liquidity_to_mint(amount0, amount1, &pool.state)?;
        let reserve0 = add(pool.state.reserve0, amount0, "reserve0")?;
        let reserve1 = add(pool.state.reserve1, amount1, "reserve1")?;

        if pool.state.total_supply.is_zero() {
            // Locked forever so the share price can never be reset to zero
            pool.credit(AccountAddress::ZERO, MINIMUM_LIQUIDITY)?;
            pool.state.total_supply = MINIMUM_LIQUIDITY;
        }
        pool.credit(to, liquidity)?;
        pool.state.total_supply = add(pool.state.total_supply, liquidity, "total supply")?;
        pool.state.reserve0 = reserve0;
        pool.state.reserve1 = reserve1;

        debug!(%pair, %to, %amount0, %amount1, %liquidity, "minted liquidity");
        Ok(liquidity)
    }

    async fn burn(
        &self,
        pair: PairAddress,
        liquidity: Decimal,
        from: AccountAddress,
    ) -> Result<(Decimal, Decimal), AmmError> {
        self.ensure_available()?;
        let mut pool = self.pools.get_mut(&pair).ok_or(AmmError::UnknownPair(pair))?;

        if pool.balance_of(&from) < liquidity {
            return Err(AmmError::InsufficientLiquidityBurned);
        }
        let (amount0, amount1) = V2Math::burn_amounts(liquidity, &pool.state)?;

        pool.credit(from, -liquidity)?;
        pool.state.total_supply -= liquidity;
        pool.state.reserve0 -= amount0;
        pool.state.reserve1 -= amount1;

        debug!(%pair, %from, %amount0, %amount1, %liquidity, "burned liquidity");
        Ok((amount0, amount1))
    }

    async fn swap(
        &self,
        pair: PairAddress,
        token_in: TokenAddress,
        amount_in: Decimal,
        to: AccountAddress,
    ) -> Result<Decimal, AmmError> {
        self.ensure_available()?;
        let mut pool = self.pools.get_mut(&pair).ok_or(AmmError::UnknownPair(pair))?;

        let zero_for_one = if token_in == pool.token0 {
            true
        } else if token_in == pool.token1 {
            false
        } else {
            return Err(AmmError::InvalidToken {
                token: token_in,
                pair,
            });
        };

        let (reserve_in, reserve_out) = pool.state.oriented(zero_for_one);
        let amount_out =
            V2Math::calculate_output_amount(amount_in, reserve_in, reserve_out, pool.state.fee_bps)?;
        if amount_out <= Decimal::ZERO {
            return Err(AmmError::InsufficientOutputAmount);
        }

        let new_in = add(reserve_in, amount_in, "swap reserve")?;
        if zero_for_one {
            pool.state.reserve0 = new_in;
            pool.state.reserve1 -= amount_out;
        } else {
            pool.state.reserve1 = new_in;
            pool.state.reserve0 -= amount_out;
        }

        debug!(%pair, %to, %token_in, %amount_in, %amount_out, "swap executed");
        Ok(amount_out)
    }
}
