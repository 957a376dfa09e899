//! Liquidity router
//!
//! Resolves (or creates) the pair for two tokens through the registry, makes
//! sure the pool engine has an instance at the derived address, and deposits
//! amounts that match the pool's current price.

use amm::{AmmCollaborator, AmmError, V2Math, V2PoolState, DEFAULT_FEE_BPS};
use pair_factory::{FactoryError, PairInstance, PairRegistry};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use types::{AccountAddress, PairAddress, PairKeyError, TokenAddress};

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("invalid pair kind: {0}")]
    InvalidPairKind(PairKeyError),

    #[error("insufficient A amount")]
    InsufficientAAmount,

    #[error("insufficient B amount")]
    InsufficientBAmount,

    #[error(transparent)]
    Amm(#[from] AmmError),

    #[error(transparent)]
    Registry(FactoryError),
}

impl From<FactoryError> for RouterError {
    fn from(err: FactoryError) -> Self {
        match err {
            FactoryError::InvalidPairKind(kind) => RouterError::InvalidPairKind(kind),
            other => RouterError::Registry(other),
        }
    }
}

/// Deposit request, amounts given in caller order (`token_a`, `token_b`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidity {
    pub token_a: TokenAddress,
    pub token_b: TokenAddress,
    pub amount_a_desired: Decimal,
    pub amount_b_desired: Decimal,
    pub amount_a_min: Decimal,
    pub amount_b_min: Decimal,
    pub to: AccountAddress,
}

/// What a deposit actually took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityReceipt {
    pub pair: PairAddress,
    pub amount_a: Decimal,
    pub amount_b: Decimal,
    pub liquidity: Decimal,
}

pub struct Router {
    registry: Arc<PairRegistry>,
    amm: Arc<dyn AmmCollaborator>,
    wrapped_native: TokenAddress,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("pairs", &self.registry.len())
            .field("wrapped_native", &self.wrapped_native)
            .finish()
    }
}

impl Router {
    pub fn new(
        registry: Arc<PairRegistry>,
        amm: Arc<dyn AmmCollaborator>,
        wrapped_native: TokenAddress,
    ) -> Self {
        Self {
            registry,
            amm,
            wrapped_native,
        }
    }

    pub fn registry(&self) -> &Arc<PairRegistry> {
        &self.registry
    }

    pub fn amm(&self) -> &Arc<dyn AmmCollaborator> {
        &self.amm
    }

    pub fn wrapped_native(&self) -> TokenAddress {
        self.wrapped_native
    }

    /// Derived pair address, whether or not the pair exists yet
    pub fn pair_for(
        &self,
        token_a: TokenAddress,
        token_b: TokenAddress,
    ) -> Result<PairAddress, RouterError> {
        Ok(self.registry.pair_for(token_a, token_b)?)
    }

    /// Create the pair and its pool instance if either is missing
    ///
    /// Both halves are idempotent, so repeating after a partial failure is safe.
    pub async fn ensure_pair(
        &self,
        token_a: TokenAddress,
        token_b: TokenAddress,
    ) -> Result<Arc<PairInstance>, RouterError> {
        let pair = self.registry.create_pair(token_a, token_b)?;
        self.amm
            .create_instance(pair.token0(), pair.token1(), pair.address())
            .await?;
        Ok(pair)
    }

    pub fn quote(
        amount_a: Decimal,
        reserve_a: Decimal,
        reserve_b: Decimal,
    ) -> Result<Decimal, RouterError> {
        Ok(V2Math::quote(amount_a, reserve_a, reserve_b)?)
    }

    /// Amounts to deposit so the pool price is unchanged
    ///
    /// An empty pool takes both desired amounts and sets the price.
    fn optimal_amounts(
        request: &AddLiquidity,
        reserve_a: Decimal,
        reserve_b: Decimal,
    ) -> Result<(Decimal, Decimal), RouterError> {
        if reserve_a.is_zero() && reserve_b.is_zero() {
            return Ok((request.amount_a_desired, request.amount_b_desired));
        }

        let amount_b_optimal = Self::quote(request.amount_a_desired, reserve_a, reserve_b)?;
        if amount_b_optimal <= request.amount_b_desired {
            if amount_b_optimal < request.amount_b_min {
                return Err(RouterError::InsufficientBAmount);
            }
            return Ok((request.amount_a_desired, amount_b_optimal));
        }

        let amount_a_optimal = Self::quote(request.amount_b_desired, reserve_b, reserve_a)?;
        if amount_a_optimal > request.amount_a_desired || amount_a_optimal < request.amount_a_min {
            return Err(RouterError::InsufficientAAmount);
        }
        Ok((amount_a_optimal, request.amount_b_desired))
    }

    /// Amounts `add_liquidity` would take right now, without creating anything
    ///
    /// A pair that does not exist yet, or has no pool instance, prices as an
    /// empty pool. An empty pool needs both sides to mint any shares.
    pub async fn preview_deposit(
        &self,
        request: &AddLiquidity,
    ) -> Result<(Decimal, Decimal), RouterError> {
        let address = self.pair_for(request.token_a, request.token_b)?;
        let (reserve_a, reserve_b) = match self.registry.get_pair(request.token_a, request.token_b) {
            Some(pair) => match self.amm.reserves(address).await {
                Ok((reserve0, reserve1)) if request.token_a == pair.token0() => (reserve0, reserve1),
                Ok((reserve0, reserve1)) => (reserve1, reserve0),
                Err(AmmError::UnknownPair(_)) => (Decimal::ZERO, Decimal::ZERO),
                Err(err) => return Err(err.into()),
            },
            None => (Decimal::ZERO, Decimal::ZERO),
        };

        let (amount_a, amount_b) = Self::optimal_amounts(request, reserve_a, reserve_b)?;
        let empty_pool = reserve_a.is_zero() && reserve_b.is_zero();
        if empty_pool && (amount_a <= Decimal::ZERO || amount_b <= Decimal::ZERO) {
            return Err(AmmError::InsufficientLiquidityMinted.into());
        }
        Ok((amount_a, amount_b))
    }

    /// Deposit into the pair for `token_a`/`token_b`, creating it if needed
    pub async fn add_liquidity(&self, request: AddLiquidity) -> Result<LiquidityReceipt, RouterError> {
        let pair = self.ensure_pair(request.token_a, request.token_b).await?;
        let a_is_token0 = request.token_a == pair.token0();

        let (reserve0, reserve1) = self.amm.reserves(pair.address()).await?;
        let (reserve_a, reserve_b) = if a_is_token0 {
            (reserve0, reserve1)
        } else {
            (reserve1, reserve0)
        };

        let (amount_a, amount_b) = Self::optimal_amounts(&request, reserve_a, reserve_b)?;
        let (amount0, amount1) = if a_is_token0 {
            (amount_a, amount_b)
        } else {
            (amount_b, amount_a)
        };
        debug!(pair = %pair.address(), %amount_a, %amount_b, "optimal deposit");

        let liquidity = self
            .amm
            .mint(pair.address(), amount0, amount1, request.to)
            .await?;

        info!(pair = %pair.address(), to = %request.to, %liquidity, "liquidity added");
        Ok(LiquidityReceipt {
            pair: pair.address(),
            amount_a,
            amount_b,
            liquidity,
        })
    }

    /// Burn `liquidity` held by `from`, returning (amount_a, amount_b)
    ///
    /// Minimums are checked against the pool before burning.
    pub async fn remove_liquidity(
        &self,
        token_a: TokenAddress,
        token_b: TokenAddress,
        liquidity: Decimal,
        from: AccountAddress,
        amount_a_min: Decimal,
        amount_b_min: Decimal,
    ) -> Result<(Decimal, Decimal), RouterError> {
        let address = self.pair_for(token_a, token_b)?;
        let pair = self
            .registry
            .get_pair(token_a, token_b)
            .ok_or(AmmError::UnknownPair(address))?;
        let a_is_token0 = token_a == pair.token0();

        let (reserve0, reserve1) = self.amm.reserves(address).await?;
        let state = V2PoolState {
            reserve0,
            reserve1,
            total_supply: self.amm.total_supply(address).await?,
            fee_bps: DEFAULT_FEE_BPS,
        };
        let (expected0, expected1) = V2Math::burn_amounts(liquidity, &state)?;
        let (expected_a, expected_b) = if a_is_token0 {
            (expected0, expected1)
        } else {
            (expected1, expected0)
        };
        if expected_a < amount_a_min {
            return Err(RouterError::InsufficientAAmount);
        }
        if expected_b < amount_b_min {
            return Err(RouterError::InsufficientBAmount);
        }

        let (amount0, amount1) = self.amm.burn(address, liquidity, from).await?;
        let amounts = if a_is_token0 {
            (amount0, amount1)
        } else {
            (amount1, amount0)
        };
        info!(pair = %address, %from, %liquidity, "liquidity removed");
        Ok(amounts)
    }
}
