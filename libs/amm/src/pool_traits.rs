//! Collaborator contract between the pair registry and the pool engine
//!
//! The registry never touches reserves. It hands the engine a derived
//! [`PairAddress`] and from then on that address is the only handle through
//! which liquidity and swaps are addressed.

use crate::error::AmmError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use types::{AccountAddress, PairAddress, TokenAddress};

/// Remote, fallible pool engine addressed by pair identifier
#[async_trait]
pub trait AmmCollaborator: Send + Sync {
    /// Create the reserve pool for `pair`
    ///
    /// Repeating the call with the same tokens is a no-op; reusing `pair` for
    /// different tokens fails with [`AmmError::PairConflict`].
    async fn create_instance(
        &self,
        token0: TokenAddress,
        token1: TokenAddress,
        pair: PairAddress,
    ) -> Result<(), AmmError>;

    /// Current (reserve0, reserve1)
    async fn reserves(&self, pair: PairAddress) -> Result<(Decimal, Decimal), AmmError>;

    /// Outstanding liquidity shares
    async fn total_supply(&self, pair: PairAddress) -> Result<Decimal, AmmError>;

    /// Liquidity shares held by `holder`
    async fn balance_of(
        &self,
        pair: PairAddress,
        holder: AccountAddress,
    ) -> Result<Decimal, AmmError>;

    /// Deposit both assets and credit the minted shares to `to`
    async fn mint(
        &self,
        pair: PairAddress,
        amount0: Decimal,
        amount1: Decimal,
        to: AccountAddress,
    ) -> Result<Decimal, AmmError>;

    /// Burn `liquidity` shares held by `from`, returning (amount0, amount1)
    async fn burn(
        &self,
        pair: PairAddress,
        liquidity: Decimal,
        from: AccountAddress,
    ) -> Result<(Decimal, Decimal), AmmError>;

    /// Exact-input swap; returns the output amount paid to `to`
    async fn swap(
        &self,
        pair: PairAddress,
        token_in: TokenAddress,
        amount_in: Decimal,
        to: AccountAddress,
    ) -> Result<Decimal, AmmError>;
}
