//! Legacy (single-token) exchange collaborator
//!
//! Each legacy exchange pairs one token against the network's native asset
//! (the *base* side). Liquidity providers hold shares of both reserves.
//! Migration only needs to read a holder's position and withdraw all of it;
//! [`InMemoryLegacyExchange`] additionally supports deposits so fixtures can
//! seed positions.

use amm::truncate;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use types::{AccountAddress, TokenAddress};

/// Smallest representable amount; added when rounding a required deposit up
const WEI: Decimal = amm::WEI;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LegacyError {
    #[error("legacy exchange unavailable: {0}")]
    Unavailable(String),

    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("exchange already exists for {0}")]
    ExchangeExists(TokenAddress),

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
}

/// A holder's claim on a legacy exchange
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPosition {
    /// Native-asset side
    pub base_amount: Decimal,
    /// The exchange's token side
    pub paired_amount: Decimal,
}

impl LegacyPosition {
    pub fn is_empty(&self) -> bool {
        self.base_amount.is_zero() && self.paired_amount.is_zero()
    }
}

/// What the migration coordinator needs from a legacy exchange
#[async_trait]
pub trait LegacyExchange: Send + Sync {
    /// The non-native token this exchange trades
    fn token(&self) -> TokenAddress;

    /// Amounts `holder` could withdraw right now
    async fn get_position(&self, holder: AccountAddress) -> Result<LegacyPosition, LegacyError>;

    /// Withdraw the holder's entire position
    ///
    /// All-or-nothing: on error the holder's share is untouched.
    async fn withdraw(&self, holder: AccountAddress) -> Result<LegacyPosition, LegacyError>;
}

#[derive(Debug, Default)]
struct ExchangeBook {
    base_reserve: Decimal,
    token_reserve: Decimal,
    total_supply: Decimal,
    shares: HashMap<AccountAddress, Decimal>,
}

impl ExchangeBook {
    fn claim(&self, share: Decimal) -> Result<LegacyPosition, LegacyError> {
        if share.is_zero() || self.total_supply.is_zero() {
            return Ok(LegacyPosition::default());
        }
        let pro_rata = |reserve: Decimal| -> Result<Decimal, LegacyError> {
            share
                .checked_mul(reserve)
                .and_then(|v| v.checked_div(self.total_supply))
                .map(truncate)
                .ok_or(LegacyError::Overflow("position"))
        };
        Ok(LegacyPosition {
            base_amount: pro_rata(self.base_reserve)?,
            paired_amount: pro_rata(self.token_reserve)?,
        })
    }
}

/// Reference legacy exchange: one token, native-asset reserve, pro-rata shares
#[derive(Debug)]
pub struct InMemoryLegacyExchange {
    token: TokenAddress,
    book: Mutex<ExchangeBook>,
    halted: AtomicBool,
    reject_withdrawals: AtomicBool,
}

impl InMemoryLegacyExchange {
    pub fn new(token: TokenAddress) -> Self {
        Self {
            token,
            book: Mutex::new(ExchangeBook::default()),
            halted: AtomicBool::new(false),
            reject_withdrawals: AtomicBool::new(false),
        }
    }

    /// Make every call fail with [`LegacyError::Unavailable`]
    pub fn halt(&self) {
        self.halted.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.halted.store(false, Ordering::SeqCst);
        self.reject_withdrawals.store(false, Ordering::SeqCst);
    }

    /// Positions stay readable but withdrawals fail
    pub fn reject_withdrawals(&self) {
        self.reject_withdrawals.store(true, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), LegacyError> {
        if self.halted.load(Ordering::SeqCst) {
            return Err(LegacyError::Unavailable("exchange halted".to_string()));
        }
        Ok(())
    }

    /// Deposit native asset plus up to `max_paired` tokens
    ///
    /// The first deposit sets the price and mints shares equal to `base`.
    /// Later deposits take `base` as given, pull the proportional token amount
    /// (rounded up) and mint shares pro-rata. Returns the shares minted.
    pub fn add_liquidity(
        &self,
        holder: AccountAddress,
        base: Decimal,
        max_paired: Decimal,
    ) -> Result<Decimal, LegacyError> {
        self.ensure_available()?;
        if base <= Decimal::ZERO || max_paired <= Decimal::ZERO {
            return Err(LegacyError::InvalidAmount(
                "deposit amounts must be positive".to_string(),
            ));
        }

        let mut book = self.book.lock();
        let (paired, minted) = if book.total_supply.is_zero() {
            (max_paired, base)
        } else {
            let paired = base
                .checked_mul(book.token_reserve)
                .and_then(|v| v.checked_div(book.base_reserve))
                .map(|v| truncate(v) + WEI)
                .ok_or(LegacyError::Overflow("deposit"))?;
            if paired > max_paired {
                return Err(LegacyError::InvalidAmount(format!(
                    "deposit needs {paired} tokens, at most {max_paired} offered"
                )));
            }
            let minted = base
                .checked_mul(book.total_supply)
                .and_then(|v| v.checked_div(book.base_reserve))
                .map(truncate)
                .ok_or(LegacyError::Overflow("shares"))?;
            (paired, minted)
        };

        let grow = |current: Decimal, by: Decimal| {
            current
                .checked_add(by)
                .ok_or(LegacyError::Overflow("deposit"))
        };
        let base_reserve = grow(book.base_reserve, base)?;
        let token_reserve = grow(book.token_reserve, paired)?;
        let total_supply = grow(book.total_supply, minted)?;
        let share = grow(book.shares.get(&holder).copied().unwrap_or_default(), minted)?;

        book.base_reserve = base_reserve;
        book.token_reserve = token_reserve;
        book.total_supply = total_supply;
        book.shares.insert(holder, share);

        debug!(token = %self.token, %holder, %base, %paired, %minted, "legacy liquidity added");
        Ok(minted)
    }

    pub fn balance_of(&self, holder: &AccountAddress) -> Decimal {
        self.book.lock().shares.get(holder).copied().unwrap_or_default()
    }

    /// (base reserve, token reserve)
    pub fn reserves(&self) -> (Decimal, Decimal) {
        let book = self.book.lock();
        (book.base_reserve, book.token_reserve)
    }

    pub fn total_supply(&self) -> Decimal {
        self.book.lock().total_supply
    }
}

#[async_trait]
impl LegacyExchange for InMemoryLegacyExchange {
    fn token(&self) -> TokenAddress {
        self.token
    }

    async fn get_position(&self, holder: AccountAddress) -> Result<LegacyPosition, LegacyError> {
        self.ensure_available()?;
        let book = self.book.lock();
        let share = book.shares.get(&holder).copied().unwrap_or_default();
        book.claim(share)
    }

    async fn withdraw(&self, holder: AccountAddress) -> Result<LegacyPosition, LegacyError> {
        self.ensure_available()?;
        if self.reject_withdrawals.load(Ordering::SeqCst) {
            return Err(LegacyError::Unavailable(
                "withdrawals rejected".to_string(),
            ));
        }

        let mut book = self.book.lock();
        let share = book.shares.get(&holder).copied().unwrap_or_default();
        if share.is_zero() {
            return Err(LegacyError::InsufficientLiquidity);
        }
        let position = book.claim(share)?;

        book.base_reserve -= position.base_amount;
        book.token_reserve -= position.paired_amount;
        book.total_supply -= share;
        book.shares.remove(&holder);

        info!(
            token = %self.token,
            %holder,
            base = %position.base_amount,
            paired = %position.paired_amount,
            "legacy position withdrawn"
        );
        Ok(position)
    }
}

/// Registry of legacy exchanges, at most one per token
#[derive(Debug, Default)]
pub struct LegacyFactory {
    exchanges: DashMap<TokenAddress, Arc<InMemoryLegacyExchange>>,
}

impl LegacyFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_exchange(
        &self,
        token: TokenAddress,
    ) -> Result<Arc<InMemoryLegacyExchange>, LegacyError> {
        if token.is_zero() {
            return Err(LegacyError::InvalidAmount(
                "exchange token must not be zero".to_string(),
            ));
        }
        match self.exchanges.entry(token) {
            Entry::Occupied(_) => Err(LegacyError::ExchangeExists(token)),
            Entry::Vacant(slot) => {
                let exchange = Arc::new(InMemoryLegacyExchange::new(token));
                slot.insert(Arc::clone(&exchange));
                debug!(%token, "legacy exchange created");
                Ok(exchange)
            }
        }
    }

    pub fn get_exchange(&self, token: &TokenAddress) -> Option<Arc<InMemoryLegacyExchange>> {
        self.exchanges.get(token).map(|entry| Arc::clone(entry.value()))
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.len()
    }
}
