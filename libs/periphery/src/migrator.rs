//! Legacy liquidity migration
//!
//! Moves a holder's entire position out of a legacy exchange and into the
//! pair for (legacy token, wrapped native asset):
//!
//! 1. ReadPosition: nothing to migrate is an error, not a no-op
//! 2. ResolvePair: derive the destination and check the position can be
//!    deposited at the pool's current price and limits; no writes
//! 3. Withdraw: all-or-nothing on the legacy side
//! 4. Deposit: create the pair if needed and mint at the pool's price
//!
//! Nothing is retried. Any failure before step 3 leaves every collaborator
//! untouched; a failure in step 4 reports the withdrawn amounts so custody can
//! be recovered.

use crate::legacy::{LegacyError, LegacyExchange, LegacyPosition};
use crate::router::{AddLiquidity, Router, RouterError};
use pair_factory::derive_for_key;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};
use types::{AccountAddress, PairAddress, PairKey, TokenAddress};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MigrationStep {
    ReadPosition,
    ResolvePair,
    Withdraw,
    Deposit,
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MigrationStep::ReadPosition => "read-position",
            MigrationStep::ResolvePair => "resolve-pair",
            MigrationStep::Withdraw => "withdraw",
            MigrationStep::Deposit => "deposit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MigrationError {
    #[error("{holder} has no legacy position to migrate")]
    NoPositionToMigrate { holder: AccountAddress },

    /// `withdrawn` is set once the legacy position has left the exchange
    #[error("migration aborted at {step}: {reason}")]
    Aborted {
        step: MigrationStep,
        reason: String,
        withdrawn: Option<LegacyPosition>,
    },
}

impl MigrationError {
    pub fn step(&self) -> Option<MigrationStep> {
        match self {
            MigrationError::NoPositionToMigrate { .. } => Some(MigrationStep::ReadPosition),
            MigrationError::Aborted { step, .. } => Some(*step),
        }
    }
}

/// Minimum acceptable deposits; zero accepts any price
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationLimits {
    pub min_base: Decimal,
    pub min_paired: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigratedAmounts {
    pub pair: PairAddress,
    /// Native asset deposited
    pub base: Decimal,
    /// Legacy token deposited
    pub paired: Decimal,
    /// Shares minted to the holder
    pub liquidity: Decimal,
    /// Withdrawn but not accepted by the pool; returned to the holder
    pub refunded_base: Decimal,
    pub refunded_paired: Decimal,
}

/// In-flight state of one `migrate` call
#[derive(Debug)]
struct MigrationRecord {
    holder: AccountAddress,
    legacy_token: TokenAddress,
    pair: Option<PairAddress>,
    withdrawn: Option<LegacyPosition>,
}

impl MigrationRecord {
    fn abort(&self, step: MigrationStep, reason: impl fmt::Display) -> MigrationError {
        let reason = reason.to_string();
        warn!(
            holder = %self.holder,
            legacy_token = %self.legacy_token,
            pair = ?self.pair,
            %step,
            %reason,
            withdrawn = self.withdrawn.is_some(),
            "migration aborted"
        );
        MigrationError::Aborted {
            step,
            reason,
            withdrawn: self.withdrawn,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MigrationCoordinator {
    router: Arc<Router>,
}

impl MigrationCoordinator {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub async fn migrate<L>(
        &self,
        legacy: &L,
        holder: AccountAddress,
    ) -> Result<MigratedAmounts, MigrationError>
    where
        L: LegacyExchange + ?Sized,
    {
        self.migrate_with_limits(legacy, holder, MigrationLimits::default())
            .await
    }

    pub async fn migrate_with_limits<L>(
        &self,
        legacy: &L,
        holder: AccountAddress,
        limits: MigrationLimits,
    ) -> Result<MigratedAmounts, MigrationError>
    where
        L: LegacyExchange + ?Sized,
    {
        let span = info_span!("migrate", %holder, legacy_token = %legacy.token());
        self.run(legacy, holder, limits).instrument(span).await
    }

    async fn run<L>(
        &self,
        legacy: &L,
        holder: AccountAddress,
        limits: MigrationLimits,
    ) -> Result<MigratedAmounts, MigrationError>
    where
        L: LegacyExchange + ?Sized,
    {
        let mut record = MigrationRecord {
            holder,
            legacy_token: legacy.token(),
            pair: None,
            withdrawn: None,
        };
        let wrapped_native = self.router.wrapped_native();

        let position = legacy
            .get_position(holder)
            .await
            .map_err(|err| record.abort(MigrationStep::ReadPosition, err))?;
        if position.is_empty() {
            debug!("no legacy position");
            return Err(MigrationError::NoPositionToMigrate { holder });
        }

        let key = PairKey::new(record.legacy_token, wrapped_native)
            .map_err(|err| record.abort(MigrationStep::ResolvePair, err))?;
        let registry = self.router.registry();
        let pair = derive_for_key(&key, registry.salt());
        record.pair = Some(pair);
        debug!(%pair, exists = registry.get_by_key(&key).is_some(), "destination resolved");

        let planned = self
            .router
            .preview_deposit(&deposit_request(&record, wrapped_native, &position, limits))
            .await
            .map_err(|err| record.abort(MigrationStep::ResolvePair, err))?;
        debug!(paired = %planned.0, base = %planned.1, "deposit priced");

        let withdrawn = legacy
            .withdraw(holder)
            .await
            .map_err(|err| record.abort(MigrationStep::Withdraw, err))?;
        if withdrawn.is_empty() {
            return Err(record.abort(MigrationStep::Withdraw, LegacyError::InsufficientLiquidity));
        }
        record.withdrawn = Some(withdrawn);

        // limits are checked again against the reserves at deposit time
        let receipt = self
            .router
            .add_liquidity(deposit_request(&record, wrapped_native, &withdrawn, limits))
            .await
            .map_err(|err: RouterError| record.abort(MigrationStep::Deposit, err))?;

        let migrated = MigratedAmounts {
            pair: receipt.pair,
            base: receipt.amount_b,
            paired: receipt.amount_a,
            liquidity: receipt.liquidity,
            refunded_base: withdrawn.base_amount - receipt.amount_b,
            refunded_paired: withdrawn.paired_amount - receipt.amount_a,
        };
        info!(
            pair = %migrated.pair,
            base = %migrated.base,
            paired = %migrated.paired,
            liquidity = %migrated.liquidity,
            refunded_base = %migrated.refunded_base,
            refunded_paired = %migrated.refunded_paired,
            "migration complete"
        );
        Ok(migrated)
    }
}

/// Deposit of `amounts` into the (legacy token, native) pair, token side first
fn deposit_request(
    record: &MigrationRecord,
    wrapped_native: TokenAddress,
    amounts: &LegacyPosition,
    limits: MigrationLimits,
) -> AddLiquidity {
    AddLiquidity {
        token_a: record.legacy_token,
        token_b: wrapped_native,
        amount_a_desired: amounts.paired_amount,
        amount_b_desired: amounts.base_amount,
        amount_a_min: limits.min_paired,
        amount_b_min: limits.min_base,
        to: record.holder,
    }
}
