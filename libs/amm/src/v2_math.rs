//! Uniswap V2 AMM math with exact calculations
//!
//! Amounts are token units held as `Decimal` and truncated to
//! [`TOKEN_DECIMALS`] places after every division, which mirrors integer wei
//! arithmetic on chain without overflowing on large products.

use crate::error::AmmError;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Fractional digits carried by every token amount
pub const TOKEN_DECIMALS: u32 = 18;

/// Smallest representable amount (1 wei)
pub const WEI: Decimal = dec!(0.000000000000000001);

/// Liquidity permanently locked by the first mint (1000 wei)
pub const MINIMUM_LIQUIDITY: Decimal = dec!(0.000000000000001);

/// Swap fee in basis points (30 = 0.3%)
pub const DEFAULT_FEE_BPS: u32 = 30;

/// Truncate toward zero at token precision
#[inline]
pub fn truncate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(TOKEN_DECIMALS, RoundingStrategy::ToZero)
}

/// Pool reserves, share supply and fee structure for V2 AMMs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct V2PoolState {
    pub reserve0: Decimal,
    pub reserve1: Decimal,
    pub total_supply: Decimal,
    pub fee_bps: u32, // Fee in basis points (30 = 0.3%)
}

impl V2PoolState {
    pub fn new(fee_bps: u32) -> Self {
        Self {
            fee_bps,
            ..Default::default()
        }
    }

    /// Reserves oriented as (reserve_in, reserve_out)
    pub fn oriented(&self, zero_for_one: bool) -> (Decimal, Decimal) {
        if zero_for_one {
            (self.reserve0, self.reserve1)
        } else {
            (self.reserve1, self.reserve0)
        }
    }
}

fn mul(a: Decimal, b: Decimal, context: &'static str) -> Result<Decimal, AmmError> {
    a.checked_mul(b).ok_or(AmmError::Overflow(context))
}

fn div(a: Decimal, b: Decimal, context: &'static str) -> Result<Decimal, AmmError> {
    a.checked_div(b).ok_or(AmmError::Overflow(context))
}

/// V2 AMM math functions
pub struct V2Math;

impl V2Math {
    /// Calculate exact output amount for Uniswap V2 using x*y=k formula
    ///
    /// # Arguments
    /// * `amount_in` - Input token amount
    /// * `reserve_in` - Input token reserve
    /// * `reserve_out` - Output token reserve
    /// * `fee_bps` - Fee in basis points (30 = 0.3%)
    pub fn calculate_output_amount(
        amount_in: Decimal,
        reserve_in: Decimal,
        reserve_out: Decimal,
        fee_bps: u32,
    ) -> Result<Decimal, AmmError> {
        if amount_in <= Decimal::ZERO {
            return Err(AmmError::InsufficientInputAmount);
        }
        if reserve_in <= Decimal::ZERO || reserve_out <= Decimal::ZERO {
            return Err(AmmError::InsufficientLiquidity);
        }

        // amount_in_after_fee = amount_in * (10000 - fee_bps) / 10000
        let fee_multiplier = Decimal::from(10000 - fee_bps) / dec!(10000);
        let amount_in_after_fee = mul(amount_in, fee_multiplier, "output amount")?;

        let numerator = mul(amount_in_after_fee, reserve_out, "output amount")?;
        let denominator = reserve_in
            .checked_add(amount_in_after_fee)
            .ok_or(AmmError::Overflow("output amount"))?;

        Ok(truncate(div(numerator, denominator, "output amount")?))
    }

    /// Calculate required input amount for desired output (reverse calculation)
    pub fn calculate_input_amount(
        amount_out: Decimal,
        reserve_in: Decimal,
        reserve_out: Decimal,
        fee_bps: u32,
    ) -> Result<Decimal, AmmError> {
        if amount_out <= Decimal::ZERO {
            return Err(AmmError::InsufficientOutputAmount);
        }
        if reserve_in <= Decimal::ZERO || amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity);
        }

        let numerator = mul(mul(reserve_in, amount_out, "input amount")?, dec!(10000), "input amount")?;
        let denominator = mul(
            reserve_out - amount_out,
            Decimal::from(10000 - fee_bps),
            "input amount",
        )?;

        // Add 1 wei to round up (ensures sufficient input)
        Ok(truncate(div(numerator, denominator, "input amount")?) + WEI)
    }

    /// Equivalent amount of the other asset at the current reserve ratio
    pub fn quote(
        amount_a: Decimal,
        reserve_a: Decimal,
        reserve_b: Decimal,
    ) -> Result<Decimal, AmmError> {
        if amount_a <= Decimal::ZERO {
            return Err(AmmError::InvalidAmount(format!(
                "quote amount must be positive, got {}",
                amount_a
            )));
        }
        if reserve_a <= Decimal::ZERO || reserve_b <= Decimal::ZERO {
            return Err(AmmError::InsufficientLiquidity);
        }
        Ok(truncate(div(mul(amount_a, reserve_b, "quote")?, reserve_a, "quote")?))
    }

    /// Liquidity shares minted for depositing `amount0` and `amount1`
    ///
    /// First deposit: `sqrt(amount0 * amount1) - MINIMUM_LIQUIDITY`.
    /// Later deposits: the smaller of the two pro-rata shares, so an unbalanced
    /// deposit donates its excess to the pool.
    pub fn liquidity_to_mint(
        amount0: Decimal,
        amount1: Decimal,
        state: &V2PoolState,
    ) -> Result<Decimal, AmmError> {
        if amount0 < Decimal::ZERO || amount1 < Decimal::ZERO {
            return Err(AmmError::InvalidAmount("deposit amounts must not be negative".into()));
        }

        let liquidity = if state.total_supply.is_zero() {
            let product = mul(amount0, amount1, "initial liquidity")?;
            truncate(Self::decimal_sqrt(product)?) - MINIMUM_LIQUIDITY
        } else {
            if state.reserve0 <= Decimal::ZERO || state.reserve1 <= Decimal::ZERO {
                return Err(AmmError::InsufficientLiquidity);
            }
            let share0 = div(mul(amount0, state.total_supply, "liquidity")?, state.reserve0, "liquidity")?;
            let share1 = div(mul(amount1, state.total_supply, "liquidity")?, state.reserve1, "liquidity")?;
            truncate(share0.min(share1))
        };

        if liquidity <= Decimal::ZERO {
            return Err(AmmError::InsufficientLiquidityMinted);
        }
        Ok(liquidity)
    }

    /// Amounts paid out for burning `liquidity` shares
    pub fn burn_amounts(
        liquidity: Decimal,
        state: &V2PoolState,
    ) -> Result<(Decimal, Decimal), AmmError> {
        if liquidity <= Decimal::ZERO || liquidity > state.total_supply {
            return Err(AmmError::InsufficientLiquidityBurned);
        }

        let amount0 = truncate(div(mul(liquidity, state.reserve0, "burn")?, state.total_supply, "burn")?);
        let amount1 = truncate(div(mul(liquidity, state.reserve1, "burn")?, state.total_supply, "burn")?);

        if amount0 <= Decimal::ZERO || amount1 <= Decimal::ZERO {
            return Err(AmmError::InsufficientLiquidityBurned);
        }
        Ok((amount0, amount1))
    }

    /// Calculate square root of a Decimal using Newton's method
    pub fn decimal_sqrt(value: Decimal) -> Result<Decimal, AmmError> {
        if value < Decimal::ZERO {
            return Err(AmmError::InvalidAmount(
                "cannot take square root of a negative amount".into(),
            ));
        }
        if value.is_zero() {
            return Ok(Decimal::ZERO);
        }

        // Start above the root so the sequence decreases monotonically
        let mut x = if value > Decimal::ONE { value } else { Decimal::ONE };
        let epsilon = dec!(0.0000000000000000000001);

        for _ in 0..200 {
            let next_x = (x + div(value, x, "sqrt")?) / dec!(2);

            if (next_x - x).abs() < epsilon {
                return Ok(next_x);
            }
            x = next_x;
        }

        // Return best approximation if not fully converged
        Ok(x)
    }
}
