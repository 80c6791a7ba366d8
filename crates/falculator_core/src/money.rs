//! Fixed-point money arithmetic.
//!
//! All monetary values are `rust_decimal::Decimal` (96-bit mantissa, 28-29
//! significant digits): addition and subtraction are exact, which the
//! cash-flow conservation guarantees depend on. The only non-trivial
//! operation is the compounding exponent; `powd` is a pure-integer
//! implementation, so results are identical across platforms. Where explicit
//! rounding is needed the strategy is banker's (`MidpointNearestEven`).

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

pub const HUNDRED: Decimal = dec!(100);
pub const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Convert a human percentage (4.5 means 4.5%) to a rate (0.045).
#[inline]
pub fn rate_from_percent(percent: Decimal) -> Decimal {
    percent / HUNDRED
}

/// Growth fraction for `n` compounding applications of a per-period
/// percentage: `(1 + pct/100)^n − 1`.
pub fn compound_growth(percent: Decimal, n: u32) -> Decimal {
    (Decimal::ONE + rate_from_percent(percent)).powu(n as u64) - Decimal::ONE
}

/// Growth fraction for `n` monthly applications of an *annual* percentage
/// rate compounded monthly: `(1 + pct/100)^(n/12) − 1`.
///
/// The fractional exponent goes through `powd`, which is deterministic and
/// stable well past the 12 significant digits the interest contracts
/// require.
pub fn annual_rate_monthly_growth(percent: Decimal, n: u32) -> Decimal {
    let exponent = Decimal::from(n) / MONTHS_PER_YEAR;
    (Decimal::ONE + rate_from_percent(percent)).powd(exponent) - Decimal::ONE
}

/// Round to whole cents, banker's rounding.
#[inline]
pub fn to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}
