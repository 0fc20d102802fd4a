//! Money
//!
//! All arithmetic is done in [`Decimal`] and converted to whole cents at the edges, so every amount
//! handed back to callers is an exact [`Money`] value.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};

/// Round a decimal amount up to the next whole cent.
///
/// Returns `None` if the amount cannot be represented in minor units.
pub fn ceil_cents(amount: Decimal) -> Option<i64> {
    amount.checked_mul(Decimal::ONE_HUNDRED)?.ceil().to_i64()
}

/// Round a decimal amount to the nearest cent, midpoints away from zero.
///
/// Returns `None` if the amount cannot be represented in minor units.
pub fn round_cents(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Round to two decimal places, midpoints away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert minor units back into a decimal amount.
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Build a [`Money`] value from minor units.
pub fn money(cents: i64, currency: &'static Currency) -> Money<'static, Currency> {
    Money::from_minor(cents, currency)
}

/// The fractional value of a percentage (`0.25` for 25%).
pub fn fraction(percentage: Percentage) -> Decimal {
    // decimal_percentage doesn't expose the underlying Decimal
    percentage * Decimal::ONE
}

/// Parse a plain decimal amount such as `"12.50"`.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    s.trim().parse::<Decimal>().ok()
}
