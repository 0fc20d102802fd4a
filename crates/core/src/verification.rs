//! Price Verification
//!
//! A caller-submitted price is never trusted. It's checked against a fresh estimate and replaced
//! when it drifts further than the configured tolerance.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tracing::warn;

use crate::{
    estimate::estimate,
    money::from_cents,
    request::EstimateRequest,
    tables::{
        RuleTables,
        config::{ConfigError, keys},
    },
};

/// Outcome of checking a submitted price.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceCheck {
    /// The submitted price is within tolerance of the server price.
    Accepted {
        /// Server-computed pre-tax price
        price: Money<'static, Currency>,
    },

    /// The submitted price was off; the server price replaces it.
    Corrected {
        /// Price the caller sent
        submitted: Money<'static, Currency>,

        /// Server-computed pre-tax price
        price: Money<'static, Currency>,
    },

    /// The request can't be priced at all.
    Unpriceable {
        /// Why the estimate was blocked
        reason: String,
    },
}

impl PriceCheck {
    /// The price to charge, if any.
    pub fn price(&self) -> Option<Money<'static, Currency>> {
        match self {
            PriceCheck::Accepted { price } | PriceCheck::Corrected { price, .. } => Some(*price),
            PriceCheck::Unpriceable { .. } => None,
        }
    }
}

/// Re-estimate a request and compare the result with a submitted pre-tax price.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the estimate fails or `price_tolerance` is missing.
pub fn verify_submitted_price(
    tables: &RuleTables,
    request: &EstimateRequest,
    submitted: Money<'static, Currency>,
) -> Result<PriceCheck, ConfigError> {
    let response = estimate(tables, request)?;

    let Some(price) = response.sell_price() else {
        return Ok(PriceCheck::Unpriceable {
            reason: response
                .blocked_reason()
                .unwrap_or("not priced")
                .to_string(),
        });
    };

    let tolerance = tables.config().decimal(keys::PRICE_TOLERANCE)?.abs();

    if within_tolerance(submitted, price, tolerance) {
        return Ok(PriceCheck::Accepted { price });
    }

    warn!(submitted = %submitted, price = %price, "submitted price corrected");

    Ok(PriceCheck::Corrected { submitted, price })
}

/// Whether two amounts agree within a tolerance.
pub fn within_tolerance(
    a: Money<'static, Currency>,
    b: Money<'static, Currency>,
    tolerance: Decimal,
) -> bool {
    a.currency() == b.currency()
        && (from_cents(a.to_minor_units()) - from_cents(b.to_minor_units())).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{CAD, USD};
    use testresult::TestResult;

    use super::*;

    fn sign() -> EstimateRequest {
        EstimateRequest::new("SIGN")
            .material("COR4")
            .size(Decimal::from(24), Decimal::from(24))
    }

    #[test]
    fn matching_price_is_accepted() -> TestResult {
        let tables = RuleTables::from_set("default")?;

        let check = verify_submitted_price(&tables, &sign(), Money::from_minor(3601, CAD))?;

        assert_eq!(
            check,
            PriceCheck::Accepted {
                price: Money::from_minor(3600, CAD)
            }
        );

        Ok(())
    }

    #[test]
    fn drifted_price_is_corrected() -> TestResult {
        let tables = RuleTables::from_set("default")?;

        let check = verify_submitted_price(&tables, &sign(), Money::from_minor(3000, CAD))?;

        assert_eq!(check.price(), Some(Money::from_minor(3600, CAD)));
        assert!(matches!(check, PriceCheck::Corrected { .. }));

        Ok(())
    }

    #[test]
    fn blocked_request_is_unpriceable() -> TestResult {
        let tables = RuleTables::from_set("default")?;

        let check = verify_submitted_price(
            &tables,
            &EstimateRequest::default(),
            Money::from_minor(1000, CAD),
        )?;

        assert_eq!(check.price(), None);
        assert!(matches!(check, PriceCheck::Unpriceable { .. }));

        Ok(())
    }

    #[test]
    fn tolerance_requires_same_currency() {
        let tolerance = Decimal::new(1, 2);

        assert!(within_tolerance(Money::from_minor(100, CAD), Money::from_minor(101, CAD), tolerance));
        assert!(!within_tolerance(Money::from_minor(100, CAD), Money::from_minor(102, CAD), tolerance));
        assert!(!within_tolerance(Money::from_minor(100, CAD), Money::from_minor(100, USD), tolerance));
    }
}
