//! Quantity Discount Ladder
//!
//! Percentage discounts by category and quantity range. Fixed-size lots never take these.

use decimal_percentage::Percentage;
use serde::Deserialize;

use crate::tables::{RuleTableError, codes_match, config::parse_percentage, ranges::InclusiveRange};

/// A single rung on the discount ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityDiscountTier {
    /// Tier identifier, recorded in the audit trail.
    pub id: String,

    /// Category code.
    pub category: String,

    /// Quantity range.
    pub qty: InclusiveRange<u32>,

    /// Discount taken off the base price.
    pub discount: Percentage,

    /// Ladder version.
    pub version: u32,
}

impl QuantityDiscountTier {
    /// Whether the tier covers the category and quantity.
    pub fn applies_to(&self, category: &str, qty: u32) -> bool {
        codes_match(&self.category, category) && self.qty.contains(qty)
    }
}

/// Wrapper for the discount ladder in YAML
#[derive(Debug, Deserialize)]
pub struct QuantityDiscountsFixture {
    /// Ordered tiers
    pub tiers: Vec<QuantityDiscountFixture>,
}

/// Quantity Discount Fixture
#[derive(Debug, Deserialize)]
pub struct QuantityDiscountFixture {
    /// Tier identifier
    pub id: String,

    /// Category code
    pub category: String,

    /// Minimum quantity
    #[serde(default)]
    pub qty_min: Option<u32>,

    /// Maximum quantity
    #[serde(default)]
    pub qty_max: Option<u32>,

    /// Discount (e.g. "10%" or "0.10")
    pub discount: String,

    /// Ladder version
    #[serde(default = "first_version")]
    pub version: u32,
}

const fn first_version() -> u32 {
    1
}

impl TryFrom<QuantityDiscountFixture> for QuantityDiscountTier {
    type Error = RuleTableError;

    fn try_from(fixture: QuantityDiscountFixture) -> Result<Self, Self::Error> {
        let discount = parse_percentage(&fixture.discount)
            .ok_or_else(|| RuleTableError::InvalidPercentage(fixture.discount.clone()))?;

        Ok(QuantityDiscountTier {
            id: fixture.id,
            category: fixture.category,
            qty: InclusiveRange::new(fixture.qty_min, fixture.qty_max),
            discount,
            version: fixture.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::money::fraction;

    fn fixture(discount: &str) -> QuantityDiscountFixture {
        QuantityDiscountFixture {
            id: "QD-SIGN-10".to_string(),
            category: "SIGN".to_string(),
            qty_min: Some(10),
            qty_max: Some(24),
            discount: discount.to_string(),
            version: 1,
        }
    }

    #[test]
    fn applies_within_quantity_range() -> Result<(), RuleTableError> {
        let tier = QuantityDiscountTier::try_from(fixture("10%"))?;

        assert!(tier.applies_to("sign", 10));
        assert!(tier.applies_to("SIGN", 24));
        assert!(!tier.applies_to("SIGN", 9));
        assert!(!tier.applies_to("BANNER", 10));
        assert_eq!(fraction(tier.discount), Decimal::new(10, 2));

        Ok(())
    }

    #[test]
    fn rejects_invalid_percentage() {
        let result = QuantityDiscountTier::try_from(fixture("ten percent"));

        assert!(matches!(result, Err(RuleTableError::InvalidPercentage(_))));
    }
}
