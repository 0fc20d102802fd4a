//! Pricing Rules
//!
//! Tiered rates keyed by category, material, sides and area/quantity ranges. The table is ordered
//! and the first covering rule wins.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    request::Sides,
    tables::{RuleTableError, codes_match, parse_amount, parse_optional_amount, ranges::InclusiveRange},
};

/// Material code matching any material.
pub const WILDCARD_MATERIAL: &str = "*";

/// How a rule prices the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rate {
    /// Price per square foot of one piece.
    PerSqft(Decimal),

    /// Flat price per piece, independent of size.
    PerUnit(Decimal),
}

/// A single pricing tier.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingRule {
    /// Rule identifier, recorded in the audit trail.
    pub id: String,

    /// Category code.
    pub category: String,

    /// Material code, [`WILDCARD_MATERIAL`], or a generic material code.
    pub material: String,

    /// Required sides; `None` matches either.
    pub sides: Option<Sides>,

    /// Area range in square feet.
    pub sqft: InclusiveRange<Decimal>,

    /// Quantity range.
    pub qty: InclusiveRange<u32>,

    /// Rate charged.
    pub rate: Rate,

    /// Minimum charge for the product base price.
    pub min_charge: Option<Decimal>,

    /// Where the rate came from.
    pub notes: String,
}

impl PricingRule {
    /// Whether this rule's material matches any material.
    pub fn is_wildcard_material(&self) -> bool {
        self.material.trim() == WILDCARD_MATERIAL
            || self.material.to_ascii_uppercase().contains("GENERIC")
    }

    /// Whether the rule belongs to the category and accepts the material and sides.
    ///
    /// A request without a material accepts every rule in the category.
    pub fn applies_to(&self, category: &str, material: Option<&str>, sides: Sides) -> bool {
        codes_match(&self.category, category)
            && self.sides.is_none_or(|required| required == sides)
            && (self.is_wildcard_material()
                || material.is_none_or(|code| codes_match(&self.material, code)))
    }

    /// Whether the rule's ranges cover the area and quantity.
    ///
    /// Rules without an area range are quantity-only tiers. Per-unit ones among them price
    /// without dimensions; per-square-foot ones still need an area.
    pub fn covers(&self, sqft: Option<Decimal>, qty: u32) -> bool {
        if !self.qty.contains(qty) {
            return false;
        }

        if self.sqft.is_unbounded() {
            return matches!(self.rate, Rate::PerUnit(_)) || sqft.is_some();
        }

        sqft.is_some_and(|area| self.sqft.contains(area))
    }

    /// Whether this rule, placed before `later`, wins some request `later` would also match.
    ///
    /// A wildcard or generic rule shadows every material in its category. A specific rule placed
    /// before a wildcard one does not, since the wildcard still prices the other materials.
    pub fn shadows(&self, later: &Self) -> bool {
        let sides_compatible = match (self.sides, later.sides) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        };

        let material_compatible =
            self.is_wildcard_material() || codes_match(&self.material, &later.material);

        codes_match(&self.category, &later.category)
            && material_compatible
            && sides_compatible
            && self.sqft.overlaps(&later.sqft)
            && self.qty.overlaps(&later.qty)
    }
}

/// Wrapper for pricing rules in YAML
#[derive(Debug, Deserialize)]
pub struct PricingRulesFixture {
    /// Ordered list of rules
    pub rules: Vec<PricingRuleFixture>,
}

/// Pricing Rule Fixture
#[derive(Debug, Deserialize)]
pub struct PricingRuleFixture {
    /// Rule identifier
    pub id: String,

    /// Category code
    pub category: String,

    /// Material code; defaults to the wildcard
    #[serde(default)]
    pub material: Option<String>,

    /// Required sides (1 or 2)
    #[serde(default)]
    pub sides: Option<u8>,

    /// Minimum area, square feet (e.g. "6.00")
    #[serde(default)]
    pub sqft_min: Option<String>,

    /// Maximum area, square feet
    #[serde(default)]
    pub sqft_max: Option<String>,

    /// Minimum quantity
    #[serde(default)]
    pub qty_min: Option<u32>,

    /// Maximum quantity
    #[serde(default)]
    pub qty_max: Option<u32>,

    /// Price per square foot
    #[serde(default)]
    pub price_per_sqft: Option<String>,

    /// Price per unit
    #[serde(default)]
    pub price_per_unit: Option<String>,

    /// Minimum charge
    #[serde(default)]
    pub min_charge: Option<String>,

    /// Provenance
    #[serde(default)]
    pub notes: String,
}

impl TryFrom<PricingRuleFixture> for PricingRule {
    type Error = RuleTableError;

    fn try_from(fixture: PricingRuleFixture) -> Result<Self, Self::Error> {
        let rate = match (&fixture.price_per_sqft, &fixture.price_per_unit) {
            (Some(rate), None) => Rate::PerSqft(parse_amount(rate)?),
            (None, Some(rate)) => Rate::PerUnit(parse_amount(rate)?),
            _ => {
                return Err(RuleTableError::InvalidRule(format!(
                    "{}: exactly one of price_per_sqft or price_per_unit is required",
                    fixture.id
                )));
            }
        };

        let sides = fixture
            .sides
            .map(Sides::try_from)
            .transpose()
            .map_err(|sides| {
                RuleTableError::InvalidRule(format!("{}: unsupported sides {sides}", fixture.id))
            })?;

        Ok(PricingRule {
            category: fixture.category,
            material: fixture
                .material
                .unwrap_or_else(|| WILDCARD_MATERIAL.to_string()),
            sides,
            sqft: InclusiveRange::new(
                parse_optional_amount(fixture.sqft_min.as_deref())?,
                parse_optional_amount(fixture.sqft_max.as_deref())?,
            ),
            qty: InclusiveRange::new(fixture.qty_min, fixture.qty_max),
            rate,
            min_charge: parse_optional_amount(fixture.min_charge.as_deref())?,
            notes: fixture.notes,
            id: fixture.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, material: &str, sqft: (Option<i64>, Option<i64>), rate: Rate) -> PricingRule {
        PricingRule {
            id: id.to_string(),
            category: "SIGN".to_string(),
            material: material.to_string(),
            sides: Some(Sides::Single),
            sqft: InclusiveRange::new(sqft.0.map(Decimal::from), sqft.1.map(Decimal::from)),
            qty: InclusiveRange::unbounded(),
            rate,
            min_charge: None,
            notes: String::new(),
        }
    }

    fn fixture(price_per_sqft: Option<&str>, price_per_unit: Option<&str>) -> PricingRuleFixture {
        PricingRuleFixture {
            id: "R1".to_string(),
            category: "SIGN".to_string(),
            material: None,
            sides: None,
            sqft_min: None,
            sqft_max: None,
            qty_min: None,
            qty_max: None,
            price_per_sqft: price_per_sqft.map(str::to_string),
            price_per_unit: price_per_unit.map(str::to_string),
            min_charge: None,
            notes: String::new(),
        }
    }

    #[test]
    fn applies_to_checks_category_material_and_sides() {
        let rule = rule("R1", "COR4", (Some(0), Some(6)), Rate::PerSqft(Decimal::from(9)));

        assert!(rule.applies_to("sign", Some("cor4"), Sides::Single));
        assert!(rule.applies_to("SIGN", None, Sides::Single));
        assert!(!rule.applies_to("SIGN", Some("COR10"), Sides::Single));
        assert!(!rule.applies_to("SIGN", Some("COR4"), Sides::Double));
        assert!(!rule.applies_to("BANNER", Some("COR4"), Sides::Single));
    }

    #[test]
    fn wildcard_and_generic_materials_match_anything() {
        let wildcard = rule("R1", "*", (None, None), Rate::PerSqft(Decimal::ONE));
        let generic = rule("R2", "GENERIC_VINYL", (None, None), Rate::PerSqft(Decimal::ONE));

        assert!(wildcard.applies_to("SIGN", Some("ANYTHING"), Sides::Single));
        assert!(generic.applies_to("SIGN", Some("COR4"), Sides::Single));
    }

    #[test]
    fn covers_needs_area_inside_range() {
        let rule = rule("R1", "COR4", (Some(0), Some(6)), Rate::PerSqft(Decimal::from(9)));

        assert!(rule.covers(Some(Decimal::from(4)), 1));
        assert!(!rule.covers(Some(Decimal::from(7)), 1));
        assert!(!rule.covers(None, 1));
    }

    #[test]
    fn per_unit_rule_without_area_range_covers_by_quantity() {
        let mut rule = rule("R1", "*", (None, None), Rate::PerUnit(Decimal::new(250, 2)));
        rule.qty = InclusiveRange::new(Some(1), Some(49));

        assert!(rule.covers(None, 10));
        assert!(!rule.covers(None, 50));
    }

    #[test]
    fn per_sqft_rule_without_area_range_still_needs_area() {
        let rule = rule("R1", "*", (None, None), Rate::PerSqft(Decimal::from(10)));

        assert!(!rule.covers(None, 1));
        assert!(rule.covers(Some(Decimal::ONE), 1));
    }

    #[test]
    fn overlapping_ranges_are_detected() {
        let low = rule("R1", "COR4", (Some(0), Some(6)), Rate::PerSqft(Decimal::from(9)));
        let high = rule("R2", "COR4", (Some(6), None), Rate::PerSqft(Decimal::from(8)));
        let apart = rule("R3", "COR4", (Some(7), None), Rate::PerSqft(Decimal::from(8)));

        assert!(low.shadows(&high));
        assert!(!low.shadows(&apart));
    }

    #[test]
    fn wildcard_rule_shadows_later_specific_rules() {
        let specific = rule("R1", "COR4", (Some(0), Some(6)), Rate::PerSqft(Decimal::from(9)));
        let wildcard = rule("R2", "*", (None, None), Rate::PerSqft(Decimal::from(11)));
        let generic = rule("R3", "GENERIC_BOARD", (None, None), Rate::PerSqft(Decimal::from(11)));

        assert!(wildcard.shadows(&specific));
        assert!(generic.shadows(&specific));
        assert!(!specific.shadows(&wildcard));
    }

    #[test]
    fn fixture_requires_exactly_one_rate() {
        let both = PricingRule::try_from(fixture(Some("8.00"), Some("2.00")));
        let neither = PricingRule::try_from(fixture(None, None));

        assert!(matches!(both, Err(RuleTableError::InvalidRule(_))));
        assert!(matches!(neither, Err(RuleTableError::InvalidRule(_))));
    }

    #[test]
    fn fixture_defaults_material_to_wildcard() -> Result<(), RuleTableError> {
        let rule = PricingRule::try_from(fixture(Some("8.00"), None))?;

        assert_eq!(rule.material, WILDCARD_MATERIAL);
        assert_eq!(rule.rate, Rate::PerSqft(Decimal::new(800, 2)));
        assert!(rule.sqft.is_unbounded());

        Ok(())
    }
}
