//! Fixed-Size Catalog
//!
//! Preset width x height x sides x quantity lots sold at a flat, negotiated price.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    request::Sides,
    tables::{RuleTableError, codes_match, parse_amount},
};

/// How far, in inches, a requested dimension may differ from a catalog preset.
pub const SIZE_TOLERANCE_IN: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// A catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSizeProduct {
    /// Catalog identifier.
    pub id: String,

    /// Category code.
    pub category: String,

    /// Material code.
    pub material: String,

    /// Width in inches.
    pub width_in: Decimal,

    /// Height in inches.
    pub height_in: Decimal,

    /// Printed sides.
    pub sides: Sides,

    /// Lot quantity.
    pub qty: u32,

    /// Flat price for the whole lot.
    pub price: Decimal,

    /// Inactive entries never match.
    pub active: bool,
}

impl FixedSizeProduct {
    /// Whether this entry matches a request exactly (dimensions within tolerance).
    ///
    /// The material is only compared when the request names one.
    pub fn matches(
        &self,
        category: &str,
        material: Option<&str>,
        sides: Sides,
        qty: u32,
        width_in: Decimal,
        height_in: Decimal,
    ) -> bool {
        self.active
            && codes_match(&self.category, category)
            && material.is_none_or(|code| codes_match(&self.material, code))
            && self.sides == sides
            && self.qty == qty
            && (self.width_in - width_in).abs() <= SIZE_TOLERANCE_IN
            && (self.height_in - height_in).abs() <= SIZE_TOLERANCE_IN
    }
}

/// Wrapper for the fixed-size catalog in YAML
#[derive(Debug, Deserialize)]
pub struct FixedSizesFixture {
    /// Ordered catalog entries
    pub products: Vec<FixedSizeFixture>,
}

/// Fixed-Size Product Fixture
#[derive(Debug, Deserialize)]
pub struct FixedSizeFixture {
    /// Catalog identifier
    pub id: String,

    /// Category code
    pub category: String,

    /// Material code
    pub material: String,

    /// Width in inches (e.g. "48")
    pub width_in: String,

    /// Height in inches
    pub height_in: String,

    /// Printed sides (1 or 2)
    pub sides: u8,

    /// Lot quantity
    pub qty: u32,

    /// Lot price (e.g. "179.00")
    pub price: String,

    /// Whether the entry is sold
    #[serde(default = "active_by_default")]
    pub active: bool,
}

const fn active_by_default() -> bool {
    true
}

impl TryFrom<FixedSizeFixture> for FixedSizeProduct {
    type Error = RuleTableError;

    fn try_from(fixture: FixedSizeFixture) -> Result<Self, Self::Error> {
        let sides = Sides::try_from(fixture.sides).map_err(|sides| {
            RuleTableError::InvalidRule(format!("{}: unsupported sides {sides}", fixture.id))
        })?;

        Ok(FixedSizeProduct {
            width_in: parse_amount(&fixture.width_in)?,
            height_in: parse_amount(&fixture.height_in)?,
            price: parse_amount(&fixture.price)?,
            category: fixture.category,
            material: fixture.material,
            sides,
            qty: fixture.qty,
            active: fixture.active,
            id: fixture.id,
        })
    }
}
