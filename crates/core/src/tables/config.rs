//! Config Table
//!
//! Scalar business constants. Every lookup fails loudly: a missing or non-numeric key is an
//! error, never a silent default.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::iso::{CAD, Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::money::{parse_decimal, round_cents};

/// Well-known config keys.
pub mod keys {
    /// Sales tax (GST) rate, e.g. `0.05` or `5%`.
    pub const TAX_RATE: &str = "tax_rate";
    /// Flat rush production fee.
    pub const RUSH_FEE: &str = "rush_fee";
    /// Design fee for minor artwork edits.
    pub const DESIGN_FEE_MINOR_EDIT: &str = "design_fee_minor_edit";
    /// Design fee for a full design.
    pub const DESIGN_FEE_FULL_DESIGN: &str = "design_fee_full_design";
    /// Design fee for recreating a logo.
    pub const DESIGN_FEE_LOGO_RECREATION: &str = "design_fee_logo_recreation";
    /// Feet between grommets along the perimeter.
    pub const GROMMET_SPACING_FT: &str = "grommet_spacing_ft";
    /// Minimum grommet count for any banner.
    pub const GROMMET_MIN_COUNT: &str = "grommet_min_count";
    /// Per-square-foot rate used when no pricing rule matches.
    pub const FALLBACK_RATE_PER_SQFT: &str = "fallback_rate_per_sqft";
    /// Minimum charge used alongside the fallback rate.
    pub const FALLBACK_MIN_CHARGE: &str = "fallback_min_charge";
    /// Margin below which a quote needs sign-off.
    pub const MARGIN_FLOOR_PCT: &str = "margin_floor_pct";
    /// Target margin.
    pub const MARGIN_TARGET_PCT: &str = "margin_target_pct";
    /// Ink cost per printed sheet face (sheet-fed work).
    pub const INK_COST_PER_SHEET: &str = "ink_cost_per_sheet";
    /// Ink cost per printed square foot (wide format).
    pub const INK_COST_PER_SQFT: &str = "ink_cost_per_sqft";
    /// Operator minutes allocated per job.
    pub const LABOR_MINUTES_PER_JOB: &str = "labor_minutes_per_job";
    /// Operator hourly rate.
    pub const LABOR_HOURLY_RATE: &str = "labor_hourly_rate";
    /// Flat overhead per job.
    pub const OVERHEAD_PER_JOB: &str = "overhead_per_job";
    /// Hardware cost of one H-stake.
    pub const H_STAKE_COST: &str = "h_stake_cost";
    /// Allowed difference between a submitted price and the server price.
    pub const PRICE_TOLERANCE: &str = "price_tolerance";
}

/// Config lookup errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required key is not present.
    #[error("missing required config key `{0}`")]
    Missing(String),

    /// Key is present but its value isn't usable as a number.
    #[error("config key `{key}` is not numeric: {value:?}")]
    NotNumeric {
        /// Config key
        key: String,
        /// Raw value found
        value: String,
    },
}

/// Wrapper for the config table in YAML
#[derive(Debug, Deserialize)]
pub struct ConfigFixture {
    /// ISO currency code for every amount in the tables
    pub currency: String,

    /// Map of key -> numeric string
    #[serde(default)]
    pub values: FxHashMap<String, String>,
}

/// Business constants, keyed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    values: FxHashMap<String, String>,
    currency: &'static Currency,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(CAD)
    }
}

impl Config {
    /// Create an empty config for the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            values: FxHashMap::default(),
            currency,
        }
    }

    /// Create a config from key/value pairs.
    pub fn from_pairs<K, V>(
        currency: &'static Currency,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            currency,
        }
    }

    /// Currency for every amount in the tables.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Raw value for a key.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Decimal value for a key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] or [`ConfigError::NotNumeric`].
    pub fn decimal(&self, key: &str) -> Result<Decimal, ConfigError> {
        let value = self.require(key)?;

        parse_decimal(value).ok_or_else(|| not_numeric(key, value))
    }

    /// Amount in minor units for a key, rounded to the nearest cent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] or [`ConfigError::NotNumeric`].
    pub fn cents(&self, key: &str) -> Result<i64, ConfigError> {
        let amount = self.decimal(key)?;

        round_cents(amount).ok_or_else(|| not_numeric(key, self.raw(key).unwrap_or_default()))
    }

    /// Percentage for a key, written either as a fraction (`0.05`) or with a suffix (`5%`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] or [`ConfigError::NotNumeric`].
    pub fn percentage(&self, key: &str) -> Result<Percentage, ConfigError> {
        let value = self.require(key)?;

        parse_percentage(value).ok_or_else(|| not_numeric(key, value))
    }

    /// Non-negative whole number for a key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] or [`ConfigError::NotNumeric`].
    pub fn count(&self, key: &str) -> Result<u32, ConfigError> {
        let value = self.require(key)?;

        parse_decimal(value)
            .filter(|number| number.fract().is_zero())
            .and_then(|number| number.to_u32())
            .ok_or_else(|| not_numeric(key, value))
    }

    fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.raw(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }
}

fn not_numeric(key: &str, value: &str) -> ConfigError {
    ConfigError::NotNumeric {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Parse a percentage written as a fraction (`"0.15"`) or with a suffix (`"15%"`).
pub fn parse_percentage(s: &str) -> Option<Percentage> {
    let trimmed = s.trim();

    let fraction = if let Some(points) = trimmed.strip_suffix('%') {
        parse_decimal(points)?.checked_div(Decimal::ONE_HUNDRED)?
    } else {
        parse_decimal(trimmed)?
    };

    Some(Percentage::from(fraction))
}
