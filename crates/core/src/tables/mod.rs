//! Rule Tables
//!
//! The read-only store the resolver prices against. Tables are loaded once from YAML fixture sets
//! (`<base>/<table>/<name>.yml`) and never mutated afterwards; pass the store by reference to
//! [`estimate`](crate::estimate::estimate). To pick up edited tables, build a new store.

use std::{fs, path::PathBuf};

use rust_decimal::Decimal;
use rusty_money::iso::{CAD, Currency, EUR, GBP, USD};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    money::parse_decimal,
    request::{AddOn, Sides},
    tables::{
        config::{Config, ConfigFixture},
        fixed_sizes::{FixedSizeProduct, FixedSizesFixture},
        materials::{Material, MaterialsFixture},
        pricing_rules::{PricingRule, PricingRulesFixture},
        qty_discounts::{QuantityDiscountTier, QuantityDiscountsFixture},
        services::{Service, ServicesFixture},
    },
};

pub mod config;
pub mod fixed_sizes;
pub mod materials;
pub mod pricing_rules;
pub mod qty_discounts;
pub mod ranges;
pub mod services;

/// Rule table loading errors
#[derive(Debug, Error)]
pub enum RuleTableError {
    /// IO error reading a table file
    #[error("Failed to read table file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid amount format
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A row that can't be used as written
    #[error("Invalid rule: {0}")]
    InvalidRule(String),
}

/// Two pricing rules whose ranges both cover some request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOverlap {
    /// Rule that wins, being earlier in the table.
    pub first: String,

    /// Rule that can never be reached for the shared range.
    pub second: String,
}

/// The rule table store.
#[derive(Debug)]
pub struct RuleTables {
    /// Base path for table files
    base_path: PathBuf,

    pricing_rules: Vec<PricingRule>,
    fixed_sizes: Vec<FixedSizeProduct>,
    materials: Vec<Material>,
    services: Vec<Service>,
    qty_discounts: Vec<QuantityDiscountTier>,
    config: Config,

    /// Overlapping pricing rules found at load time
    overlaps: Vec<RuleOverlap>,
}

impl Default for RuleTables {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleTables {
    /// Create an empty store with the default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create an empty store reading from a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            pricing_rules: Vec::new(),
            fixed_sizes: Vec::new(),
            materials: Vec::new(),
            services: Vec::new(),
            qty_discounts: Vec::new(),
            config: Config::default(),
            overlaps: Vec::new(),
        }
    }

    /// Load a complete table set (every table with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the table files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, RuleTableError> {
        Self::from_set_at("./fixtures", name)
    }

    /// Load a complete table set from a custom base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the table files cannot be loaded.
    pub fn from_set_at(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, RuleTableError> {
        let mut tables = Self::with_base_path(base_path);

        tables
            .load_config(name)?
            .load_pricing_rules(name)?
            .load_fixed_sizes(name)?
            .load_materials(name)?
            .load_services(name)?
            .load_qty_discounts(name)?;

        Ok(tables)
    }

    /// Append pricing rules from a YAML file, in file order
    ///
    /// Overlapping rules are logged and recorded in [`RuleTables::overlaps`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a rule is invalid.
    pub fn load_pricing_rules(&mut self, name: &str) -> Result<&mut Self, RuleTableError> {
        let fixture: PricingRulesFixture = self.read("pricing_rules", name)?;

        for rule in fixture.rules {
            self.pricing_rules.push(rule.try_into()?);
        }

        self.overlaps = find_overlaps(&self.pricing_rules);

        for overlap in &self.overlaps {
            warn!(
                first = %overlap.first,
                second = %overlap.second,
                "overlapping pricing rules; the first one wins"
            );
        }

        Ok(self)
    }

    /// Append fixed-size catalog entries from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or an entry is invalid.
    pub fn load_fixed_sizes(&mut self, name: &str) -> Result<&mut Self, RuleTableError> {
        let fixture: FixedSizesFixture = self.read("fixed_sizes", name)?;

        for product in fixture.products {
            self.fixed_sizes.push(product.try_into()?);
        }

        Ok(self)
    }

    /// Append materials from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a record is invalid.
    pub fn load_materials(&mut self, name: &str) -> Result<&mut Self, RuleTableError> {
        let fixture: MaterialsFixture = self.read("materials", name)?;

        for material in fixture.materials {
            self.materials.push(material.try_into()?);
        }

        Ok(self)
    }

    /// Append services from a YAML file
    ///
    /// Rows for add-ons this build doesn't know are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a record is invalid.
    pub fn load_services(&mut self, name: &str) -> Result<&mut Self, RuleTableError> {
        let fixture: ServicesFixture = self.read("services", name)?;

        for service in fixture.services {
            if AddOn::from_flag(&service.addon).is_none() {
                warn!(
                    id = %service.id,
                    addon = %service.addon,
                    "skipping service for unknown add-on"
                );

                continue;
            }

            self.services.push(service.try_into()?);
        }

        Ok(self)
    }

    /// Append quantity discount tiers from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a tier is invalid.
    pub fn load_qty_discounts(&mut self, name: &str) -> Result<&mut Self, RuleTableError> {
        let fixture: QuantityDiscountsFixture = self.read("qty_discounts", name)?;

        for tier in fixture.tiers {
            self.qty_discounts.push(tier.try_into()?);
        }

        Ok(self)
    }

    /// Load the config table from a YAML file, replacing any config loaded before
    ///
    /// Values are only checked when looked up, so a bad value surfaces as a
    /// [`ConfigError`](config::ConfigError) at estimate time.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the currency is unknown.
    pub fn load_config(&mut self, name: &str) -> Result<&mut Self, RuleTableError> {
        let fixture: ConfigFixture = self.read("config", name)?;
        let currency = parse_currency(&fixture.currency)?;

        self.config = Config::from_pairs(currency, fixture.values);

        Ok(self)
    }

    /// Replace the config table
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    fn read<T: DeserializeOwned>(&self, table: &str, name: &str) -> Result<T, RuleTableError> {
        let file_path = self.base_path.join(table).join(format!("{name}.yml"));

        debug!(path = %file_path.display(), "loading rule table");

        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    /// Pricing rules, in table order
    pub fn pricing_rules(&self) -> &[PricingRule] {
        &self.pricing_rules
    }

    /// Fixed-size catalog, in table order
    pub fn fixed_sizes(&self) -> &[FixedSizeProduct] {
        &self.fixed_sizes
    }

    /// Materials, in table order
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Services, in table order
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Quantity discount ladder, in table order
    pub fn qty_discounts(&self) -> &[QuantityDiscountTier] {
        &self.qty_discounts
    }

    /// Config table
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Currency for every amount in the tables
    pub fn currency(&self) -> &'static Currency {
        self.config.currency()
    }

    /// Overlapping pricing rules found at load time
    pub fn overlaps(&self) -> &[RuleOverlap] {
        &self.overlaps
    }

    /// First pricing rule for the category, material and sides that covers the area and quantity
    pub fn find_pricing_rule(
        &self,
        category: &str,
        material: Option<&str>,
        sides: Sides,
        sqft: Option<Decimal>,
        qty: u32,
    ) -> Option<&PricingRule> {
        self.pricing_rules
            .iter()
            .filter(|rule| rule.applies_to(category, material, sides))
            .find(|rule| rule.covers(sqft, qty))
    }

    /// First minimum charge among the pricing rules for the category, material and sides
    pub fn category_minimum(
        &self,
        category: &str,
        material: Option<&str>,
        sides: Sides,
    ) -> Option<Decimal> {
        self.pricing_rules
            .iter()
            .filter(|rule| rule.applies_to(category, material, sides))
            .find_map(|rule| rule.min_charge)
    }

    /// First active fixed-size entry matching the request exactly
    pub fn find_fixed_size(
        &self,
        category: &str,
        material: Option<&str>,
        sides: Sides,
        qty: u32,
        (width_in, height_in): (Decimal, Decimal),
    ) -> Option<&FixedSizeProduct> {
        self.fixed_sizes
            .iter()
            .find(|product| product.matches(category, material, sides, qty, width_in, height_in))
    }

    /// Resolve a material by code, or by category when no code is given
    ///
    /// Without a code, the first material filed under the category wins, then the first whose
    /// code or name mentions the category.
    pub fn find_material(&self, code: Option<&str>, category: &str) -> Option<&Material> {
        if let Some(code) = code {
            return self
                .materials
                .iter()
                .find(|material| codes_match(&material.code, code));
        }

        let keyword = category.trim().to_ascii_uppercase();

        self.materials
            .iter()
            .find(|material| codes_match(&material.category, category))
            .or_else(|| {
                self.materials.iter().find(|material| {
                    material.code.to_ascii_uppercase().contains(&keyword)
                        || material.name.to_ascii_uppercase().contains(&keyword)
                })
            })
    }

    /// Service that prices an add-on
    pub fn find_service(&self, addon: AddOn) -> Option<&Service> {
        self.services.iter().find(|service| service.addon == addon)
    }

    /// First discount tier covering the category and quantity
    pub fn find_qty_discount(&self, category: &str, qty: u32) -> Option<&QuantityDiscountTier> {
        self.qty_discounts
            .iter()
            .find(|tier| tier.applies_to(category, qty))
    }
}

/// Every pair of rules where the later one is shadowed by the earlier one.
fn find_overlaps(rules: &[PricingRule]) -> Vec<RuleOverlap> {
    let mut overlaps = Vec::new();

    for (idx, first) in rules.iter().enumerate() {
        for second in rules.iter().skip(idx + 1) {
            if first.shadows(second) {
                overlaps.push(RuleOverlap {
                    first: first.id.clone(),
                    second: second.id.clone(),
                });
            }
        }
    }

    overlaps
}

/// Case-insensitive code comparison.
pub(crate) fn codes_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Parse a decimal amount from a table cell.
pub(crate) fn parse_amount(s: &str) -> Result<Decimal, RuleTableError> {
    parse_decimal(s).ok_or_else(|| RuleTableError::InvalidAmount(s.to_string()))
}

/// Parse an optional decimal amount; blank cells are `None`.
pub(crate) fn parse_optional_amount(s: Option<&str>) -> Result<Option<Decimal>, RuleTableError> {
    s.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(parse_amount)
        .transpose()
}

/// Parse an ISO currency code.
///
/// # Errors
///
/// Returns [`RuleTableError::UnknownCurrency`] for codes other than CAD, USD, GBP and EUR.
pub fn parse_currency(code: &str) -> Result<&'static Currency, RuleTableError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "CAD" => Ok(CAD),
        "USD" => Ok(USD),
        "GBP" => Ok(GBP),
        "EUR" => Ok(EUR),
        other => Err(RuleTableError::UnknownCurrency(other.to_string())),
    }
}
