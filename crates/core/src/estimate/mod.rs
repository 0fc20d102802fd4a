//! Estimates
//!
//! The resolver. [`estimate`] turns one [`EstimateRequest`] into an [`EstimateResponse`] against a
//! loaded [`RuleTables`] store, in a fixed order:
//!
//! 1. validate the request and work out the area of one piece
//! 2. price the product from the fixed-size catalog, a pricing rule tier, or the fallback rate
//! 3. add add-ons, apply the minimum charge, then design and rush fees
//! 4. total, tax, project costs and name the line
//!
//! A request the engine can't price comes back [`EstimateStatus::Blocked`] with a reason. The only
//! error returned is a [`ConfigError`], which means the rule data itself is broken.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tracing::{debug, warn};

use crate::{
    cost::{CostBreakdown, CostInput, project_cost},
    labels,
    money::{ceil_cents, fraction, from_cents, money, round2, round_cents},
    request::{DesignStatus, EstimateRequest},
    tables::{
        RuleTables,
        config::{Config, ConfigError, keys},
        pricing_rules::Rate,
    },
};

pub mod addons;

/// Tier recorded for catalog matches.
pub const FIXED_SIZE_TIER: &str = "fixed-size";

/// Tier recorded when no pricing rule matched.
pub const FALLBACK_TIER: &str = "fallback";

/// Rule id recorded for fallback pricing.
pub const FALLBACK_RULE_ID: &str = "FALLBACK";

/// Rule id recorded when the minimum charge lifts the base price.
pub const MIN_CHARGE_RULE_ID: &str = "MIN_CHARGE";

/// Rule id recorded for the rush fee.
pub const RUSH_RULE_ID: &str = "RUSH";

/// Margin thresholds used when the config can't supply them.
const DEFAULT_MARGIN_FLOOR: Decimal = Decimal::from_parts(35, 0, 0, false, 2);
const DEFAULT_MARGIN_TARGET: Decimal = Decimal::from_parts(50, 0, 0, false, 2);

/// Outcome of an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateStatus {
    /// Fully priced.
    Quoted,

    /// Priced, with notes a person should look at before the quote goes out.
    NeedsClarification,

    /// Not priced; see [`EstimateResponse::blocked_reason`].
    Blocked,
}

/// A priced line on the quote.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    description: String,
    qty: u32,
    unit_price: Money<'static, Currency>,
    line_total: Money<'static, Currency>,
    rule_id: String,
}

impl LineItem {
    /// Display description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Quantity.
    pub fn qty(&self) -> u32 {
        self.qty
    }

    /// Price per unit.
    pub fn unit_price(&self) -> Money<'static, Currency> {
        self.unit_price
    }

    /// Total for the line.
    pub fn line_total(&self) -> Money<'static, Currency> {
        self.line_total
    }

    /// Rule, catalog entry or service that produced the line.
    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }
}

/// Margin thresholds passed through for whoever reviews the quote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginThresholds {
    /// Margin below which the quote needs sign-off.
    pub floor: Percentage,

    /// Margin the shop aims for.
    pub target: Percentage,
}

impl MarginThresholds {
    fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            floor: config.percentage(keys::MARGIN_FLOOR_PCT)?,
            target: config.percentage(keys::MARGIN_TARGET_PCT)?,
        })
    }

    fn or_default(config: &Config) -> Self {
        Self {
            floor: config
                .percentage(keys::MARGIN_FLOOR_PCT)
                .unwrap_or_else(|_| Percentage::from(DEFAULT_MARGIN_FLOOR)),
            target: config
                .percentage(keys::MARGIN_TARGET_PCT)
                .unwrap_or_else(|_| Percentage::from(DEFAULT_MARGIN_TARGET)),
        }
    }
}

/// The result of one estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateResponse {
    status: EstimateStatus,
    sell_price: Option<Money<'static, Currency>>,
    gst: Option<Money<'static, Currency>>,
    line_items: Vec<LineItem>,
    sqft: Option<Decimal>,
    tier_applied: Option<String>,
    min_charge_applied: bool,
    min_charge_value: Option<Money<'static, Currency>>,
    qty_discount_applied: bool,
    qty_discount_pct: Option<Percentage>,
    rules_fired: Vec<String>,
    cost: Option<CostBreakdown>,
    margin: Option<Percentage>,
    line_name: Option<String>,
    clarifications: Vec<String>,
    blocked_reason: Option<String>,
    margin_thresholds: MarginThresholds,
}

impl EstimateResponse {
    fn blocked(reason: String, margin_thresholds: MarginThresholds) -> Self {
        Self {
            status: EstimateStatus::Blocked,
            sell_price: None,
            gst: None,
            line_items: Vec::new(),
            sqft: None,
            tier_applied: None,
            min_charge_applied: false,
            min_charge_value: None,
            qty_discount_applied: false,
            qty_discount_pct: None,
            rules_fired: Vec::new(),
            cost: None,
            margin: None,
            line_name: None,
            clarifications: Vec::new(),
            blocked_reason: Some(reason),
            margin_thresholds,
        }
    }

    /// Outcome.
    pub fn status(&self) -> EstimateStatus {
        self.status
    }

    /// Pre-tax sell price; `None` when blocked.
    pub fn sell_price(&self) -> Option<Money<'static, Currency>> {
        self.sell_price
    }

    /// Sales tax on the sell price.
    pub fn gst(&self) -> Option<Money<'static, Currency>> {
        self.gst
    }

    /// Sell price plus tax, for display.
    pub fn total_with_tax(&self) -> Option<Money<'static, Currency>> {
        let price = self.sell_price?;
        let tax = self.gst?;
        let total = price.to_minor_units().checked_add(tax.to_minor_units())?;

        Some(money(total, price.currency()))
    }

    /// Priced lines, base product first.
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// Area of one piece in square feet, when dimensions were given.
    pub fn sqft(&self) -> Option<Decimal> {
        self.sqft
    }

    /// Pricing tier: a rule id, [`FIXED_SIZE_TIER`] or [`FALLBACK_TIER`].
    pub fn tier_applied(&self) -> Option<&str> {
        self.tier_applied.as_deref()
    }

    /// Whether the minimum charge lifted the base price.
    pub fn min_charge_applied(&self) -> bool {
        self.min_charge_applied
    }

    /// The minimum charged, when applied.
    pub fn min_charge_value(&self) -> Option<Money<'static, Currency>> {
        self.min_charge_value
    }

    /// Whether a quantity discount was taken off the base price.
    pub fn qty_discount_applied(&self) -> bool {
        self.qty_discount_applied
    }

    /// The quantity discount, when applied.
    pub fn qty_discount_pct(&self) -> Option<Percentage> {
        self.qty_discount_pct
    }

    /// Rules, catalog entries and services used, in the order they fired.
    pub fn rules_fired(&self) -> &[String] {
        &self.rules_fired
    }

    /// Internal cost breakdown. `None` when there was no cost basis.
    pub fn cost(&self) -> Option<&CostBreakdown> {
        self.cost.as_ref()
    }

    /// Gross margin; `None` when costs are partial or missing.
    pub fn margin(&self) -> Option<Percentage> {
        self.margin
    }

    /// Accounting line name.
    pub fn line_name(&self) -> Option<&str> {
        self.line_name.as_deref()
    }

    /// Notes that need a human.
    pub fn clarifications(&self) -> &[String] {
        &self.clarifications
    }

    /// Why the request couldn't be priced.
    pub fn blocked_reason(&self) -> Option<&str> {
        self.blocked_reason.as_deref()
    }

    /// Margin floor and target.
    pub fn margin_thresholds(&self) -> MarginThresholds {
        self.margin_thresholds
    }
}

/// Why resolution stopped early.
#[derive(Debug)]
pub(crate) enum Halt {
    /// The request can't be priced.
    Blocked(String),

    /// The rule data is broken.
    Config(ConfigError),
}

impl From<ConfigError> for Halt {
    fn from(error: ConfigError) -> Self {
        Halt::Config(error)
    }
}

/// Unwrap a checked amount, blocking the request when it overflowed.
pub(crate) fn in_range<T>(value: Option<T>) -> Result<T, Halt> {
    value.ok_or_else(|| Halt::Blocked("Amounts are out of range".to_string()))
}

/// Lines, audit trail and notes accumulated during one resolution.
#[derive(Debug, Default)]
pub(crate) struct Worksheet {
    line_items: Vec<LineItem>,
    rules_fired: Vec<String>,
    clarifications: Vec<String>,
}

impl Worksheet {
    pub(crate) fn push(&mut self, line: LineItem) {
        self.line_items.push(line);
    }

    pub(crate) fn fire(&mut self, rule_id: &str) {
        self.rules_fired.push(rule_id.to_string());
    }

    pub(crate) fn note(&mut self, note: String) {
        debug!(note = %note, "clarification");

        self.clarifications.push(note);
    }
}

/// How the product itself was priced.
struct BasePrice {
    total: i64,
    minimum: Option<Decimal>,
    tier: String,
    qty_discount: Option<Percentage>,
}

/// Price a print order.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a config value the request needs is missing or not numeric.
#[tracing::instrument(
    name = "estimate",
    skip(tables, request),
    fields(category = ?request.category, material = ?request.material, qty = request.qty),
    err
)]
pub fn estimate(
    tables: &RuleTables,
    request: &EstimateRequest,
) -> Result<EstimateResponse, ConfigError> {
    match resolve(tables, request) {
        Ok(response) => Ok(response),
        Err(Halt::Blocked(reason)) => {
            debug!(reason = %reason, "blocked");

            Ok(EstimateResponse::blocked(
                reason,
                MarginThresholds::or_default(tables.config()),
            ))
        }
        Err(Halt::Config(error)) => {
            warn!(%error, "config defect");

            Err(error)
        }
    }
}

fn resolve(tables: &RuleTables, request: &EstimateRequest) -> Result<EstimateResponse, Halt> {
    let category = validate(request)?;
    let material = request
        .material
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty());

    let sqft = match request.dimensions() {
        Some((width_in, height_in)) => Some(round2(in_range(
            width_in
                .checked_mul(height_in)
                .and_then(|area| area.checked_div(Decimal::from(144))),
        )?)),
        None => None,
    };

    debug!(?sqft, "area");

    let config = tables.config();
    let currency = tables.currency();
    let addons = request.known_addons();
    let mut sheet = Worksheet::default();

    let base = price_base(tables, request, category, material, sqft, &mut sheet)?;

    addons::price_addons(tables, &addons, request.dimensions(), &mut sheet)?;

    let min_charge = apply_minimum(&base, request.qty, currency, &mut sheet)?;

    price_design(config, request.design_status, currency, &mut sheet)?;

    if request.wants_rush() {
        let fee = config.cents(keys::RUSH_FEE)?;

        sheet.fire(RUSH_RULE_ID);
        sheet.push(LineItem {
            description: "Rush production".to_string(),
            qty: 1,
            unit_price: money(fee, currency),
            line_total: money(fee, currency),
            rule_id: RUSH_RULE_ID.to_string(),
        });
    }

    let sell_cents = in_range(
        sheet
            .line_items
            .iter()
            .try_fold(0_i64, |sum, line| sum.checked_add(line.line_total.to_minor_units())),
    )?;

    let tax_rate = config.percentage(keys::TAX_RATE)?;
    let gst_cents = in_range(round_cents(from_cents(sell_cents) * fraction(tax_rate)))?;
    let sell_price = money(sell_cents, currency);

    debug!(sell = sell_cents, gst = gst_cents, "totals");

    let cost = project_cost(
        tables,
        &CostInput {
            category,
            material,
            sqft,
            sides: request.sides,
            qty: request.qty,
            addons: &addons,
        },
    )?;

    if let Some(breakdown) = cost.as_ref().filter(|breakdown| breakdown.is_partial()) {
        sheet.note(format!(
            "Material cost for {} is unconfirmed; margin not available",
            breakdown.material_code().unwrap_or(category)
        ));
    }

    let margin = cost
        .as_ref()
        .and_then(|breakdown| breakdown.margin(sell_price));

    let status = if sheet.clarifications.is_empty() {
        EstimateStatus::Quoted
    } else {
        EstimateStatus::NeedsClarification
    };

    debug!(?status, rules_fired = ?sheet.rules_fired, "resolved");

    Ok(EstimateResponse {
        status,
        sell_price: Some(sell_price),
        gst: Some(money(gst_cents, currency)),
        line_items: sheet.line_items,
        sqft,
        tier_applied: Some(base.tier),
        min_charge_applied: min_charge.is_some(),
        min_charge_value: min_charge,
        qty_discount_applied: base.qty_discount.is_some(),
        qty_discount_pct: base.qty_discount,
        rules_fired: sheet.rules_fired,
        cost,
        margin,
        line_name: labels::line_name(request),
        clarifications: sheet.clarifications,
        blocked_reason: None,
        margin_thresholds: MarginThresholds::from_config(config)?,
    })
}

fn validate(request: &EstimateRequest) -> Result<&str, Halt> {
    let category = request
        .category
        .as_deref()
        .map(str::trim)
        .filter(|category| !category.is_empty())
        .ok_or_else(|| Halt::Blocked("Product category is required".to_string()))?;

    if request.qty == 0 {
        return Err(Halt::Blocked("Quantity must be at least 1".to_string()));
    }

    let non_positive = [request.width_in, request.height_in]
        .into_iter()
        .flatten()
        .any(|dimension| dimension <= Decimal::ZERO);

    if non_positive {
        return Err(Halt::Blocked("Dimensions must be greater than zero".to_string()));
    }

    Ok(category)
}

/// Price the product from the catalog, a pricing rule or the fallback rate, pushing the base line.
fn price_base(
    tables: &RuleTables,
    request: &EstimateRequest,
    category: &str,
    material: Option<&str>,
    sqft: Option<Decimal>,
    sheet: &mut Worksheet,
) -> Result<BasePrice, Halt> {
    let currency = tables.currency();
    let qty = request.qty;
    let description = labels::product_description(request);

    let fixed = request.dimensions().and_then(|dimensions| {
        tables.find_fixed_size(category, material, request.sides, qty, dimensions)
    });

    if let Some(product) = fixed {
        let total = in_range(round_cents(product.price))?;

        debug!(product = %product.id, total, "fixed-size match");

        sheet.fire(&product.id);
        sheet.push(LineItem {
            description,
            qty,
            unit_price: money(per_unit(total, qty)?, currency),
            line_total: money(total, currency),
            rule_id: product.id.clone(),
        });

        return Ok(BasePrice {
            total,
            minimum: tables.category_minimum(category, material, request.sides),
            tier: FIXED_SIZE_TIER.to_string(),
            qty_discount: None,
        });
    }

    if let Some(rule) = tables.find_pricing_rule(category, material, request.sides, sqft, qty) {
        let unit = match rule.rate {
            Rate::PerSqft(rate) => {
                let area = in_range(sqft)?;

                in_range(area.checked_mul(rate).and_then(ceil_cents))?
            }
            Rate::PerUnit(rate) => in_range(round_cents(rate))?,
        };

        let mut total = in_range(unit.checked_mul(i64::from(qty)))?;
        let mut description = description;

        debug!(rule = %rule.id, unit, total, "pricing rule matched");

        sheet.fire(&rule.id);

        let qty_discount = tables.find_qty_discount(category, qty);

        if let Some(tier) = qty_discount {
            let keep = Decimal::ONE - fraction(tier.discount);

            total = in_range(
                from_cents(total)
                    .checked_mul(keep)
                    .and_then(round_cents),
            )?;

            description = format!(
                "{description} ({} qty discount)",
                labels::percent_label(tier.discount)
            );

            debug!(tier = %tier.id, total, "quantity discount");

            sheet.fire(&tier.id);
        }

        let unit_price = if qty_discount.is_some() {
            per_unit(total, qty)?
        } else {
            unit
        };

        sheet.push(LineItem {
            description,
            qty,
            unit_price: money(unit_price, currency),
            line_total: money(total, currency),
            rule_id: rule.id.clone(),
        });

        return Ok(BasePrice {
            total,
            minimum: rule.min_charge,
            tier: rule.id.clone(),
            qty_discount: qty_discount.map(|tier| tier.discount),
        });
    }

    let Some(area) = sqft else {
        return Err(Halt::Blocked(format!(
            "No pricing available for {category} without dimensions"
        )));
    };

    let config = tables.config();
    let rate = config.decimal(keys::FALLBACK_RATE_PER_SQFT)?;
    let unit = in_range(area.checked_mul(rate).and_then(ceil_cents))?;
    let total = in_range(unit.checked_mul(i64::from(qty)))?;

    debug!(unit, total, "fallback pricing");

    sheet.fire(FALLBACK_RULE_ID);
    sheet.note(format!(
        "No pricing rule for {category}; priced at the fallback rate of {}/sqft",
        money(in_range(round_cents(rate))?, currency)
    ));
    sheet.push(LineItem {
        description: format!("{description} (FALLBACK)"),
        qty,
        unit_price: money(unit, currency),
        line_total: money(total, currency),
        rule_id: FALLBACK_RULE_ID.to_string(),
    });

    Ok(BasePrice {
        total,
        minimum: Some(config.decimal(keys::FALLBACK_MIN_CHARGE)?),
        tier: FALLBACK_TIER.to_string(),
        qty_discount: None,
    })
}

/// Lift the base line to the minimum charge when it falls short. Returns the minimum when applied.
fn apply_minimum(
    base: &BasePrice,
    qty: u32,
    currency: &'static Currency,
    sheet: &mut Worksheet,
) -> Result<Option<Money<'static, Currency>>, Halt> {
    let Some(minimum) = base.minimum else {
        return Ok(None);
    };

    let minimum = in_range(round_cents(minimum))?;

    if minimum <= base.total {
        return Ok(None);
    }

    let unit = per_unit(minimum, qty)?;

    let Some(line) = sheet.line_items.first_mut() else {
        return Ok(None);
    };

    line.description = format!("{} (minimum charge applied)", line.description);
    line.unit_price = money(unit, currency);
    line.line_total = money(minimum, currency);

    debug!(minimum, "minimum charge applied");

    sheet.fire(MIN_CHARGE_RULE_ID);

    Ok(Some(money(minimum, currency)))
}

fn price_design(
    config: &Config,
    design_status: DesignStatus,
    currency: &'static Currency,
    sheet: &mut Worksheet,
) -> Result<(), Halt> {
    let (key, description) = match design_status {
        DesignStatus::PrintReady => return Ok(()),
        DesignStatus::Unknown => {
            sheet.note("Design requirements unknown; no design fee included".to_string());

            return Ok(());
        }
        DesignStatus::MinorEdit => (keys::DESIGN_FEE_MINOR_EDIT, "Design: minor edits"),
        DesignStatus::FullDesign => (keys::DESIGN_FEE_FULL_DESIGN, "Design: full design"),
        DesignStatus::LogoRecreation => {
            (keys::DESIGN_FEE_LOGO_RECREATION, "Design: logo recreation")
        }
    };

    let fee = config.cents(key)?;
    let rule_id = key.to_ascii_uppercase();

    sheet.fire(&rule_id);
    sheet.push(LineItem {
        description: description.to_string(),
        qty: 1,
        unit_price: money(fee, currency),
        line_total: money(fee, currency),
        rule_id,
    });

    Ok(())
}

fn per_unit(total: i64, qty: u32) -> Result<i64, Halt> {
    in_range(
        from_cents(total)
            .checked_div(Decimal::from(qty))
            .and_then(round_cents),
    )
}
