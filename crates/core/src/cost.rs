//! Cost Projection
//!
//! A parallel, internal-only view of what a job costs to produce: material, ink, labor,
//! overhead and hardware. It never feeds back into the sell price.
//!
//! Materials whose supplier cost isn't confirmed yield [`CostAmount::Unconfirmed`] rather than a
//! zero, and the whole breakdown is then partial: no total, no margin.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tracing::debug;

use crate::{
    money::{from_cents, money, round_cents},
    request::{AddOn, Sides},
    tables::{
        RuleTables,
        config::{ConfigError, keys},
        materials::{Material, ProductionRoute, Substrate, is_flat_good},
    },
};

/// A cost figure that may not be known yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CostAmount {
    /// Cost backed by confirmed supplier data.
    Confirmed(Money<'static, Currency>),

    /// Supplier cost not confirmed; must not be read as zero.
    Unconfirmed,
}

impl CostAmount {
    /// The amount, when confirmed.
    pub fn confirmed(&self) -> Option<Money<'static, Currency>> {
        match self {
            CostAmount::Confirmed(amount) => Some(*amount),
            CostAmount::Unconfirmed => None,
        }
    }

    /// Whether the amount is confirmed.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, CostAmount::Confirmed(_))
    }
}

/// What the projector needs to know about the job.
#[derive(Debug, Clone, Copy)]
pub struct CostInput<'r> {
    /// Category code.
    pub category: &'r str,

    /// Material code, if the request named one.
    pub material: Option<&'r str>,

    /// Area of one piece in square feet.
    pub sqft: Option<Decimal>,

    /// Printed sides.
    pub sides: Sides,

    /// Number of pieces.
    pub qty: u32,

    /// Recognised add-ons.
    pub addons: &'r [AddOn],
}

/// Internal cost breakdown for one job.
#[derive(Debug, Clone, PartialEq)]
pub struct CostBreakdown {
    material_code: Option<String>,
    route: ProductionRoute,
    waste_multiplier: Decimal,
    material: CostAmount,
    ink: Money<'static, Currency>,
    labor: Money<'static, Currency>,
    overhead: Money<'static, Currency>,
    hardware: Option<Money<'static, Currency>>,
    total: CostAmount,
}

impl CostBreakdown {
    /// Material the costs were based on, if one was resolved.
    pub fn material_code(&self) -> Option<&str> {
        self.material_code.as_deref()
    }

    /// Print engine the job runs on.
    pub fn route(&self) -> ProductionRoute {
        self.route
    }

    /// Waste multiplier applied to the printed area.
    pub fn waste_multiplier(&self) -> Decimal {
        self.waste_multiplier
    }

    /// Substrate cost.
    pub fn material(&self) -> CostAmount {
        self.material
    }

    /// Ink cost.
    pub fn ink(&self) -> Money<'static, Currency> {
        self.ink
    }

    /// Operator time.
    pub fn labor(&self) -> Money<'static, Currency> {
        self.labor
    }

    /// Per-job overhead.
    pub fn overhead(&self) -> Money<'static, Currency> {
        self.overhead
    }

    /// Hardware cost (H-stakes), cost side only.
    pub fn hardware(&self) -> Option<Money<'static, Currency>> {
        self.hardware
    }

    /// Total cost, unconfirmed whenever the material cost is.
    pub fn total(&self) -> CostAmount {
        self.total
    }

    /// True when some figure was unconfirmed.
    pub fn is_partial(&self) -> bool {
        !self.total.is_confirmed()
    }

    /// Gross margin on a sell price, `(sell - cost) / sell`, to four places.
    ///
    /// `None` when the cost is partial or the sell price is zero.
    pub fn margin(&self, sell_price: Money<'static, Currency>) -> Option<Percentage> {
        let cost = from_cents(self.total.confirmed()?.to_minor_units());
        let revenue = from_cents(sell_price.to_minor_units());

        if revenue.is_zero() {
            return None;
        }

        let margin = revenue.checked_sub(cost)?.checked_div(revenue)?.round_dp(4);

        Some(Percentage::from(margin))
    }
}

/// Config-sourced rates the projector multiplies through.
struct CostRates {
    ink: Decimal,
    labor_minutes: Decimal,
    labor_hourly: Decimal,
    overhead: Decimal,
    h_stake: Option<Decimal>,
}

/// Project the internal cost of a job.
///
/// Returns `Ok(None)` when there's no cost basis at all: a wide-format job without an area.
/// Callers must read that as "no margin data", not as zero cost.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a required cost constant is missing or non-numeric.
pub fn project_cost(
    tables: &RuleTables,
    input: &CostInput<'_>,
) -> Result<Option<CostBreakdown>, ConfigError> {
    let flat = is_flat_good(input.category);

    if !flat && input.sqft.is_none() {
        debug!(category = input.category, "no cost basis without an area");

        return Ok(None);
    }

    let config = tables.config();

    let rates = CostRates {
        ink: config.decimal(if flat {
            keys::INK_COST_PER_SHEET
        } else {
            keys::INK_COST_PER_SQFT
        })?,
        labor_minutes: config.decimal(keys::LABOR_MINUTES_PER_JOB)?,
        labor_hourly: config.decimal(keys::LABOR_HOURLY_RATE)?,
        overhead: config.decimal(keys::OVERHEAD_PER_JOB)?,
        h_stake: if input.addons.contains(&AddOn::HStake) {
            Some(config.decimal(keys::H_STAKE_COST)?)
        } else {
            None
        },
    };

    let breakdown = breakdown(tables, input, flat, &rates);

    if breakdown.is_none() {
        debug!(category = input.category, "cost amounts out of range");
    }

    Ok(breakdown)
}

fn breakdown(
    tables: &RuleTables,
    input: &CostInput<'_>,
    flat: bool,
    rates: &CostRates,
) -> Option<CostBreakdown> {
    let currency = tables.currency();
    let material = tables.find_material(input.material, input.category);
    let qty = Decimal::from(input.qty);

    let waste_multiplier = match (flat, material) {
        (true, _) => Decimal::ONE,
        (false, Some(material)) => material.waste_multiplier(),
        (false, None) => Substrate::Roll.waste_multiplier(),
    };

    let route = match material {
        Some(material) => material.production_route(input.category),
        None if flat => ProductionRoute::DigitalPress,
        None => ProductionRoute::WideFormat,
    };

    let ink = if flat {
        qty.checked_mul(Decimal::from(input.sides.count()))?
            .checked_mul(rates.ink)?
    } else {
        input
            .sqft?
            .checked_mul(qty)?
            .checked_mul(waste_multiplier)?
            .checked_mul(rates.ink)?
    };

    let material_cents = match (material.and_then(Material::confirmed_cost), input.sqft) {
        (Some(cost), Some(sqft)) => Some(round_cents(
            sqft.checked_mul(qty)?
                .checked_mul(waste_multiplier)?
                .checked_mul(cost)?,
        )?),
        _ => None,
    };

    let labor = rates
        .labor_minutes
        .checked_div(Decimal::from(60))?
        .checked_mul(rates.labor_hourly)?;

    let ink_cents = round_cents(ink)?;
    let labor_cents = round_cents(labor)?;
    let overhead_cents = round_cents(rates.overhead)?;
    let hardware_cents = match rates.h_stake {
        Some(cost) => Some(round_cents(cost)?),
        None => None,
    };

    let total = match material_cents {
        Some(material_cents) => {
            let sum = [
                material_cents,
                ink_cents,
                labor_cents,
                overhead_cents,
                hardware_cents.unwrap_or(0),
            ]
            .iter()
            .try_fold(0_i64, |acc, cents| acc.checked_add(*cents))?;

            CostAmount::Confirmed(money(sum, currency))
        }
        None => CostAmount::Unconfirmed,
    };

    Some(CostBreakdown {
        material_code: material.map(|m| m.code.clone()),
        route,
        waste_multiplier,
        material: material_cents.map_or(CostAmount::Unconfirmed, |cents| {
            CostAmount::Confirmed(money(cents, currency))
        }),
        ink: money(ink_cents, currency),
        labor: money(labor_cents, currency),
        overhead: money(overhead_cents, currency),
        hardware: hardware_cents.map(|cents| money(cents, currency)),
        total,
    })
}
