//! Add-on Pricing

use rust_decimal::{Decimal, prelude::ToPrimitive};
use tracing::debug;

use crate::{
    estimate::{Halt, LineItem, Worksheet, in_range},
    money::{money, round_cents},
    request::AddOn,
    tables::{
        RuleTables,
        config::{ConfigError, keys},
    },
};

/// Grommets for a piece: one every `spacing_ft` of perimeter, never fewer than `min_count`.
///
/// Returns `None` if the count can't be represented.
pub fn grommet_count(
    width_in: Decimal,
    height_in: Decimal,
    spacing_ft: Decimal,
    min_count: u32,
) -> Option<u32> {
    let twelve = Decimal::from(12);
    let perimeter_ft = Decimal::TWO.checked_mul(width_in / twelve + height_in / twelve)?;
    let count = perimeter_ft.checked_div(spacing_ft)?.ceil().to_u32()?;

    Some(count.max(min_count))
}

/// Append a line for each recognised add-on, in request order.
///
/// Rush is priced separately. Grommets need dimensions and are skipped without them.
pub(crate) fn price_addons(
    tables: &RuleTables,
    addons: &[AddOn],
    dimensions: Option<(Decimal, Decimal)>,
    sheet: &mut Worksheet,
) -> Result<(), Halt> {
    let currency = tables.currency();

    for &addon in addons {
        let qty = match addon {
            AddOn::Rush => continue,
            AddOn::Grommets => {
                let Some((width_in, height_in)) = dimensions else {
                    debug!("grommets skipped without dimensions");

                    continue;
                };

                grommets_for(tables, width_in, height_in)?
            }
            AddOn::HStake | AddOn::CardStockUpgrade => 1,
        };

        let Some(service) = tables.find_service(addon) else {
            sheet.note(format!(
                "No service price for add-on {}; it was not included",
                addon.flag()
            ));

            continue;
        };

        let unit = in_range(round_cents(service.unit_price))?;
        let total = in_range(unit.checked_mul(i64::from(qty)))?;

        debug!(service = %service.id, qty, unit, "add-on priced");

        sheet.fire(&service.id);
        sheet.push(LineItem {
            description: service.name.clone(),
            qty,
            unit_price: money(unit, currency),
            line_total: money(total, currency),
            rule_id: service.id.clone(),
        });
    }

    Ok(())
}

fn grommets_for(tables: &RuleTables, width_in: Decimal, height_in: Decimal) -> Result<u32, Halt> {
    let config = tables.config();
    let spacing_ft = config.decimal(keys::GROMMET_SPACING_FT)?;
    let min_count = config.count(keys::GROMMET_MIN_COUNT)?;

    if spacing_ft <= Decimal::ZERO {
        return Err(Halt::Config(ConfigError::NotNumeric {
            key: keys::GROMMET_SPACING_FT.to_string(),
            value: spacing_ft.to_string(),
        }));
    }

    in_range(grommet_count(width_in, height_in, spacing_ft, min_count))
}
