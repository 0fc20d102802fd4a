//! Integration tests for properties that hold across every estimate.

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{CAD, Currency},
};
use testresult::TestResult;

use printquote::{
    estimate::{
        FALLBACK_RULE_ID, FALLBACK_TIER, FIXED_SIZE_TIER, MIN_CHARGE_RULE_ID, RUSH_RULE_ID,
    },
    prelude::*,
};

fn tables() -> Result<RuleTables, RuleTableError> {
    RuleTables::from_set("default")
}

fn sign() -> EstimateRequest {
    EstimateRequest::new("SIGN")
        .material("COR4")
        .size(Decimal::from(24), Decimal::from(24))
}

fn cents(money: Option<Money<'static, Currency>>) -> Result<i64, &'static str> {
    money
        .map(|money| money.to_minor_units())
        .ok_or("expected a price")
}

fn requests() -> Vec<EstimateRequest> {
    vec![
        sign(),
        sign().qty(30).sides(Sides::Double),
        sign().addon("H_STAKE").rush(true),
        EstimateRequest::new("SIGN")
            .material("COR4")
            .size(Decimal::from(48), Decimal::from(96))
            .design(DesignStatus::LogoRecreation),
        EstimateRequest::new("BANNER")
            .material("V13")
            .size(Decimal::from(36), Decimal::from(120))
            .qty(6)
            .addon("GROMMETS"),
        EstimateRequest::new("DECAL").qty(300).addon("RUSH"),
        EstimateRequest::new("MAGNET").size(Decimal::from(12), Decimal::from(24)),
    ]
}

#[test]
fn identical_requests_give_identical_responses() -> TestResult {
    let tables = tables()?;

    for request in requests() {
        assert_eq!(estimate(&tables, &request)?, estimate(&tables, &request)?);
    }

    Ok(())
}

#[test]
fn line_items_sum_to_the_sell_price() -> TestResult {
    let tables = tables()?;

    for request in requests() {
        let response = estimate(&tables, &request)?;
        let sum: i64 = response
            .line_items()
            .iter()
            .map(|line| line.line_total().to_minor_units())
            .sum();

        assert_eq!(Some(sum), response.sell_price().map(|price| price.to_minor_units()));
    }

    Ok(())
}

#[test]
fn fixed_size_matches_never_take_a_quantity_discount() -> TestResult {
    let request = EstimateRequest::new("BUSINESS_CARD")
        .material("14PT")
        .size(Decimal::new(35, 1), Decimal::from(2))
        .qty(500);

    let response = estimate(&tables()?, &request)?;

    assert_eq!(response.sell_price(), Some(Money::from_minor(5900, CAD)));
    assert!(!response.qty_discount_applied());
    assert_eq!(response.qty_discount_pct(), None);

    Ok(())
}

#[test]
fn add_ons_never_lower_the_price() -> TestResult {
    let tables = tables()?;
    let plain = cents(estimate(&tables, &sign())?.sell_price())?;

    for flag in ["GROMMETS", "H_STAKE", "CARD_STOCK_UPGRADE", "RUSH", "UNKNOWN_FLAG"] {
        let with_addon = cents(estimate(&tables, &sign().addon(flag))?.sell_price())?;

        assert!(with_addon >= plain, "{flag} lowered the price");
    }

    Ok(())
}

#[test]
fn unknown_add_on_flags_are_ignored() -> TestResult {
    let tables = tables()?;

    let plain = estimate(&tables, &sign())?;
    let unknown = estimate(&tables, &sign().addon("glitter"))?;

    assert_eq!(plain.sell_price(), unknown.sell_price());
    assert_eq!(plain.line_items(), unknown.line_items());

    Ok(())
}

#[test]
fn design_fee_adds_exactly_the_configured_fee() -> TestResult {
    let tables = tables()?;
    let plain = cents(estimate(&tables, &sign())?.sell_price())?;

    for (status, fee) in [
        (DesignStatus::PrintReady, 0),
        (DesignStatus::MinorEdit, 3500),
        (DesignStatus::FullDesign, 9500),
        (DesignStatus::LogoRecreation, 15_000),
        (DesignStatus::Unknown, 0),
    ] {
        let with_design = cents(estimate(&tables, &sign().design(status))?.sell_price())?;

        assert_eq!(with_design - plain, fee, "{status:?}");
    }

    Ok(())
}

#[test]
fn rush_adds_exactly_the_rush_fee_once() -> TestResult {
    let tables = tables()?;
    let plain = cents(estimate(&tables, &sign())?.sell_price())?;

    for request in [
        sign().rush(true),
        sign().addon("RUSH"),
        sign().rush(true).addon("rush"),
    ] {
        let response = estimate(&tables, &request)?;
        let rush_lines = response
            .line_items()
            .iter()
            .filter(|line| line.rule_id() == RUSH_RULE_ID)
            .count();

        assert_eq!(cents(response.sell_price())? - plain, 4000);
        assert_eq!(rush_lines, 1);
    }

    Ok(())
}

#[test]
fn minimum_charge_is_a_floor_on_the_base_price() -> TestResult {
    let tables = tables()?;

    for (width, height) in [(6, 6), (12, 12), (18, 18), (24, 24), (36, 48)] {
        let request = EstimateRequest::new("SIGN")
            .material("COR4")
            .size(Decimal::from(width), Decimal::from(height));

        let response = estimate(&tables, &request)?;
        let base = response.line_items().first().ok_or("missing base line")?;

        assert!(base.line_total().to_minor_units() >= 3000);
    }

    Ok(())
}

#[test]
fn unknown_category_with_dimensions_uses_the_fallback_rate() -> TestResult {
    let request = EstimateRequest::new("MAGNET").size(Decimal::from(12), Decimal::from(24));

    let response = estimate(&tables()?, &request)?;
    let base = response.line_items().first().ok_or("missing base line")?;

    // 2 sqft at 12.00 is under the 45.00 fallback minimum
    assert_eq!(response.status(), EstimateStatus::NeedsClarification);
    assert_eq!(response.tier_applied(), Some(FALLBACK_TIER));
    assert_eq!(base.rule_id(), FALLBACK_RULE_ID);
    assert!(base.description().contains("(FALLBACK)"));
    assert!(response.min_charge_applied());
    assert_eq!(response.sell_price(), Some(Money::from_minor(4500, CAD)));
    assert!(
        response
            .clarifications()
            .iter()
            .any(|note| note.contains("fallback rate"))
    );

    Ok(())
}

#[test]
fn unknown_category_without_dimensions_is_blocked() -> TestResult {
    let response = estimate(&tables()?, &EstimateRequest::new("MAGNET"))?;

    assert_eq!(response.status(), EstimateStatus::Blocked);
    assert_eq!(response.sell_price(), None);

    Ok(())
}

#[test]
fn unconfirmed_material_cost_needs_clarification_without_margin() -> TestResult {
    let request = EstimateRequest::new("BANNER")
        .material("V8MESH")
        .size(Decimal::from(24), Decimal::from(72));

    let response = estimate(&tables()?, &request)?;
    let cost = response.cost().ok_or("expected a cost breakdown")?;

    assert_eq!(response.status(), EstimateStatus::NeedsClarification);
    assert_eq!(response.sell_price(), Some(Money::from_minor(10_200, CAD)));
    assert_eq!(cost.material(), CostAmount::Unconfirmed);
    assert!(cost.is_partial());
    assert_eq!(response.margin(), None);

    Ok(())
}

#[test]
fn confirmed_costs_give_a_margin() -> TestResult {
    let response = estimate(&tables()?, &sign())?;
    let cost = response.cost().ok_or("expected a cost breakdown")?;

    assert!(!cost.is_partial());
    assert!(response.margin().is_some());

    Ok(())
}

#[test]
fn missing_tax_rate_is_a_config_error() -> TestResult {
    let mut tables = RuleTables::new();
    tables
        .load_config("missing_tax_rate")?
        .load_pricing_rules("default")?
        .load_materials("default")?;

    let result = estimate(&tables, &sign());

    assert_eq!(result, Err(ConfigError::Missing("tax_rate".to_string())));

    Ok(())
}

#[test]
fn tables_are_shareable_across_threads() -> TestResult {
    let tables = std::sync::Arc::new(tables()?);
    let expected = estimate(&tables, &sign())?;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let tables = std::sync::Arc::clone(&tables);

            std::thread::spawn(move || estimate(&tables, &sign()))
        })
        .collect();

    for handle in handles {
        let response = handle.join().map_err(|_err| "thread panicked")??;

        assert_eq!(response, expected);
    }

    Ok(())
}

#[test]
fn fixed_size_price_is_the_catalog_price_plus_extras() -> TestResult {
    let request = EstimateRequest::new("SIGN")
        .material("COR4")
        .size(Decimal::from(48), Decimal::from(96))
        .addon("H_STAKE")
        .addon("CARD_STOCK_UPGRADE")
        .design(DesignStatus::FullDesign)
        .rush(true);

    let response = estimate(&tables()?, &request)?;

    // 179.00 catalog + 3.50 stake + 15.00 upgrade + 95.00 design + 40.00 rush
    assert_eq!(response.status(), EstimateStatus::Quoted);
    assert_eq!(response.tier_applied(), Some(FIXED_SIZE_TIER));
    assert_eq!(response.sell_price(), Some(Money::from_minor(33_250, CAD)));
    assert!(!response.qty_discount_applied());
    assert_eq!(
        response.rules_fired(),
        [
            "FX-SIGN-COR4-48x96-S1-1",
            "SVC-H-STAKE",
            "SVC-CARD-STOCK",
            "DESIGN_FEE_FULL_DESIGN",
            RUSH_RULE_ID,
        ]
    );

    Ok(())
}

#[test]
fn h_stake_and_card_stock_lines_are_one_service_each() -> TestResult {
    let request = sign().addon("H_STAKE").addon("CARD_STOCK_UPGRADE");

    let response = estimate(&tables()?, &request)?;

    let line = |rule_id: &str| {
        response
            .line_items()
            .iter()
            .find(|line| line.rule_id() == rule_id)
            .cloned()
            .ok_or("missing add-on line")
    };

    let stake = line("SVC-H-STAKE")?;
    let card_stock = line("SVC-CARD-STOCK")?;

    assert_eq!(stake.qty(), 1);
    assert_eq!(stake.unit_price(), Money::from_minor(350, CAD));
    assert_eq!(stake.line_total(), Money::from_minor(350, CAD));
    assert_eq!(card_stock.qty(), 1);
    assert_eq!(card_stock.line_total(), Money::from_minor(1500, CAD));

    // 36.00 base + 3.50 + 15.00
    assert_eq!(response.sell_price(), Some(Money::from_minor(5450, CAD)));

    Ok(())
}

#[test]
fn fixed_size_match_still_carries_the_category_minimum() -> TestResult {
    let dir = tempfile::tempdir()?;

    for table in ["config", "pricing_rules", "materials"] {
        fs::create_dir_all(dir.path().join(table))?;
        fs::copy(
            Path::new("fixtures").join(table).join("default.yml"),
            dir.path().join(table).join("default.yml"),
        )?;
    }

    fs::create_dir_all(dir.path().join("fixed_sizes"))?;
    fs::write(
        dir.path().join("fixed_sizes").join("clearance.yml"),
        "products:\n  - id: FX-SIGN-COR4-12x18-S1-1\n    category: SIGN\n    material: COR4\n    width_in: \"12\"\n    height_in: \"18\"\n    sides: 1\n    qty: 1\n    price: \"20.00\"\n",
    )?;

    let mut tables = RuleTables::with_base_path(dir.path());
    tables
        .load_config("default")?
        .load_pricing_rules("default")?
        .load_materials("default")?
        .load_fixed_sizes("clearance")?;

    let request = EstimateRequest::new("SIGN")
        .material("COR4")
        .size(Decimal::from(12), Decimal::from(18));

    let response = estimate(&tables, &request)?;

    // 20.00 catalog price is under the 30.00 COR4 minimum
    assert_eq!(response.tier_applied(), Some(FIXED_SIZE_TIER));
    assert!(response.min_charge_applied());
    assert_eq!(response.sell_price(), Some(Money::from_minor(3000, CAD)));
    assert_eq!(
        response.rules_fired(),
        ["FX-SIGN-COR4-12x18-S1-1", MIN_CHARGE_RULE_ID]
    );

    Ok(())
}

#[test]
fn fallback_pricing_takes_no_quantity_discount() -> TestResult {
    let request = EstimateRequest::new("BANNER")
        .material("V15")
        .size(Decimal::from(24), Decimal::from(72))
        .qty(5);

    let response = estimate(&tables()?, &request)?;

    // 12 sqft at 12.00 for 5 pieces, although QD-BANNER-5 covers the quantity
    assert_eq!(response.tier_applied(), Some(FALLBACK_TIER));
    assert!(!response.qty_discount_applied());
    assert_eq!(response.qty_discount_pct(), None);
    assert_eq!(response.sell_price(), Some(Money::from_minor(72_000, CAD)));
    assert_eq!(response.rules_fired(), [FALLBACK_RULE_ID]);

    Ok(())
}

#[test]
fn non_positive_grommet_spacing_is_a_config_error() -> TestResult {
    let config = Config::from_pairs(
        CAD,
        [("grommet_spacing_ft", "0"), ("grommet_min_count", "4")],
    );

    let tables = tables()?.with_config(config);
    let request = EstimateRequest::new("BANNER")
        .material("V13")
        .size(Decimal::from(24), Decimal::from(72))
        .addon("GROMMETS");

    let result = estimate(&tables, &request);

    assert!(matches!(
        result,
        Err(ConfigError::NotNumeric { ref key, .. }) if key == "grommet_spacing_ft"
    ));

    Ok(())
}
