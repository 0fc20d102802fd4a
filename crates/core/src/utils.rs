//! Utils

use clap::Parser;
use rust_decimal::Decimal;

use crate::request::{DesignStatus, EstimateRequest, Sides};

/// Arguments for the quote example
#[derive(Debug, Parser)]
pub struct ExampleQuoteArgs {
    /// Product category, e.g. SIGN or BANNER
    #[clap(short, long)]
    pub category: Option<String>,

    /// Material code, e.g. COR4
    #[clap(short, long)]
    pub material: Option<String>,

    /// Width in inches
    #[clap(short = 'W', long)]
    pub width: Option<Decimal>,

    /// Height in inches
    #[clap(short = 'H', long)]
    pub height: Option<Decimal>,

    /// Print both sides
    #[clap(short, long)]
    pub double_sided: bool,

    /// Number of pieces
    #[clap(short, long, default_value_t = 1)]
    pub qty: u32,

    /// Add-on flags (repeatable), e.g. `GROMMETS` or `H_STAKE`
    #[clap(short, long)]
    pub addon: Vec<String>,

    /// Rush production
    #[clap(short, long)]
    pub rush: bool,

    /// Design service: `print_ready`, `minor_edit`, `full_design` or `logo_recreation`
    #[clap(long, default_value = "print_ready")]
    pub design: String,

    /// Finish code, e.g. HEMMED
    #[clap(long)]
    pub finish: Option<String>,

    /// Fixture set to load the rule tables from
    #[clap(short, long, default_value = "default")]
    pub fixture: String,
}

impl ExampleQuoteArgs {
    /// Build the estimate request these arguments describe.
    pub fn request(&self) -> EstimateRequest {
        EstimateRequest {
            category: self.category.clone(),
            material: self.material.clone(),
            width_in: self.width,
            height_in: self.height,
            sides: if self.double_sided {
                Sides::Double
            } else {
                Sides::Single
            },
            qty: self.qty,
            addons: self.addon.iter().cloned().collect(),
            is_rush: self.rush,
            design_status: DesignStatus::from_code(&self.design),
            finish: self.finish.clone(),
        }
    }
}
