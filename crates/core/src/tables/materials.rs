//! Materials
//!
//! Substrate cost rates and the derived waste and production-route model used by cost
//! projection.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::tables::{RuleTableError, parse_optional_amount};

/// Keywords identifying sheet-fed flat goods categories.
const FLAT_GOOD_KEYWORDS: [&str; 4] = ["CARD", "FLYER", "BROCHURE", "POSTCARD"];

const PAPER_KEYWORDS: [&str; 7] = ["PAPER", "CARD", "STOCK", "TEXT", "COVER", "PT", "LB"];
const RIGID_KEYWORDS: [&str; 8] = [
    "COROPLAST", "COR", "ALUMINUM", "ACP", "PVC", "FOAM", "DIBOND", "ACRYLIC",
];

/// Whether a category is a sheet-fed flat good (cards, flyers, brochures, postcards).
pub fn is_flat_good(category: &str) -> bool {
    let category = category.to_ascii_uppercase();

    FLAT_GOOD_KEYWORDS
        .iter()
        .any(|keyword| category.contains(keyword))
}

/// Physical substrate family, which drives the waste model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substrate {
    /// Paper and card stock.
    Paper,

    /// Rigid boards: coroplast, aluminium composite, PVC, foam.
    Rigid,

    /// Roll-fed flexible media: vinyl, banner, mesh, fabric.
    Roll,
}

impl Substrate {
    /// Waste multiplier applied to printed area.
    pub fn waste_multiplier(self) -> Decimal {
        match self {
            Substrate::Paper => Decimal::ONE,
            Substrate::Rigid => Decimal::new(105, 2),
            Substrate::Roll => Decimal::new(110, 2),
        }
    }
}

/// Print engine a job runs on. The two are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductionRoute {
    /// Sheet-fed digital press.
    DigitalPress,

    /// Roll-to-roll or flatbed wide-format printer.
    WideFormat,
}

/// A material record.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material code.
    pub code: String,

    /// Category the material is sold under.
    pub category: String,

    /// Display name.
    pub name: String,

    /// Supplier cost per square foot, if known.
    pub cost_per_sqft: Option<Decimal>,

    /// Explicit placeholder flag.
    pub placeholder: bool,

    /// Waste multiplier override.
    pub waste_multiplier: Option<Decimal>,
}

impl Material {
    /// True when the supplier cost can't be relied on: flagged, generic, or missing/zero.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
            || self.code.to_ascii_uppercase().contains("GENERIC")
            || self.name.to_ascii_uppercase().contains("GENERIC")
            || self.cost_per_sqft.is_none_or(|cost| cost.is_zero())
    }

    /// Confirmed cost per square foot, `None` for placeholders.
    pub fn confirmed_cost(&self) -> Option<Decimal> {
        if self.is_placeholder() {
            None
        } else {
            self.cost_per_sqft
        }
    }

    /// Substrate family, by keyword on code and name. Unknown media are treated as roll stock.
    pub fn substrate(&self) -> Substrate {
        let haystack = format!("{} {}", self.code, self.name).to_ascii_uppercase();
        let words: Vec<&str> = haystack
            .split(|ch: char| !ch.is_ascii_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect();

        let has = |keywords: &[&str]| {
            words.iter().any(|word| {
                keywords
                    .iter()
                    .any(|keyword| word == keyword || word.starts_with(keyword) || word.ends_with(keyword))
            })
        };

        if has(&RIGID_KEYWORDS) {
            Substrate::Rigid
        } else if has(&PAPER_KEYWORDS) {
            Substrate::Paper
        } else {
            Substrate::Roll
        }
    }

    /// Waste multiplier, explicit or derived from the substrate.
    pub fn waste_multiplier(&self) -> Decimal {
        self.waste_multiplier
            .unwrap_or_else(|| self.substrate().waste_multiplier())
    }

    /// Print engine for this material in the given category.
    pub fn production_route(&self, category: &str) -> ProductionRoute {
        if is_flat_good(category) || self.substrate() == Substrate::Paper {
            ProductionRoute::DigitalPress
        } else {
            ProductionRoute::WideFormat
        }
    }
}

/// Wrapper for materials in YAML
#[derive(Debug, Deserialize)]
pub struct MaterialsFixture {
    /// Material records
    pub materials: Vec<MaterialFixture>,
}

/// Material Fixture
#[derive(Debug, Deserialize)]
pub struct MaterialFixture {
    /// Material code
    pub code: String,

    /// Category code
    pub category: String,

    /// Display name
    pub name: String,

    /// Cost per square foot (e.g. "0.55"); omitted when unconfirmed
    #[serde(default)]
    pub cost_per_sqft: Option<String>,

    /// Explicit placeholder flag
    #[serde(default)]
    pub placeholder: bool,

    /// Optional waste multiplier override (e.g. "1.15")
    #[serde(default)]
    pub waste_multiplier: Option<String>,
}

impl TryFrom<MaterialFixture> for Material {
    type Error = RuleTableError;

    fn try_from(fixture: MaterialFixture) -> Result<Self, Self::Error> {
        Ok(Material {
            cost_per_sqft: parse_optional_amount(fixture.cost_per_sqft.as_deref())?,
            waste_multiplier: parse_optional_amount(fixture.waste_multiplier.as_deref())?,
            code: fixture.code,
            category: fixture.category,
            name: fixture.name,
            placeholder: fixture.placeholder,
        })
    }
}
