//! Estimate Requests
//!
//! The input side of the resolver. Every default the engine relies on (single-sided, quantity
//! of one, print-ready artwork) is declared once in [`EstimateRequest::default`].

use std::fmt;

use rust_decimal::Decimal;
use smallvec::SmallVec;

/// Number of printed sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Sides {
    /// Printed on the front only.
    #[default]
    Single,

    /// Printed on front and back.
    Double,
}

impl Sides {
    /// Number of printed faces.
    pub const fn count(self) -> u32 {
        match self {
            Sides::Single => 1,
            Sides::Double => 2,
        }
    }
}

impl TryFrom<u8> for Sides {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Sides::Single),
            2 => Ok(Sides::Double),
            other => Err(other),
        }
    }
}

impl fmt::Display for Sides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// Add-on flags the resolver knows how to price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddOn {
    /// Grommets, auto-counted from the perimeter.
    Grommets,

    /// Wire H-stake for yard signs.
    HStake,

    /// Heavier card stock.
    CardStockUpgrade,

    /// Rush production, equivalent to the request's rush flag.
    Rush,
}

impl AddOn {
    /// Parse an add-on flag, ignoring case, spaces and dashes.
    ///
    /// Unrecognised flags return `None` and are skipped by the resolver.
    pub fn from_flag(flag: &str) -> Option<Self> {
        let normalized: String = flag
            .trim()
            .chars()
            .map(|ch| match ch {
                '-' | ' ' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        match normalized.as_str() {
            "GROMMETS" | "GROMMET" => Some(AddOn::Grommets),
            "H_STAKE" | "H_STAKES" | "HSTAKE" => Some(AddOn::HStake),
            "CARD_STOCK_UPGRADE" | "CARDSTOCK_UPGRADE" => Some(AddOn::CardStockUpgrade),
            "RUSH" => Some(AddOn::Rush),
            _ => None,
        }
    }

    /// Canonical flag, as used in the services table.
    pub const fn flag(self) -> &'static str {
        match self {
            AddOn::Grommets => "GROMMETS",
            AddOn::HStake => "H_STAKE",
            AddOn::CardStockUpgrade => "CARD_STOCK_UPGRADE",
            AddOn::Rush => "RUSH",
        }
    }
}

/// Level of design work requested with the order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DesignStatus {
    /// Artwork supplied ready to print; no design fee.
    #[default]
    PrintReady,

    /// Small edits to supplied artwork.
    MinorEdit,

    /// Design from scratch.
    FullDesign,

    /// Rebuild a logo from a low-quality source.
    LogoRecreation,

    /// Customer hasn't said yet.
    Unknown,
}

impl DesignStatus {
    /// Parse a design status. Anything unrecognised is [`DesignStatus::Unknown`].
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "print_ready" | "none" => DesignStatus::PrintReady,
            "minor_edit" => DesignStatus::MinorEdit,
            "full_design" => DesignStatus::FullDesign,
            "logo_recreation" => DesignStatus::LogoRecreation,
            _ => DesignStatus::Unknown,
        }
    }
}

/// A single print estimate request.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateRequest {
    /// Product category code, e.g. `SIGN`. Required.
    pub category: Option<String>,

    /// Material code, e.g. `COR4`.
    pub material: Option<String>,

    /// Width in inches.
    pub width_in: Option<Decimal>,

    /// Height in inches.
    pub height_in: Option<Decimal>,

    /// Printed sides.
    pub sides: Sides,

    /// Number of pieces.
    pub qty: u32,

    /// Raw add-on flags; see [`AddOn::from_flag`].
    pub addons: SmallVec<[String; 4]>,

    /// Rush production.
    pub is_rush: bool,

    /// Design service level.
    pub design_status: DesignStatus,

    /// Finish code. Only used for labels.
    pub finish: Option<String>,
}

impl Default for EstimateRequest {
    fn default() -> Self {
        Self {
            category: None,
            material: None,
            width_in: None,
            height_in: None,
            sides: Sides::Single,
            qty: 1,
            addons: SmallVec::new(),
            is_rush: false,
            design_status: DesignStatus::PrintReady,
            finish: None,
        }
    }
}

impl EstimateRequest {
    /// Start a request for the given category with all other fields at their defaults.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    /// Set the material code.
    #[must_use]
    pub fn material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    /// Set width and height in inches.
    #[must_use]
    pub fn size(mut self, width_in: Decimal, height_in: Decimal) -> Self {
        self.width_in = Some(width_in);
        self.height_in = Some(height_in);
        self
    }

    /// Set the printed sides.
    #[must_use]
    pub fn sides(mut self, sides: Sides) -> Self {
        self.sides = sides;
        self
    }

    /// Set the quantity.
    #[must_use]
    pub fn qty(mut self, qty: u32) -> Self {
        self.qty = qty;
        self
    }

    /// Add an add-on flag.
    #[must_use]
    pub fn addon(mut self, flag: impl Into<String>) -> Self {
        self.addons.push(flag.into());
        self
    }

    /// Set the rush flag.
    #[must_use]
    pub fn rush(mut self, is_rush: bool) -> Self {
        self.is_rush = is_rush;
        self
    }

    /// Set the design service level.
    #[must_use]
    pub fn design(mut self, design_status: DesignStatus) -> Self {
        self.design_status = design_status;
        self
    }

    /// Set the finish code.
    #[must_use]
    pub fn finish(mut self, finish: impl Into<String>) -> Self {
        self.finish = Some(finish.into());
        self
    }

    /// Width and height, when both are known.
    pub fn dimensions(&self) -> Option<(Decimal, Decimal)> {
        self.width_in.zip(self.height_in)
    }

    /// Recognised add-ons, in request order, without duplicates.
    pub fn known_addons(&self) -> SmallVec<[AddOn; 4]> {
        let mut addons: SmallVec<[AddOn; 4]> = SmallVec::new();

        for addon in self.addons.iter().filter_map(|flag| AddOn::from_flag(flag)) {
            if !addons.contains(&addon) {
                addons.push(addon);
            }
        }

        addons
    }

    /// Whether rush applies, from either the flag or the `RUSH` add-on.
    pub fn wants_rush(&self) -> bool {
        self.is_rush || self.known_addons().contains(&AddOn::Rush)
    }
}
