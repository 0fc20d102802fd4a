//! Services
//!
//! Flat-fee add-ons sold alongside a print.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    request::AddOn,
    tables::{RuleTableError, parse_amount},
};

/// A priced add-on service.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    /// Service identifier, recorded in the audit trail.
    pub id: String,

    /// Add-on this service prices.
    pub addon: AddOn,

    /// Display name.
    pub name: String,

    /// Price per unit.
    pub unit_price: Decimal,
}

/// Wrapper for services in YAML
#[derive(Debug, Deserialize)]
pub struct ServicesFixture {
    /// Service records
    pub services: Vec<ServiceFixture>,
}

/// Service Fixture
#[derive(Debug, Deserialize)]
pub struct ServiceFixture {
    /// Service identifier
    pub id: String,

    /// Add-on flag (e.g. "GROMMETS")
    pub addon: String,

    /// Display name
    pub name: String,

    /// Unit price (e.g. "1.00")
    pub unit_price: String,
}

impl TryFrom<ServiceFixture> for Service {
    type Error = RuleTableError;

    fn try_from(fixture: ServiceFixture) -> Result<Self, Self::Error> {
        let addon = AddOn::from_flag(&fixture.addon).ok_or_else(|| {
            RuleTableError::InvalidRule(format!(
                "{}: unknown add-on {:?}",
                fixture.id, fixture.addon
            ))
        })?;

        Ok(Service {
            unit_price: parse_amount(&fixture.unit_price)?,
            addon,
            name: fixture.name,
            id: fixture.id,
        })
    }
}
