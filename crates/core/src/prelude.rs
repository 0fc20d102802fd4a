//! Printquote prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cost::{CostAmount, CostBreakdown, CostInput, project_cost},
    estimate::{EstimateResponse, EstimateStatus, LineItem, MarginThresholds, estimate},
    quote_sheet::QuoteSheetError,
    request::{AddOn, DesignStatus, EstimateRequest, Sides},
    tables::{
        RuleOverlap, RuleTableError, RuleTables,
        config::{Config, ConfigError},
    },
    verification::{PriceCheck, verify_submitted_price},
};
