//! Printquote
//!
//! Printquote is a deterministic price resolver for custom print orders. Given a product category,
//! material, dimensions, quantity and add-ons it produces a customer sell price together with a
//! parallel internal cost and margin estimate, driven entirely by tabular rule data.

pub mod cost;
pub mod estimate;
pub mod labels;
pub mod money;
pub mod prelude;
pub mod quote_sheet;
pub mod request;
pub mod tables;
pub mod utils;
pub mod verification;
