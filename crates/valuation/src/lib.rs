//! # Lodestar Valuation
//!
//! Intrinsic-value estimation from a company's fundamentals snapshot: the discount
//! rate (WACC), the free-cash-flow growth estimate, the DCF projection to a fair
//! value per share, and the discount/premium of the current price to that value.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It depends only on `core-types`
//!   and `configuration`.
//! - **Business Conditions Are Data:** An unestimable growth rate or an undefined
//!   terminal value is returned as `DcfResult::Unavailable` with a reason, while
//!   genuinely invalid inputs are returned as `ValuationError`.
//!
//! ## Public API
//!
//! - `CapitalStructureEstimator` / `WaccBreakdown`: the WACC calculation.
//! - `estimate_fcf_growth` / `GrowthEstimate`: the FCF growth estimate.
//! - `CashFlowProjector` / `dcf_fair_value` / `DcfResult`: the DCF model.
//! - `FairValueComparator` / `compare`: the valuation gap.

pub mod comparator;
pub mod dcf;
pub mod error;
pub mod growth;
pub mod wacc;

pub use comparator::{FairValueComparator, GapLabel, ValuationGap, compare};
pub use dcf::{
    CashFlowProjector, DcfFailure, DcfResult, DcfValuation, ShareCountSource, dcf_fair_value,
    terminal_value,
};
pub use error::ValuationError;
pub use growth::{GrowthEstimate, GrowthRateUnavailable, estimate_fcf_growth};
pub use wacc::{
    ALTERNATE_DEFAULT_TAX_RATE, CapitalStructureEstimator, CostOfDebtSource,
    STANDARD_DEFAULT_TAX_RATE, TaxRateSource, WaccBreakdown,
};
