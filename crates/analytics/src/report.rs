use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use technicals::{EmaLine, PriceLevels, VolumeProfile};
use valuation::{DcfResult, GrowthEstimate, ValuationGap, WaccBreakdown};

/// The full analysis of one ticker.
///
/// This struct is the final output of the `AnalysisEngine` and carries no
/// formatting; rendering is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub ticker: String,
    /// Date of the last bar, whose close is the current price.
    pub as_of: NaiveDate,
    pub current_price: Decimal,

    // I. Technical reference levels
    pub levels: PriceLevels,
    pub trend: Vec<EmaLine>,
    pub volume_profile: VolumeProfile,

    // II. Intrinsic value
    pub valuation: ValuationSection,
}

/// The valuation half of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationSection {
    pub wacc: WaccBreakdown,
    pub growth: GrowthEstimate,
    pub dcf: DcfResult,
    /// Present only when a positive fair value exists.
    pub gap: Option<ValuationGap>,
    /// Why there is no gap, in words a caller can show as-is.
    pub unavailable_reason: Option<String>,
}

impl ValuationSection {
    pub fn fair_value(&self) -> Option<Decimal> {
        self.dcf.fair_value()
    }
}
