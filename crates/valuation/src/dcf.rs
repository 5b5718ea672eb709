use crate::error::ValuationError;
use crate::growth::{GrowthEstimate, GrowthRateUnavailable, estimate_fcf_growth};
use crate::wacc::WaccBreakdown;
use configuration::ValuationAssumptions;
use core_types::{FundamentalsSnapshot, LineItem};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareCountSource {
    /// Shares issued as reported in the snapshot.
    Reported,
    /// Equity value over the current price. Circular, used only without a reported count.
    DerivedFromPrice,
}

/// The figures behind a successful DCF valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfValuation {
    pub growth_rate: Decimal,
    pub growth_basis_years: u32,
    pub wacc: Decimal,
    pub terminal_growth_rate: Decimal,
    /// FCF for years 1..=n of the explicit horizon.
    pub projected_fcf: Vec<Decimal>,
    pub pv_of_cash_flows: Decimal,
    pub terminal_value: Decimal,
    pub pv_of_terminal_value: Decimal,
    pub enterprise_value: Decimal,
    pub equity_value: Decimal,
    pub shares_outstanding: Decimal,
    pub share_count_source: ShareCountSource,
    pub fair_value_per_share: Decimal,
}

/// Why no fair value could be produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DcfFailure {
    GrowthRate(GrowthRateUnavailable),
    TerminalValueUndefined {
        wacc: Decimal,
        terminal_growth_rate: Decimal,
    },
    ShareCountUnavailable { equity_value: Decimal },
}

impl fmt::Display for DcfFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DcfFailure::GrowthRate(unavailable) => write!(f, "{unavailable}"),
            DcfFailure::TerminalValueUndefined {
                wacc,
                terminal_growth_rate,
            } => write!(
                f,
                "terminal value is undefined: WACC {wacc} does not exceed terminal growth rate {terminal_growth_rate}"
            ),
            DcfFailure::ShareCountUnavailable { equity_value } => write!(
                f,
                "share count cannot be derived from the current price for an equity value of {equity_value}"
            ),
        }
    }
}

/// Either a fair value per share or the reason there is none. Never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum DcfResult {
    FairValue(DcfValuation),
    Unavailable(DcfFailure),
}

impl DcfResult {
    pub fn fair_value(&self) -> Option<Decimal> {
        match self {
            DcfResult::FairValue(valuation) => Some(valuation.fair_value_per_share),
            DcfResult::Unavailable(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&DcfFailure> {
        match self {
            DcfResult::FairValue(_) => None,
            DcfResult::Unavailable(failure) => Some(failure),
        }
    }
}

/// Perpetuity-growth terminal value at the end of the explicit horizon.
///
/// TV = FCF_n × (1 + g) / (wacc − g)
///
/// Undefined when `wacc <= g`.
pub fn terminal_value(
    final_fcf: Decimal,
    wacc: Decimal,
    terminal_growth_rate: Decimal,
) -> Result<Decimal, ValuationError> {
    if wacc <= terminal_growth_rate {
        return Err(ValuationError::UndefinedValuation(format!(
            "WACC {wacc} must exceed the terminal growth rate {terminal_growth_rate}"
        )));
    }
    final_fcf
        .checked_mul(Decimal::ONE + terminal_growth_rate)
        .and_then(|numerator| numerator.checked_div(wacc - terminal_growth_rate))
        .ok_or_else(|| overflow("terminal value"))
}

/// A stateless DCF calculator.
#[derive(Debug, Default)]
pub struct CashFlowProjector {}

impl CashFlowProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values the company's equity per share.
    ///
    /// # Arguments
    ///
    /// * `wacc` - The discount rate, as a fraction.
    /// * `terminal_growth_rate` - Perpetual growth after the horizon, as a fraction.
    /// * `high_growth_years` - Length of the explicit projection horizon (at least 1).
    /// * `current_price` - Only used to derive a share count when the snapshot has none.
    ///
    /// # Returns
    ///
    /// * `Ok(DcfResult::FairValue(_))` - the valuation and its intermediate figures.
    /// * `Ok(DcfResult::Unavailable(_))` - the growth rate, terminal value or share
    ///   count could not be established.
    /// * `Err(ValuationError)` - the inputs are invalid.
    pub fn dcf_fair_value(
        &self,
        fundamentals: &FundamentalsSnapshot,
        wacc: Decimal,
        terminal_growth_rate: Decimal,
        high_growth_years: u32,
        current_price: Decimal,
    ) -> Result<DcfResult, ValuationError> {
        if high_growth_years == 0 {
            return Err(ValuationError::InvalidInput(
                "high growth period must be at least one year".to_string(),
            ));
        }

        // --- 1. Growth rate ---
        let (growth_rate, growth_basis_years) = match estimate_fcf_growth(fundamentals) {
            GrowthEstimate::Estimated { rate, basis_years } => (rate, basis_years),
            GrowthEstimate::Unavailable(unavailable) => {
                return Ok(DcfResult::Unavailable(DcfFailure::GrowthRate(unavailable)));
            }
        };
        // The estimator only succeeds with a positive latest FCF.
        let latest_fcf = fundamentals
            .free_cash_flow
            .latest
            .ok_or_else(|| ValuationError::Calculation("latest FCF vanished".to_string()))?;

        // --- 2. Explicit-period cash flows ---
        let growth_factor = Decimal::ONE + growth_rate;
        let discount_factor = Decimal::ONE + wacc;
        let mut projected_fcf = Vec::with_capacity(high_growth_years as usize);
        let mut fcf = latest_fcf;
        let mut compounded_discount = Decimal::ONE;
        let mut pv_of_cash_flows = Decimal::ZERO;
        for _ in 0..high_growth_years {
            fcf = fcf
                .checked_mul(growth_factor)
                .ok_or_else(|| overflow("projected FCF"))?;
            compounded_discount = compounded_discount
                .checked_mul(discount_factor)
                .ok_or_else(|| overflow("discount factor"))?;
            let pv = fcf
                .checked_div(compounded_discount)
                .ok_or_else(|| overflow("present value"))?;
            pv_of_cash_flows += pv;
            projected_fcf.push(fcf);
        }

        // --- 3. Terminal value ---
        let terminal_value = match terminal_value(fcf, wacc, terminal_growth_rate) {
            Ok(tv) => tv,
            Err(ValuationError::UndefinedValuation(message)) => {
                tracing::warn!(%wacc, %terminal_growth_rate, %message, "Terminal value is undefined");
                return Ok(DcfResult::Unavailable(DcfFailure::TerminalValueUndefined {
                    wacc,
                    terminal_growth_rate,
                }));
            }
            Err(e) => return Err(e),
        };
        let pv_of_terminal_value = terminal_value
            .checked_div(compounded_discount)
            .ok_or_else(|| overflow("present value of terminal value"))?;

        // --- 4. Enterprise and equity value ---
        let enterprise_value = pv_of_cash_flows
            .checked_add(pv_of_terminal_value)
            .ok_or_else(|| overflow("enterprise value"))?;
        let equity_value = enterprise_value
            .checked_sub(fundamentals.value(LineItem::TotalDebt))
            .and_then(|v| v.checked_add(fundamentals.value(LineItem::CashAndEquivalents)))
            .ok_or_else(|| overflow("equity value"))?;

        // --- 5. Shares outstanding ---
        let (shares_outstanding, share_count_source) = match fundamentals
            .reported(LineItem::SharesIssued)
            .filter(|shares| *shares > Decimal::ZERO)
        {
            Some(shares) => (shares, ShareCountSource::Reported),
            None => {
                if current_price <= Decimal::ZERO {
                    return Err(ValuationError::InvalidInput(format!(
                        "current price must be positive to derive a share count, got {current_price}"
                    )));
                }
                let derived = equity_value
                    .checked_div(current_price)
                    .ok_or_else(|| overflow("derived share count"))?;
                if derived <= Decimal::ZERO {
                    return Ok(DcfResult::Unavailable(DcfFailure::ShareCountUnavailable {
                        equity_value,
                    }));
                }
                tracing::warn!(%derived, "No reported share count, deriving it from the current price");
                (derived, ShareCountSource::DerivedFromPrice)
            }
        };

        let fair_value_per_share = equity_value
            .checked_div(shares_outstanding)
            .ok_or_else(|| overflow("fair value per share"))?;
        tracing::debug!(
            %growth_rate,
            %enterprise_value,
            %equity_value,
            %fair_value_per_share,
            "Computed DCF fair value"
        );

        Ok(DcfResult::FairValue(DcfValuation {
            growth_rate,
            growth_basis_years,
            wacc,
            terminal_growth_rate,
            projected_fcf,
            pv_of_cash_flows,
            terminal_value,
            pv_of_terminal_value,
            enterprise_value,
            equity_value,
            shares_outstanding,
            share_count_source,
            fair_value_per_share,
        }))
    }

    /// Runs the DCF with a computed WACC and the configured assumptions.
    pub fn project(
        &self,
        fundamentals: &FundamentalsSnapshot,
        wacc: &WaccBreakdown,
        assumptions: &ValuationAssumptions,
        current_price: Decimal,
    ) -> Result<DcfResult, ValuationError> {
        self.dcf_fair_value(
            fundamentals,
            wacc.wacc,
            assumptions.terminal_growth_rate(),
            assumptions.high_growth_period_years,
            current_price,
        )
    }
}

fn overflow(what: &str) -> ValuationError {
    ValuationError::Calculation(format!("{what} overflowed"))
}

/// Convenience function: runs the DCF with a throwaway projector.
pub fn dcf_fair_value(
    fundamentals: &FundamentalsSnapshot,
    wacc: Decimal,
    terminal_growth_rate: Decimal,
    high_growth_years: u32,
    current_price: Decimal,
) -> Result<DcfResult, ValuationError> {
    CashFlowProjector::new().dcf_fair_value(
        fundamentals,
        wacc,
        terminal_growth_rate,
        high_growth_years,
        current_price,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Flat FCF of 100 (zero growth) with 10 shares and no debt or cash.
    fn flat_company() -> FundamentalsSnapshot {
        FundamentalsSnapshot::new()
            .with(LineItem::SharesIssued, dec!(10))
            .with_free_cash_flow(&[Some(dec!(100)), Some(dec!(100))])
    }

    fn valuation(result: DcfResult) -> DcfValuation {
        match result {
            DcfResult::FairValue(v) => v,
            DcfResult::Unavailable(reason) => panic!("expected a fair value, got {reason}"),
        }
    }

    #[test]
    fn test_terminal_value_formula() {
        assert_eq!(terminal_value(dec!(100), dec!(0.10), dec!(0.02)).unwrap(), dec!(1275));
    }

    #[test]
    fn test_terminal_value_undefined_at_or_below_growth() {
        assert!(matches!(
            terminal_value(dec!(100), dec!(0.03), dec!(0.03)),
            Err(ValuationError::UndefinedValuation(_))
        ));
        assert!(terminal_value(dec!(100), dec!(0.02), dec!(0.03)).is_err());
    }

    #[test]
    fn test_single_year_projection_by_hand() {
        // g = 0, wacc = 0.25, tg = 0: FCF_1 = 100, PV = 80, TV = 400, PV(TV) = 320.
        let v = valuation(dcf_fair_value(&flat_company(), dec!(0.25), dec!(0), 1, dec!(50)).unwrap());
        assert_eq!(v.projected_fcf, vec![dec!(100)]);
        assert_eq!(v.pv_of_cash_flows, dec!(80));
        assert_eq!(v.terminal_value, dec!(400));
        assert_eq!(v.pv_of_terminal_value, dec!(320));
        assert_eq!(v.enterprise_value, dec!(400));
        assert_eq!(v.share_count_source, ShareCountSource::Reported);
        assert_eq!(v.fair_value_per_share, dec!(40));
    }

    #[test]
    fn test_growth_compounds_over_horizon() {
        let fundamentals = FundamentalsSnapshot::new()
            .with(LineItem::SharesIssued, dec!(1))
            .with_free_cash_flow(&[Some(dec!(110)), Some(dec!(100))]);
        let v = valuation(dcf_fair_value(&fundamentals, dec!(0.2), dec!(0.02), 3, dec!(1)).unwrap());
        assert_eq!(v.growth_rate, dec!(0.1));
        assert_eq!(v.projected_fcf, vec![dec!(121), dec!(133.1), dec!(146.41)]);
    }

    #[test]
    fn test_debt_and_cash_adjust_equity() {
        let fundamentals = flat_company()
            .with(LineItem::TotalDebt, dec!(100))
            .with(LineItem::CashAndEquivalents, dec!(30));
        let v = valuation(dcf_fair_value(&fundamentals, dec!(0.25), dec!(0), 1, dec!(50)).unwrap());
        assert_eq!(v.equity_value, dec!(330));
        assert_eq!(v.fair_value_per_share, dec!(33));
    }

    #[test]
    fn test_wacc_equal_to_terminal_growth_is_undefined() {
        let result = dcf_fair_value(&flat_company(), dec!(0.03), dec!(0.03), 5, dec!(50)).unwrap();
        assert_eq!(result.fair_value(), None);
        assert!(matches!(
            result.failure(),
            Some(DcfFailure::TerminalValueUndefined { .. })
        ));
    }

    #[test]
    fn test_growth_failure_propagates() {
        let fundamentals = FundamentalsSnapshot::new()
            .with_free_cash_flow(&[Some(dec!(-10)), Some(dec!(100))]);
        let result = dcf_fair_value(&fundamentals, dec!(0.1), dec!(0.02), 5, dec!(50)).unwrap();
        match result {
            DcfResult::Unavailable(DcfFailure::GrowthRate(u)) => {
                assert_eq!(u.reason, "growth rate cannot be estimated due to negative/insufficient FCF")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_fair_value_strictly_decreases_with_wacc() {
        let fundamentals = FundamentalsSnapshot::new()
            .with(LineItem::SharesIssued, dec!(50))
            .with(LineItem::TotalDebt, dec!(200))
            .with(LineItem::CashAndEquivalents, dec!(80))
            .with_free_cash_flow(&[Some(dec!(121)), Some(dec!(110)), Some(dec!(100))]);
        let fair_values: Vec<Decimal> = [dec!(0.05), dec!(0.07), dec!(0.09), dec!(0.12), dec!(0.2)]
            .into_iter()
            .map(|wacc| {
                dcf_fair_value(&fundamentals, wacc, dec!(0.025), 5, dec!(30))
                    .unwrap()
                    .fair_value()
                    .unwrap()
            })
            .collect();
        assert!(fair_values.windows(2).all(|w| w[0] > w[1]), "{fair_values:?}");
    }

    #[test]
    fn test_share_count_derived_from_price() {
        let fundamentals =
            FundamentalsSnapshot::new().with_free_cash_flow(&[Some(dec!(100)), Some(dec!(100))]);
        let v = valuation(dcf_fair_value(&fundamentals, dec!(0.25), dec!(0), 1, dec!(20)).unwrap());
        assert_eq!(v.share_count_source, ShareCountSource::DerivedFromPrice);
        assert_eq!(v.shares_outstanding, dec!(20));
        assert_eq!(v.fair_value_per_share, dec!(20));
    }

    #[test]
    fn test_tiny_share_count_overflow_is_an_error() {
        let fundamentals = FundamentalsSnapshot::new()
            .with(LineItem::SharesIssued, dec!(0.0000000000000000000000000001))
            .with(LineItem::CashAndEquivalents, dec!(10000000000))
            .with_free_cash_flow(&[Some(dec!(100)), Some(dec!(100))]);
        assert!(matches!(
            dcf_fair_value(&fundamentals, dec!(0.25), dec!(0), 1, dec!(20)),
            Err(ValuationError::Calculation(_))
        ));
    }

    #[test]
    fn test_derived_share_count_overflow_is_an_error() {
        let fundamentals = FundamentalsSnapshot::new()
            .with(LineItem::CashAndEquivalents, dec!(10000000000))
            .with_free_cash_flow(&[Some(dec!(100)), Some(dec!(100))]);
        assert!(matches!(
            dcf_fair_value(&fundamentals, dec!(0.25), dec!(0), 1, dec!(0.0000000000000000000000000001)),
            Err(ValuationError::Calculation(_))
        ));
    }

    #[test]
    fn test_derived_share_count_needs_positive_price() {
        let fundamentals =
            FundamentalsSnapshot::new().with_free_cash_flow(&[Some(dec!(100)), Some(dec!(100))]);
        assert!(matches!(
            dcf_fair_value(&fundamentals, dec!(0.25), dec!(0), 1, dec!(0)),
            Err(ValuationError::InvalidInput(_))
        ));
        // A reported share count makes the price irrelevant.
        assert!(dcf_fair_value(&flat_company(), dec!(0.25), dec!(0), 1, dec!(0)).is_ok());
    }

    #[test]
    fn test_negative_equity_leaves_share_count_unavailable() {
        let fundamentals = FundamentalsSnapshot::new()
            .with(LineItem::TotalDebt, dec!(10000))
            .with_free_cash_flow(&[Some(dec!(100)), Some(dec!(100))]);
        let result = dcf_fair_value(&fundamentals, dec!(0.25), dec!(0), 1, dec!(20)).unwrap();
        assert!(matches!(
            result.failure(),
            Some(DcfFailure::ShareCountUnavailable { .. })
        ));
    }

    #[test]
    fn test_zero_horizon_is_rejected() {
        assert!(matches!(
            dcf_fair_value(&flat_company(), dec!(0.1), dec!(0.02), 0, dec!(50)),
            Err(ValuationError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_project_uses_assumption_percentages() {
        let assumptions = ValuationAssumptions {
            terminal_growth_rate_pct: dec!(0),
            high_growth_period_years: 1,
            ..Default::default()
        };
        let wacc = WaccBreakdown {
            cost_of_equity: dec!(0.25),
            cost_of_debt: dec!(0.04),
            cost_of_debt_source: crate::wacc::CostOfDebtSource::RiskFreeFallback,
            tax_rate: dec!(0.3),
            tax_rate_source: crate::wacc::TaxRateSource::Default,
            weight_of_debt: dec!(0),
            weight_of_equity: dec!(1),
            wacc: dec!(0.25),
        };
        let result = CashFlowProjector::new()
            .project(&flat_company(), &wacc, &assumptions, dec!(50))
            .unwrap();
        assert_eq!(result.fair_value(), Some(dec!(40)));
    }
}
