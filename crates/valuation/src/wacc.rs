use crate::error::ValuationError;
use configuration::{ValuationAssumptions, ValuationPolicy};
use core_types::{FundamentalsSnapshot, LineItem};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Default tax rate of the standard valuation variant.
pub const STANDARD_DEFAULT_TAX_RATE: Decimal = dec!(0.30);
/// Default tax rate of the alternate valuation variant (US statutory rate).
pub const ALTERNATE_DEFAULT_TAX_RATE: Decimal = dec!(0.21);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostOfDebtSource {
    /// Interest expense over total debt.
    Reported,
    /// No usable debt figures, the risk-free rate stands in.
    RiskFreeFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRateSource {
    /// Tax provision over pretax income.
    Effective,
    /// Pretax income was zero, the configured default applies.
    Default,
}

/// Every intermediate figure of a WACC calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaccBreakdown {
    pub cost_of_equity: Decimal,
    pub cost_of_debt: Decimal,
    pub cost_of_debt_source: CostOfDebtSource,
    pub tax_rate: Decimal,
    pub tax_rate_source: TaxRateSource,
    pub weight_of_debt: Decimal,
    pub weight_of_equity: Decimal,
    pub wacc: Decimal,
}

/// A stateless WACC calculator.
///
/// The tax rate used when pretax income is zero is an explicit constructor
/// argument; see `STANDARD_DEFAULT_TAX_RATE` and `ALTERNATE_DEFAULT_TAX_RATE`.
#[derive(Debug, Clone)]
pub struct CapitalStructureEstimator {
    default_tax_rate: Decimal,
}

impl CapitalStructureEstimator {
    pub fn new(default_tax_rate: Decimal) -> Result<Self, ValuationError> {
        if default_tax_rate < Decimal::ZERO || default_tax_rate >= Decimal::ONE {
            return Err(ValuationError::InvalidInput(format!(
                "default tax rate must be in [0, 1), got {default_tax_rate}"
            )));
        }
        Ok(Self { default_tax_rate })
    }

    pub fn from_policy(policy: &ValuationPolicy) -> Result<Self, ValuationError> {
        Self::new(policy.default_tax_rate)
    }

    pub fn default_tax_rate(&self) -> Decimal {
        self.default_tax_rate
    }

    /// Computes the WACC.
    ///
    /// # Arguments
    ///
    /// * `risk_free_rate` - As a fraction (0.04 is 4%).
    /// * `market_risk_premium_pct` - In percent (5 is 5%).
    /// * `beta` - The equity beta.
    ///
    /// The result is not bounds-checked; the DCF guards against a WACC at or below
    /// the terminal growth rate.
    pub fn wacc(
        &self,
        fundamentals: &FundamentalsSnapshot,
        risk_free_rate: Decimal,
        market_risk_premium_pct: Decimal,
        beta: Decimal,
    ) -> WaccBreakdown {
        // --- Cost of equity (CAPM) ---
        let cost_of_equity = risk_free_rate + beta * (market_risk_premium_pct / dec!(100));

        // --- Cost of debt ---
        // Providers report interest expense as a negative number.
        let interest_expense = fundamentals.value(LineItem::InterestExpense).abs();
        let total_debt = fundamentals.value(LineItem::TotalDebt);
        let (cost_of_debt, cost_of_debt_source) =
            if !interest_expense.is_zero() && !total_debt.is_zero() {
                (interest_expense / total_debt, CostOfDebtSource::Reported)
            } else {
                (risk_free_rate, CostOfDebtSource::RiskFreeFallback)
            };

        // --- Tax rate ---
        let pretax_income = fundamentals.value(LineItem::PretaxIncome);
        let (tax_rate, tax_rate_source) = if !pretax_income.is_zero() {
            (
                fundamentals.value(LineItem::TaxProvision) / pretax_income,
                TaxRateSource::Effective,
            )
        } else {
            tracing::warn!(
                default_tax_rate = %self.default_tax_rate,
                "Pretax income is zero, using the default tax rate"
            );
            (self.default_tax_rate, TaxRateSource::Default)
        };

        // --- Capital weights ---
        let total_equity = fundamentals.value(LineItem::CommonEquity);
        let total_capital = total_debt + total_equity;
        let (weight_of_debt, weight_of_equity) = if total_capital.is_zero() {
            (Decimal::ZERO, Decimal::ONE)
        } else {
            let weight_of_debt = total_debt / total_capital;
            (weight_of_debt, Decimal::ONE - weight_of_debt)
        };

        let wacc = weight_of_equity * cost_of_equity
            + weight_of_debt * cost_of_debt * (Decimal::ONE - tax_rate);

        tracing::debug!(
            %cost_of_equity,
            %cost_of_debt,
            %tax_rate,
            %weight_of_debt,
            %wacc,
            "Computed WACC"
        );

        WaccBreakdown {
            cost_of_equity,
            cost_of_debt,
            cost_of_debt_source,
            tax_rate,
            tax_rate_source,
            weight_of_debt,
            weight_of_equity,
            wacc,
        }
    }

    /// Computes the WACC from the market inputs of `assumptions`.
    pub fn estimate(
        &self,
        fundamentals: &FundamentalsSnapshot,
        assumptions: &ValuationAssumptions,
    ) -> WaccBreakdown {
        self.wacc(
            fundamentals,
            assumptions.risk_free_rate,
            assumptions.market_risk_premium_pct,
            assumptions.beta,
        )
    }
}
