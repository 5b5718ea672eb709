use crate::error::AnalyticsError;
use crate::report::{AnalysisReport, ValuationSection};
use configuration::Config;
use core_types::{FundamentalsSnapshot, PriceSeries, format_ticker};
use rust_decimal::Decimal;
use technicals::{PriceLevelCalculator, TrendIndicatorEngine, VolumeProfileAnalyzer};
use valuation::{
    CapitalStructureEstimator, CashFlowProjector, DcfResult, FairValueComparator,
    estimate_fcf_growth,
};

/// Runs every calculator for one ticker.
#[derive(Debug)]
pub struct AnalysisEngine {
    config: Config,
    levels: PriceLevelCalculator,
    trend: TrendIndicatorEngine,
    profile: VolumeProfileAnalyzer,
    capital: CapitalStructureEstimator,
    projector: CashFlowProjector,
    comparator: FairValueComparator,
}

impl AnalysisEngine {
    /// Validates `config` and builds the calculators it parameterizes.
    pub fn new(config: Config) -> Result<Self, AnalyticsError> {
        config.validate()?;
        Ok(Self {
            profile: VolumeProfileAnalyzer::from_settings(&config.technicals)?,
            capital: CapitalStructureEstimator::from_policy(&config.valuation)?,
            levels: PriceLevelCalculator::new(),
            trend: TrendIndicatorEngine::new(),
            projector: CashFlowProjector::new(),
            comparator: FairValueComparator::new(),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The main entry point for analysing a ticker.
    ///
    /// # Arguments
    ///
    /// * `ticker` - Normalized with `format_ticker` and carried into the report.
    /// * `series` - The daily price history; its last close is the current price.
    /// * `fundamentals` - The financial-statement snapshot.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AnalysisReport` or an `AnalyticsError`. A DCF that
    /// cannot produce a fair value still yields a report, with the reason recorded.
    pub fn run(
        &self,
        ticker: &str,
        series: &PriceSeries,
        fundamentals: &FundamentalsSnapshot,
    ) -> Result<AnalysisReport, AnalyticsError> {
        let (as_of, current_price) = series
            .bars()
            .last()
            .map(|bar| (bar.date, bar.close))
            .ok_or_else(|| AnalyticsError::NotEnoughData("price series is empty".to_string()))?;

        let ticker = format_ticker(ticker);
        let ticker = ticker.as_str();
        tracing::info!(ticker, bars = series.len(), %current_price, "Running analysis");

        let levels = self
            .levels
            .compute_from_settings(current_price, &self.config.levels)?;
        let trend = self.trend.ema_set(series, &self.config.technicals.ema_spans)?;
        let volume_profile = self.profile.analyze(series)?;
        let valuation = self.value(fundamentals, current_price)?;

        match &valuation.unavailable_reason {
            Some(reason) => tracing::info!(ticker, reason, "No fair value"),
            None => tracing::info!(ticker, fair_value = ?valuation.fair_value(), "Analysis complete"),
        }

        Ok(AnalysisReport {
            ticker: ticker.to_string(),
            as_of,
            current_price,
            levels,
            trend,
            volume_profile,
            valuation,
        })
    }

    fn value(
        &self,
        fundamentals: &FundamentalsSnapshot,
        current_price: Decimal,
    ) -> Result<ValuationSection, AnalyticsError> {
        let assumptions = &self.config.assumptions;
        let wacc = self.capital.estimate(fundamentals, assumptions);
        let growth = estimate_fcf_growth(fundamentals);
        let dcf = self
            .projector
            .project(fundamentals, &wacc, assumptions, current_price)?;

        let (gap, unavailable_reason) = match &dcf {
            DcfResult::FairValue(v) if v.fair_value_per_share > Decimal::ZERO => (
                Some(self.comparator.compare(current_price, v.fair_value_per_share)?),
                None,
            ),
            DcfResult::FairValue(v) => (
                None,
                Some(format!(
                    "fair value of {} per share is not positive",
                    v.fair_value_per_share
                )),
            ),
            DcfResult::Unavailable(failure) => (None, Some(failure.to_string())),
        };

        Ok(ValuationSection {
            wacc,
            growth,
            dcf,
            gap,
            unavailable_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{LineItem, PriceBar};
    use rust_decimal_macros::dec;
    use technicals::Level;
    use valuation::GapLabel;

    fn series(closes: &[Decimal]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        PriceSeries::new(
            closes
                .iter()
                .enumerate()
                .map(|(i, &close)| PriceBar {
                    date: start + chrono::Days::new(i as u64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: dec!(1000),
                })
                .collect(),
        )
        .unwrap()
    }

    fn healthy_company() -> FundamentalsSnapshot {
        FundamentalsSnapshot::new()
            .with(LineItem::TotalDebt, dec!(100))
            .with(LineItem::CommonEquity, dec!(900))
            .with(LineItem::InterestExpense, dec!(5))
            .with(LineItem::TaxProvision, dec!(21))
            .with(LineItem::PretaxIncome, dec!(100))
            .with(LineItem::CashAndEquivalents, dec!(50))
            .with(LineItem::SharesIssued, dec!(100))
            .with_free_cash_flow(&[Some(dec!(121)), Some(dec!(110)), Some(dec!(100))])
    }

    #[test]
    fn test_report_uses_last_close() {
        let engine = AnalysisEngine::new(Config::default()).unwrap();
        let report = engine
            .run("ACME", &series(&[dec!(10), dec!(11), dec!(12)]), &healthy_company())
            .unwrap();
        assert_eq!(report.ticker, "ACME");
        assert_eq!(report.current_price, dec!(12));
        assert_eq!(report.as_of, NaiveDate::from_ymd_opt(2024, 6, 5).unwrap());
        assert_eq!(report.levels.strike, Level::Price(dec!(10.8)));
        assert_eq!(report.trend.len(), 3);
        assert!(report.trend.iter().all(|line| line.values.len() == 3));
        assert_eq!(report.volume_profile.total_volume, dec!(3000));
    }

    #[test]
    fn test_fair_value_yields_gap() {
        let engine = AnalysisEngine::new(Config::default()).unwrap();
        let report = engine
            .run("ACME", &series(&[dec!(10), dec!(12)]), &healthy_company())
            .unwrap();
        let fair_value = report.valuation.fair_value().unwrap();
        let gap = report.valuation.gap.unwrap();
        assert_eq!(gap.fair_value, fair_value);
        assert_eq!(
            gap.label,
            if fair_value > dec!(12) { GapLabel::Discount } else { GapLabel::Premium }
        );
        assert!(report.valuation.unavailable_reason.is_none());
    }

    #[test]
    fn test_unestimable_growth_is_reported_not_raised() {
        let engine = AnalysisEngine::new(Config::default()).unwrap();
        let fundamentals = healthy_company().with_free_cash_flow(&[Some(dec!(-3)), Some(dec!(10))]);
        let report = engine
            .run("ACME", &series(&[dec!(10), dec!(12)]), &fundamentals)
            .unwrap();
        assert!(report.valuation.gap.is_none());
        assert_eq!(report.valuation.growth.rate(), None);
        assert_eq!(
            report.valuation.unavailable_reason.as_deref(),
            Some("growth rate cannot be estimated due to negative/insufficient FCF")
        );
    }

    #[test]
    fn test_numeric_ticker_is_reported_as_hong_kong_symbol() {
        let engine = AnalysisEngine::new(Config::default()).unwrap();
        let report = engine
            .run("700", &series(&[dec!(300), dec!(310)]), &healthy_company())
            .unwrap();
        assert_eq!(report.ticker, "0700.HK");
    }

    #[test]
    fn test_empty_series_is_an_error() {
        let engine = AnalysisEngine::new(Config::default()).unwrap();
        let result = engine.run("ACME", &PriceSeries::default(), &healthy_company());
        assert!(matches!(result, Err(AnalyticsError::NotEnoughData(_))));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.technicals.profile_bins = 0;
        assert!(matches!(AnalysisEngine::new(config), Err(AnalyticsError::Config(_))));
    }
}
