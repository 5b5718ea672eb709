use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single daily OHLCV bar.
///
/// Rows with missing fields are dropped by the data layer before they reach
/// this type, so every field is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl PriceBar {
    /// Creates a validated bar.
    pub fn new(
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Result<Self, CoreError> {
        let bar = Self { date, open, high, low, close, volume };
        bar.validate()?;
        Ok(bar)
    }

    /// Checks the bar for impossible values (negative prices or volume, inverted range).
    pub fn validate(&self) -> Result<(), CoreError> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| *p < Decimal::ZERO) {
            return Err(CoreError::InvalidInput(
                format!("bar {}", self.date),
                "prices must not be negative".to_string(),
            ));
        }
        if self.volume < Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                format!("bar {}", self.date),
                "volume must not be negative".to_string(),
            ));
        }
        if self.low > self.high {
            return Err(CoreError::InvalidInput(
                format!("bar {}", self.date),
                format!("low {} is above high {}", self.low, self.high),
            ));
        }
        Ok(())
    }
}

/// A chronologically ordered daily price history.
///
/// Dates are strictly increasing. An empty series can be constructed, but every
/// price-based computation rejects it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, CoreError> {
        for bar in &bars {
            bar.validate()?;
        }
        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(CoreError::InvalidInput(
                "price series".to_string(),
                format!(
                    "dates must be strictly increasing, found {} after {}",
                    pair[1].date, pair[0].date
                ),
            ));
        }
        tracing::debug!(bars = bars.len(), "Constructed price series");
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The closing prices in chronological order.
    pub fn closes(&self) -> Vec<Decimal> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// The most recent close, used as the current price.
    pub fn last_close(&self) -> Option<Decimal> {
        self.bars.last().map(|b| b.close)
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bars = Vec::<PriceBar>::deserialize(deserializer)?;
        PriceSeries::new(bars).map_err(serde::de::Error::custom)
    }
}
