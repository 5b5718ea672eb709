use crate::error::TechnicalsError;
use core_types::PriceSeries;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// One EMA line together with the span that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmaLine {
    pub span: usize,
    pub values: Vec<Decimal>,
}

/// Trend indicator calculator.
#[derive(Debug, Default)]
pub struct TrendIndicatorEngine;

impl TrendIndicatorEngine {
    pub fn new() -> Self {
        Self
    }

    /// Exponential moving average of the closes.
    ///
    /// EMA_0 = close_0, EMA_t = α × close_t + (1 − α) × EMA_{t−1}, α = 2 / (span + 1)
    ///
    /// Returns one value per bar.
    pub fn ema(&self, series: &PriceSeries, span: usize) -> Result<Vec<Decimal>, TechnicalsError> {
        self.ema_of(&series.closes(), span)
    }

    /// Same recursion over an arbitrary slice of values.
    pub fn ema_of(&self, values: &[Decimal], span: usize) -> Result<Vec<Decimal>, TechnicalsError> {
        if span == 0 {
            return Err(TechnicalsError::InvalidInput(
                "EMA span must be greater than 0".to_string(),
            ));
        }
        let Some((&first, rest)) = values.split_first() else {
            return Err(TechnicalsError::InsufficientData {
                required: 1,
                provided: 0,
            });
        };

        let alpha = dec!(2) / Decimal::from(span + 1);
        let mut result = Vec::with_capacity(values.len());
        let mut prev = first;
        result.push(prev);
        for &value in rest {
            // Written as a correction to `prev` so a constant input stays exact.
            prev += alpha * (value - prev);
            result.push(prev);
        }
        Ok(result)
    }

    /// Computes one EMA line per span, in the order given.
    pub fn ema_set(
        &self,
        series: &PriceSeries,
        spans: &[usize],
    ) -> Result<Vec<EmaLine>, TechnicalsError> {
        let closes = series.closes();
        let lines = spans
            .iter()
            .map(|&span| {
                self.ema_of(&closes, span)
                    .map(|values| EmaLine { span, values })
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(?spans, bars = closes.len(), "Computed EMA set");
        Ok(lines)
    }
}

/// Convenience function: EMA of the closes of `series`.
pub fn ema(series: &PriceSeries, span: usize) -> Result<Vec<Decimal>, TechnicalsError> {
    TrendIndicatorEngine::new().ema(series, span)
}
