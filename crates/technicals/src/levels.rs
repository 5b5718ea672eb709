use crate::error::TechnicalsError;
use configuration::LevelSettings;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Identifies one of the three structured-product thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    Strike,
    Airbag,
    Knockout,
}

/// A threshold that is either drawn at a price or switched off.
///
/// `Disabled` is distinct from `Price(0)`: a zero percentage means "not used".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "price", rename_all = "snake_case")]
pub enum Level {
    Disabled,
    Price(Decimal),
}

impl Level {
    pub fn price(&self) -> Option<Decimal> {
        match self {
            Level::Disabled => None,
            Level::Price(p) => Some(*p),
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Level::Disabled)
    }
}

/// Absolute strike, airbag and knock-out prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevels {
    pub strike: Level,
    pub airbag: Level,
    pub knockout: Level,
}

impl PriceLevels {
    /// The levels in strike, airbag, knock-out order.
    pub fn iter(&self) -> impl Iterator<Item = (LevelKind, Level)> {
        [
            (LevelKind::Strike, self.strike),
            (LevelKind::Airbag, self.airbag),
            (LevelKind::Knockout, self.knockout),
        ]
        .into_iter()
    }
}

/// A stateless calculator turning percentages of the current price into thresholds.
#[derive(Debug, Default)]
pub struct PriceLevelCalculator {}

impl PriceLevelCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the three levels.
    ///
    /// Percentages are taken as-is: values above 100 place a level above the current
    /// price, negative values are not clamped.
    pub fn compute(
        &self,
        current_price: Decimal,
        strike_pct: Decimal,
        airbag_pct: Decimal,
        knockout_pct: Decimal,
    ) -> Result<PriceLevels, TechnicalsError> {
        if current_price <= Decimal::ZERO {
            return Err(TechnicalsError::InvalidInput(format!(
                "current price must be positive, got {current_price}"
            )));
        }

        let levels = PriceLevels {
            strike: level_at(current_price, strike_pct),
            airbag: level_at(current_price, airbag_pct),
            knockout: level_at(current_price, knockout_pct),
        };
        tracing::debug!(%current_price, ?levels, "Computed price levels");
        Ok(levels)
    }

    /// Computes the levels from the configured percentages.
    pub fn compute_from_settings(
        &self,
        current_price: Decimal,
        settings: &LevelSettings,
    ) -> Result<PriceLevels, TechnicalsError> {
        self.compute(
            current_price,
            settings.strike_pct,
            settings.airbag_pct,
            settings.knockout_pct,
        )
    }
}

fn level_at(current_price: Decimal, pct: Decimal) -> Level {
    if pct.is_zero() {
        Level::Disabled
    } else {
        Level::Price(current_price * (pct / dec!(100)))
    }
}

/// Convenience function: computes the levels with a throwaway calculator.
pub fn compute_levels(
    current_price: Decimal,
    strike_pct: Decimal,
    airbag_pct: Decimal,
    knockout_pct: Decimal,
) -> Result<PriceLevels, TechnicalsError> {
    PriceLevelCalculator::new().compute(current_price, strike_pct, airbag_pct, knockout_pct)
}
