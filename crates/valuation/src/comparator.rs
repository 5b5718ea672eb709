use crate::error::ValuationError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapLabel {
    /// The price is below fair value.
    Discount,
    /// The price is at or above fair value.
    Premium,
}

/// How far the current price sits from the fair value.
///
/// `gap_pct` is the magnitude in percent; `label` carries the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationGap {
    pub current_price: Decimal,
    pub fair_value: Decimal,
    pub gap_pct: Decimal,
    pub label: GapLabel,
}

#[derive(Debug, Default)]
pub struct FairValueComparator {}

impl FairValueComparator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expresses the gap between `current_price` and `fair_value`.
    ///
    /// Discount = (1 − price / fair) × 100 when fair > price, otherwise
    /// Premium = (price / fair − 1) × 100.
    pub fn compare(
        &self,
        current_price: Decimal,
        fair_value: Decimal,
    ) -> Result<ValuationGap, ValuationError> {
        if fair_value <= Decimal::ZERO {
            return Err(ValuationError::InvalidInput(format!(
                "fair value must be positive, got {fair_value}"
            )));
        }
        if current_price <= Decimal::ZERO {
            return Err(ValuationError::InvalidInput(format!(
                "current price must be positive, got {current_price}"
            )));
        }

        let ratio = current_price / fair_value;
        let (gap_pct, label) = if fair_value > current_price {
            ((Decimal::ONE - ratio) * dec!(100), GapLabel::Discount)
        } else {
            ((ratio - Decimal::ONE) * dec!(100), GapLabel::Premium)
        };

        Ok(ValuationGap {
            current_price,
            fair_value,
            gap_pct,
            label,
        })
    }
}

/// Convenience function: compares with a throwaway comparator.
pub fn compare(current_price: Decimal, fair_value: Decimal) -> Result<ValuationGap, ValuationError> {
    FairValueComparator::new().compare(current_price, fair_value)
}
