//! # Lodestar Technicals
//!
//! Price-based reference levels for a single ticker: the structured-product
//! thresholds derived from the current price, exponential moving averages of the
//! close, and the volume-at-price profile.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It depends only on `core-types`
//!   and `configuration`, performs no I/O, and holds no state between calls.
//! - **Independent Calculators:** None of the calculators calls another; the
//!   `analytics` crate sequences them.
//!
//! ## Public API
//!
//! - `PriceLevelCalculator` / `compute_levels`: strike, airbag and knock-out prices.
//! - `TrendIndicatorEngine` / `ema`: exponential moving averages.
//! - `VolumeProfileAnalyzer` / `volume_profile`: binned volume, POC and value area.
//! - `TechnicalsError`: the error types returned from this crate.

pub mod error;
pub mod levels;
pub mod trend;
pub mod volume_profile;

pub use error::TechnicalsError;
pub use levels::{Level, LevelKind, PriceLevelCalculator, PriceLevels, compute_levels};
pub use trend::{EmaLine, TrendIndicatorEngine, ema};
pub use volume_profile::{
    DEFAULT_BIN_COUNT, DEFAULT_VALUE_AREA_RATIO, ProfileBin, VolumeProfile, VolumeProfileAnalyzer,
    volume_profile,
};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use core_types::{PriceBar, PriceSeries};
    use rust_decimal::Decimal;

    /// Builds a daily series from `(close, volume)` pairs with a one-point range around each close.
    pub fn series(points: &[(Decimal, Decimal)]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = points
            .iter()
            .enumerate()
            .map(|(i, &(close, volume))| PriceBar {
                date: start + chrono::Days::new(i as u64),
                open: close,
                high: close + Decimal::ONE,
                low: (close - Decimal::ONE).max(Decimal::ZERO),
                close,
                volume,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }
}
