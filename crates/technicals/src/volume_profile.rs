//! Volume-at-price profile of the closing prices.
//!
//! The close range is cut into equal-width, half-open bins and each bar's volume
//! is added to the bin holding its close. From the binned volume we derive:
//!
//! - **POC (Point of Control)**: the bin with the most volume.
//! - **Value Area**: the band around the POC holding the configured share
//!   (70% by default) of total volume, split evenly below and above the POC.

use crate::error::TechnicalsError;
use configuration::TechnicalSettings;
use core_types::PriceSeries;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BIN_COUNT: usize = 40;
pub const DEFAULT_VALUE_AREA_RATIO: Decimal = dec!(0.70);

/// One price bin of the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileBin {
    /// Midpoint of the bin's price interval.
    pub price_center: Decimal,
    pub volume: Decimal,
    /// Share of total volume, in percent, rounded to two places.
    pub volume_pct: Decimal,
}

/// The computed profile. Bins are in ascending price order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfile {
    pub bins: Vec<ProfileBin>,
    pub bin_width: Decimal,
    pub poc_price: Decimal,
    pub poc_index: usize,
    pub value_area_low: Decimal,
    pub value_area_high: Decimal,
    pub total_volume: Decimal,
    pub price_low: Decimal,
    pub price_high: Decimal,
}

/// Volume profile calculator.
#[derive(Debug, Clone)]
pub struct VolumeProfileAnalyzer {
    bin_count: usize,
    value_area_ratio: Decimal,
}

impl Default for VolumeProfileAnalyzer {
    fn default() -> Self {
        Self {
            bin_count: DEFAULT_BIN_COUNT,
            value_area_ratio: DEFAULT_VALUE_AREA_RATIO,
        }
    }
}

impl VolumeProfileAnalyzer {
    pub fn new(bin_count: usize) -> Result<Self, TechnicalsError> {
        if bin_count == 0 {
            return Err(TechnicalsError::InvalidInput(
                "bin count must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            bin_count,
            ..Self::default()
        })
    }

    /// Builds an analyzer from the configured bin count and value-area ratio.
    pub fn from_settings(settings: &TechnicalSettings) -> Result<Self, TechnicalsError> {
        Self::new(settings.profile_bins)?.with_value_area_ratio(settings.value_area_ratio)
    }

    /// Sets the share of total volume the value area covers. Must be in (0, 1].
    pub fn with_value_area_ratio(mut self, ratio: Decimal) -> Result<Self, TechnicalsError> {
        if ratio <= Decimal::ZERO || ratio > Decimal::ONE {
            return Err(TechnicalsError::InvalidInput(format!(
                "value area ratio must be in (0, 1], got {ratio}"
            )));
        }
        self.value_area_ratio = ratio;
        Ok(self)
    }

    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    /// Computes the profile of `series`.
    pub fn analyze(&self, series: &PriceSeries) -> Result<VolumeProfile, TechnicalsError> {
        let bars = series.bars();
        if bars.is_empty() {
            return Err(TechnicalsError::InsufficientData {
                required: 1,
                provided: 0,
            });
        }

        // 1. Close range
        let (price_low, price_high) = bars.iter().fold(
            (Decimal::MAX, Decimal::MIN),
            |(low, high), bar| (low.min(bar.close), high.max(bar.close)),
        );
        let total_volume: Decimal = bars.iter().map(|b| b.volume).sum();
        let price_range = price_high - price_low;

        if price_range.is_zero() {
            // A single distinct close: one bin holding everything.
            tracing::debug!(price = %price_low, "Flat close range, collapsing profile to one bin");
            return Ok(VolumeProfile {
                bins: vec![ProfileBin {
                    price_center: price_low,
                    volume: total_volume,
                    volume_pct: pct_of(total_volume, total_volume),
                }],
                bin_width: Decimal::ZERO,
                poc_price: price_low,
                poc_index: 0,
                value_area_low: price_low,
                value_area_high: price_low,
                total_volume,
                price_low,
                price_high,
            });
        }

        // 2. Accumulate volume per bin
        let bin_width = price_range / Decimal::from(self.bin_count);
        let mut volumes = vec![Decimal::ZERO; self.bin_count];
        for bar in bars {
            let index = self.bin_index(bar.close, price_low, price_range);
            volumes[index] += bar.volume;
        }

        let bins: Vec<ProfileBin> = volumes
            .iter()
            .enumerate()
            .map(|(i, &volume)| ProfileBin {
                price_center: price_low + bin_width * Decimal::from(i) + bin_width / dec!(2),
                volume,
                volume_pct: pct_of(volume, total_volume),
            })
            .collect();

        // 3. POC: first maximum in ascending price order
        let poc_index = volumes
            .iter()
            .enumerate()
            .fold(0, |best, (i, v)| if *v > volumes[best] { i } else { best });
        let poc_price = bins[poc_index].price_center;

        // 4. Value area
        let (value_area_low, value_area_high) =
            self.value_area(&bins, poc_index, total_volume);

        tracing::debug!(
            bins = self.bin_count,
            %bin_width,
            %poc_price,
            %value_area_low,
            %value_area_high,
            "Computed volume profile"
        );

        Ok(VolumeProfile {
            bins,
            bin_width,
            poc_price,
            poc_index,
            value_area_low,
            value_area_high,
            total_volume,
            price_low,
            price_high,
        })
    }

    /// Index of the half-open bin containing `close`. The range maximum lands in the last bin.
    ///
    /// Computed as `floor((close - low) * bins / range)` so that a close on a bin's left
    /// edge is not pushed down by a rounded bin width.
    fn bin_index(&self, close: Decimal, price_low: Decimal, price_range: Decimal) -> usize {
        let offset = close - price_low;
        let bins = Decimal::from(self.bin_count);
        let position = match offset.checked_mul(bins) {
            Some(scaled) => scaled / price_range,
            // offset <= range, so offset / range is at most 1.
            None => offset / price_range * bins,
        };
        let raw = position.floor().to_usize().unwrap_or(0);
        raw.min(self.bin_count - 1)
    }

    /// Walks outward from the POC on each side until that side holds half the
    /// target volume. A side that never gets there keeps its bound at the POC.
    fn value_area(
        &self,
        bins: &[ProfileBin],
        poc_index: usize,
        total_volume: Decimal,
    ) -> (Decimal, Decimal) {
        let poc_price = bins[poc_index].price_center;
        let half_target = total_volume * self.value_area_ratio / dec!(2);

        let walk = |indices: &mut dyn Iterator<Item = usize>| -> Option<Decimal> {
            let mut running = Decimal::ZERO;
            let mut reached = poc_index;
            for i in indices {
                if running >= half_target {
                    break;
                }
                running += bins[i].volume;
                reached = i;
            }
            (running >= half_target).then(|| bins[reached].price_center)
        };

        let low = walk(&mut (0..poc_index).rev()).unwrap_or(poc_price);
        let high = walk(&mut (poc_index + 1..bins.len())).unwrap_or(poc_price);
        (low, high)
    }
}

fn pct_of(volume: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        Decimal::ZERO
    } else {
        (volume / total * dec!(100)).round_dp(2)
    }
}

/// Convenience function: profile of `series` with `bin_count` bins and the default value-area ratio.
pub fn volume_profile(
    series: &PriceSeries,
    bin_count: usize,
) -> Result<VolumeProfile, TechnicalsError> {
    VolumeProfileAnalyzer::new(bin_count)?.analyze(series)
}
