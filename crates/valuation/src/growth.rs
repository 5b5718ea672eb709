use core_types::FundamentalsSnapshot;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use std::fmt;

const INSUFFICIENT_FCF: &str = "growth rate cannot be estimated due to negative/insufficient FCF";

/// The free-cash-flow history does not support a growth estimate.
///
/// An expected business condition, returned as data rather than as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthRateUnavailable {
    pub reason: String,
}

impl GrowthRateUnavailable {
    fn insufficient_fcf() -> Self {
        Self {
            reason: INSUFFICIENT_FCF.to_string(),
        }
    }
}

impl fmt::Display for GrowthRateUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Outcome of the FCF growth estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GrowthEstimate {
    /// Annualized growth rate as a fraction, compounded over `basis_years`.
    Estimated { rate: Decimal, basis_years: u32 },
    Unavailable(GrowthRateUnavailable),
}

impl GrowthEstimate {
    pub fn rate(&self) -> Option<Decimal> {
        match self {
            GrowthEstimate::Estimated { rate, .. } => Some(*rate),
            GrowthEstimate::Unavailable(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            GrowthEstimate::Estimated { .. } => None,
            GrowthEstimate::Unavailable(u) => Some(&u.reason),
        }
    }
}

/// Estimates the annual FCF growth rate from the snapshot's history.
///
/// Compares the latest FCF with the oldest usable positive figure, preferring
/// three years back, then two, then one:
///
/// rate = (fcf_latest / fcf_n_years_ago)^(1/n) − 1
///
/// A missing or non-positive latest FCF, or no positive historical figure, makes
/// the rate unavailable.
pub fn estimate_fcf_growth(fundamentals: &FundamentalsSnapshot) -> GrowthEstimate {
    let history = &fundamentals.free_cash_flow;
    let latest = match history.latest {
        Some(latest) if latest > Decimal::ZERO => latest,
        _ => {
            tracing::warn!(latest = ?history.latest, "Latest FCF is missing or not positive");
            return GrowthEstimate::Unavailable(GrowthRateUnavailable::insufficient_fcf());
        }
    };

    let basis = (1..=3u32).rev().find_map(|years| {
        history
            .years_ago(years as usize)
            .filter(|v| *v > Decimal::ZERO)
            .map(|v| (years, v))
    });
    let Some((basis_years, base)) = basis else {
        tracing::warn!("No positive historical FCF to compare against");
        return GrowthEstimate::Unavailable(GrowthRateUnavailable::insufficient_fcf());
    };

    let Some(ratio) = latest.checked_div(base) else {
        return GrowthEstimate::Unavailable(GrowthRateUnavailable {
            reason: format!("growth rate cannot be computed: FCF ratio {latest} / {base} overflows"),
        });
    };
    let growth_factor = match basis_years {
        1 => Some(ratio),
        2 => ratio.sqrt(),
        n => ratio.checked_powd(Decimal::ONE / Decimal::from(n)),
    };
    let Some(growth_factor) = growth_factor else {
        return GrowthEstimate::Unavailable(GrowthRateUnavailable {
            reason: format!("growth rate cannot be computed from an FCF ratio of {ratio}"),
        });
    };

    let rate = growth_factor - Decimal::ONE;
    tracing::debug!(%rate, basis_years, "Estimated FCF growth rate");
    GrowthEstimate::Estimated { rate, basis_years }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn with_fcf(values: &[Option<Decimal>]) -> FundamentalsSnapshot {
        FundamentalsSnapshot::new().with_free_cash_flow(values)
    }

    fn assert_close(actual: Decimal, expected: Decimal) {
        assert!(
            (actual - expected).abs() < dec!(0.000000001),
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_two_year_ratio_when_three_years_absent() {
        let estimate = estimate_fcf_growth(&with_fcf(&[
            Some(dec!(121)),
            Some(dec!(110)),
            Some(dec!(100)),
            None,
        ]));
        let GrowthEstimate::Estimated { rate, basis_years } = estimate else {
            panic!("expected an estimate, got {estimate:?}");
        };
        assert_eq!(basis_years, 2);
        assert_close(rate, dec!(0.1));
    }

    #[test]
    fn test_three_year_ratio_preferred() {
        let estimate = estimate_fcf_growth(&with_fcf(&[
            Some(dec!(133.1)),
            Some(dec!(50)),
            Some(dec!(70)),
            Some(dec!(100)),
        ]));
        assert_eq!(
            match estimate {
                GrowthEstimate::Estimated { basis_years, .. } => basis_years,
                _ => 0,
            },
            3
        );
        assert_close(estimate.rate().unwrap(), dec!(0.1));
    }

    #[test]
    fn test_non_positive_history_skipped() {
        // 3y and 2y ago are not positive, so the one-year ratio is used.
        let estimate = estimate_fcf_growth(&with_fcf(&[
            Some(dec!(90)),
            Some(dec!(120)),
            Some(dec!(-40)),
            Some(dec!(0)),
        ]));
        assert_eq!(
            estimate,
            GrowthEstimate::Estimated { rate: dec!(-0.25), basis_years: 1 }
        );
    }

    #[test]
    fn test_non_positive_latest_is_unavailable() {
        for latest in [Some(dec!(0)), Some(dec!(-5)), None] {
            let estimate = estimate_fcf_growth(&with_fcf(&[
                latest,
                Some(dec!(100)),
                Some(dec!(90)),
                Some(dec!(80)),
            ]));
            assert_eq!(estimate.rate(), None);
            assert_eq!(estimate.reason(), Some(INSUFFICIENT_FCF));
        }
    }

    #[test]
    fn test_overflowing_ratio_is_unavailable() {
        let estimate = estimate_fcf_growth(&with_fcf(&[
            Some(dec!(100000000000000000000)),
            Some(dec!(0.0000000001)),
        ]));
        assert_eq!(estimate.rate(), None);
        assert!(estimate.reason().unwrap().contains("overflows"));
    }

    #[test]
    fn test_no_usable_history_is_unavailable() {
        let estimate = estimate_fcf_growth(&with_fcf(&[Some(dec!(100)), None, Some(dec!(-3))]));
        assert!(matches!(estimate, GrowthEstimate::Unavailable(_)));
        assert_eq!(estimate.reason(), Some(INSUFFICIENT_FCF));
    }
}
