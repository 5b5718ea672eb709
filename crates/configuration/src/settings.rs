use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// The root configuration structure for the entire application.
///
/// Every section may be omitted from `config.toml`, in which case the defaults
/// below apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub assumptions: ValuationAssumptions,
    pub valuation: ValuationPolicy,
    pub levels: LevelSettings,
    pub technicals: TechnicalSettings,
}

impl Config {
    /// Rejects settings that no computation could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.assumptions.validate()?;
        self.valuation.validate()?;
        self.technicals.validate()?;
        Ok(())
    }
}

/// Market assumptions for the valuation. Supplied by the caller, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationAssumptions {
    /// Risk-free rate as a fraction (0.04 is 4%).
    pub risk_free_rate: Decimal,
    /// Equity market risk premium in percent (5 is 5%).
    pub market_risk_premium_pct: Decimal,
    pub beta: Decimal,
    /// Perpetual growth after the explicit horizon, in percent.
    pub terminal_growth_rate_pct: Decimal,
    /// Length of the explicit projection horizon. Must be at least 1.
    pub high_growth_period_years: u32,
}

impl ValuationAssumptions {
    /// The terminal growth rate as a fraction.
    pub fn terminal_growth_rate(&self) -> Decimal {
        self.terminal_growth_rate_pct / dec!(100)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.high_growth_period_years == 0 {
            return Err(ConfigError::ValidationError(
                "assumptions.high_growth_period_years must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ValuationAssumptions {
    fn default() -> Self {
        Self {
            risk_free_rate: dec!(0.04),
            market_risk_premium_pct: dec!(5),
            beta: dec!(1),
            terminal_growth_rate_pct: dec!(2.5),
            high_growth_period_years: 5,
        }
    }
}

/// Valuation policy knobs that are not market assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationPolicy {
    /// Tax rate used when pretax income is zero. 0.30 and 0.21 are both in use.
    pub default_tax_rate: Decimal,
}

impl ValuationPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_tax_rate < Decimal::ZERO || self.default_tax_rate >= Decimal::ONE {
            return Err(ConfigError::ValidationError(format!(
                "valuation.default_tax_rate must be in [0, 1), got {}",
                self.default_tax_rate
            )));
        }
        Ok(())
    }
}

impl Default for ValuationPolicy {
    fn default() -> Self {
        Self {
            default_tax_rate: dec!(0.30),
        }
    }
}

/// Percentages of the current price at which the structured-product levels sit.
/// A percentage of 0 disables that level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    pub strike_pct: Decimal,
    pub airbag_pct: Decimal,
    pub knockout_pct: Decimal,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            strike_pct: dec!(90),
            airbag_pct: dec!(80),
            knockout_pct: dec!(105),
        }
    }
}

/// Parameters for the trend indicators and the volume profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalSettings {
    pub ema_spans: Vec<usize>,
    pub profile_bins: usize,
    /// Share of total volume the value area covers.
    pub value_area_ratio: Decimal,
}

impl TechnicalSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ema_spans.contains(&0) {
            return Err(ConfigError::ValidationError(
                "technicals.ema_spans must all be greater than 0".to_string(),
            ));
        }
        if self.profile_bins == 0 {
            return Err(ConfigError::ValidationError(
                "technicals.profile_bins must be greater than 0".to_string(),
            ));
        }
        if self.value_area_ratio <= Decimal::ZERO || self.value_area_ratio > Decimal::ONE {
            return Err(ConfigError::ValidationError(format!(
                "technicals.value_area_ratio must be in (0, 1], got {}",
                self.value_area_ratio
            )));
        }
        Ok(())
    }
}

impl Default for TechnicalSettings {
    fn default() -> Self {
        Self {
            ema_spans: vec![20, 50, 200],
            profile_bins: 40,
            value_area_ratio: dec!(0.70),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_terminal_growth_as_fraction() {
        let assumptions = ValuationAssumptions {
            terminal_growth_rate_pct: dec!(3),
            ..Default::default()
        };
        assert_eq!(assumptions.terminal_growth_rate(), dec!(0.03));
    }

    #[test]
    fn test_zero_growth_period_is_rejected() {
        let mut config = Config::default();
        config.assumptions.high_growth_period_years = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_technical_settings_validation() {
        let mut config = Config::default();
        config.technicals.ema_spans = vec![20, 0];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.technicals.profile_bins = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.technicals.value_area_ratio = dec!(1.2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tax_rate_bounds() {
        let mut config = Config::default();
        config.valuation.default_tax_rate = dec!(0.21);
        assert!(config.validate().is_ok());
        config.valuation.default_tax_rate = dec!(1);
        assert!(config.validate().is_err());
    }
}
