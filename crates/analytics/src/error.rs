use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Configuration error: {0}")]
    Config(#[from] configuration::error::ConfigError),

    #[error("Technical indicator error: {0}")]
    Technicals(#[from] technicals::TechnicalsError),

    #[error("Valuation error: {0}")]
    Valuation(#[from] valuation::ValuationError),
}
