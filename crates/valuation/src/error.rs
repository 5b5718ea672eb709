use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Valuation is undefined: {0}")]
    UndefinedValuation(String),

    #[error("Error in calculation: {0}")]
    Calculation(String),
}
