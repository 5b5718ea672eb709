use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TechnicalsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not enough data to perform calculation: required {required} bars, provided {provided}")]
    InsufficientData { required: usize, provided: usize },
}
