use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValuationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Weight mismatch: {0}")]
    WeightMismatch(String),

    /// Propagated from the market-data collaborator; the core itself never
    /// constructs this variant.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Division by zero: {0}")]
    DivisionByZero(&'static str),
}

pub type ValuationResult<T> = Result<T, ValuationError>;
