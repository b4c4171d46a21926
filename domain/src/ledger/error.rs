use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient capital: have {available}, need {required}")]
    InsufficientCapital { available: Decimal, required: Decimal },

    #[error("insufficient holdings of {stock}: have {available}, need {requested}")]
    InsufficientHoldings {
        stock: String,
        available: Decimal,
        requested: Decimal,
    },

    #[error("trade quantity must be positive, got {0}")]
    InvalidQuantity(Decimal),
}
