use thiserror::Error;

use crate::Period;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceDataError {
    #[error("price series for {0} has no prices")]
    EmptySeries(String),

    #[error("price series for {stock} lists period {period} twice")]
    DuplicatePeriod { stock: String, period: Period },

    #[error("price series for {0} contains period 0; periods start at 1")]
    PeriodZero(String),

    #[error("price dataset is empty")]
    EmptyDataset,
}
