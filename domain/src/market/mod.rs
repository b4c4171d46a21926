mod error;
mod quote;
mod series;
mod stock;

use rust_decimal::Decimal;

pub use error::PriceDataError;
pub use quote::MarketQuote;
pub use series::{MarketData, PriceRow, PriceSeries};
pub use stock::Stock;

/// Rounds a monetary value or percentage to two decimal places.
#[must_use]
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp(2)
}
