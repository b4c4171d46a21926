use rust_decimal::Decimal;
use serde::Serialize;

use super::Stock;
use crate::Period;

/// What a participant sees for one stock while playing `visible_period`:
/// prices are only known up to the period before.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketQuote {
    pub stock: String,
    pub price: Decimal,
    pub percent_change: Decimal,
    pub history: Vec<Decimal>,
}

impl MarketQuote {
    #[must_use]
    pub fn for_period(
        stock: &Stock,
        visible_period: Period,
    ) -> Self {
        let previous = visible_period.saturating_sub(1).max(1);
        let series = stock.series();
        Self {
            stock: stock.name().to_string(),
            price: series.price_at(previous),
            percent_change: series.percent_change(previous),
            history: series.history_through(visible_period.saturating_sub(1)).to_vec(),
        }
    }
}
