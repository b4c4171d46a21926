use std::sync::Arc;

use rust_decimal::Decimal;

use super::PriceSeries;
use crate::Period;

/// Per-session cursor over a [`PriceSeries`].
///
/// The as-of price only moves on [`Stock::advance_to`]; reading
/// [`Stock::current_price`] never recomputes it.
#[derive(Debug, Clone)]
pub struct Stock {
    series: Arc<PriceSeries>,
    current_period: Period,
    current_price: Decimal,
}

impl Stock {
    /// A fresh cursor rests on the last period of the history until advanced.
    #[must_use]
    pub fn new(series: Arc<PriceSeries>) -> Self {
        let current_period = series.len();
        let current_price = series.price_at(current_period);
        Self {
            series,
            current_period,
            current_price,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.series.name()
    }

    #[must_use]
    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    #[must_use]
    pub fn current_period(&self) -> Period {
        self.current_period
    }

    #[must_use]
    pub fn current_price(&self) -> Decimal {
        self.current_price
    }

    pub fn advance_to(
        &mut self,
        period: Period,
    ) -> Decimal {
        self.current_period = self.series.clamp_period(period);
        self.current_price = self.series.price_at(self.current_period);
        self.current_price
    }

    #[must_use]
    pub fn percent_change(
        &self,
        period: Period,
    ) -> Decimal {
        self.series.percent_change(period)
    }
}
