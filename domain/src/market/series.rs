use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{PriceDataError, Stock, round_cents};
use crate::Period;

/// Immutable price history of one stock, indexed by period starting at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSeries {
    name: String,
    prices: Vec<Decimal>,
}

impl PriceSeries {
    pub fn new(
        name: impl Into<String>,
        prices: Vec<Decimal>,
    ) -> Result<Self, PriceDataError> {
        let name = name.into();
        if prices.is_empty() {
            return Err(PriceDataError::EmptySeries(name));
        }
        Ok(Self { name, prices })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn prices(&self) -> &[Decimal] {
        &self.prices
    }

    /// Number of periods in the history. Never zero.
    #[must_use]
    pub fn len(&self) -> Period {
        self.prices.len() as Period
    }

    /// Always false, since `new` rejects empty histories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Maps any requested period onto `1..=len`. Periods past the end freeze at
    /// the last known price.
    #[must_use]
    pub fn clamp_period(
        &self,
        period: Period,
    ) -> Period {
        period.clamp(1, self.len())
    }

    #[must_use]
    pub fn price_at(
        &self,
        period: Period,
    ) -> Decimal {
        self.prices[self.clamp_period(period) as usize - 1]
    }

    /// Percent change against the prior period, rounded to two places.
    ///
    /// Zero for the first period and whenever the prior price is exactly zero.
    #[must_use]
    pub fn percent_change(
        &self,
        period: Period,
    ) -> Decimal {
        let period = self.clamp_period(period);
        if period <= 1 {
            return Decimal::ZERO;
        }
        let previous = self.price_at(period - 1);
        if previous.is_zero() {
            return Decimal::ZERO;
        }
        let current = self.price_at(period);
        round_cents((current - previous) / previous * Decimal::ONE_HUNDRED)
    }

    /// Prices of periods `1..=through`, clamped to the available history.
    #[must_use]
    pub fn history_through(
        &self,
        through: Period,
    ) -> &[Decimal] {
        let end = (through as usize).min(self.prices.len());
        &self.prices[..end]
    }
}

/// One row of the price dataset as stored by the persistence gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRow {
    pub stock_name: String,
    pub period: Period,
    pub price: Decimal,
}

impl PriceRow {
    pub fn new(
        stock_name: impl Into<String>,
        period: Period,
        price: Decimal,
    ) -> Self {
        Self {
            stock_name: stock_name.into(),
            period,
            price,
        }
    }
}

/// Every price series of a game session, ordered by stock name.
#[derive(Debug, Clone)]
pub struct MarketData {
    series: Vec<Arc<PriceSeries>>,
}

impl MarketData {
    /// Groups dataset rows by stock and orders each group by period.
    pub fn from_rows(rows: impl IntoIterator<Item = PriceRow>) -> Result<Self, PriceDataError> {
        let mut grouped: BTreeMap<String, BTreeMap<Period, Decimal>> = BTreeMap::new();
        for row in rows {
            if row.period == 0 {
                return Err(PriceDataError::PeriodZero(row.stock_name));
            }
            let periods = grouped.entry(row.stock_name.clone()).or_default();
            if periods.insert(row.period, row.price).is_some() {
                return Err(PriceDataError::DuplicatePeriod {
                    stock: row.stock_name,
                    period: row.period,
                });
            }
        }

        let series = grouped
            .into_iter()
            .map(|(name, periods)| PriceSeries::new(name, periods.into_values().collect()).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_series(series)
    }

    pub fn from_series(series: Vec<Arc<PriceSeries>>) -> Result<Self, PriceDataError> {
        if series.is_empty() {
            return Err(PriceDataError::EmptyDataset);
        }
        Ok(Self { series })
    }

    #[must_use]
    pub fn series(&self) -> &[Arc<PriceSeries>] {
        &self.series
    }

    #[must_use]
    pub fn find(
        &self,
        name: &str,
    ) -> Option<&Arc<PriceSeries>> {
        self.series.iter().find(|s| s.name() == name)
    }

    /// Fresh cursors for a new game session.
    #[must_use]
    pub fn stocks(&self) -> Vec<Stock> {
        self.series.iter().map(|s| Stock::new(Arc::clone(s))).collect()
    }

    /// Flattens the dataset back into rows, e.g. to seed a store.
    #[must_use]
    pub fn rows(&self) -> Vec<PriceRow> {
        self.series
            .iter()
            .flat_map(|s| {
                s.prices()
                    .iter()
                    .enumerate()
                    .map(|(idx, &price)| PriceRow::new(s.name(), idx as Period + 1, price))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn series(prices: Vec<Decimal>) -> PriceSeries {
        PriceSeries::new("Test", prices).unwrap()
    }

    #[test]
    fn price_at_clamps_past_the_end() {
        let s = series(vec![dec!(10), dec!(11), dec!(12)]);
        assert_eq!(s.price_at(3), dec!(12));
        for period in 4..40 {
            assert_eq!(s.price_at(period), s.price_at(s.len()));
        }
    }

    #[test]
    fn price_at_clamps_period_zero_to_first() {
        let s = series(vec![dec!(10), dec!(11)]);
        assert_eq!(s.price_at(0), dec!(10));
    }

    #[test]
    fn percent_change_first_period_is_zero() {
        let s = series(vec![dec!(10), dec!(12)]);
        assert_eq!(s.percent_change(1), Decimal::ZERO);
        assert_eq!(s.percent_change(0), Decimal::ZERO);
    }

    #[test]
    fn percent_change_rounds_to_two_places() {
        let s = series(vec![dec!(30), dec!(31)]);
        assert_eq!(s.percent_change(2), dec!(3.33));
        let s = series(vec![dec!(20), dec!(15)]);
        assert_eq!(s.percent_change(2), dec!(-25));
    }

    #[test]
    fn percent_change_with_zero_previous_price_is_zero() {
        let s = series(vec![dec!(5), dec!(0), dec!(8), dec!(0)]);
        for period in 0..10 {
            let _ = s.percent_change(period);
        }
        assert_eq!(s.percent_change(3), Decimal::ZERO);
        assert_eq!(s.percent_change(2), dec!(-100));
    }

    #[test]
    fn percent_change_out_of_range_uses_last_period() {
        let s = series(vec![dec!(10), dec!(20)]);
        assert_eq!(s.percent_change(15), dec!(100));
    }

    #[test]
    fn empty_series_is_rejected() {
        assert_eq!(
            PriceSeries::new("Void", vec![]),
            Err(PriceDataError::EmptySeries("Void".to_string()))
        );
    }

    #[test]
    fn rows_are_grouped_by_stock_and_ordered_by_period() {
        let market = MarketData::from_rows(vec![
            PriceRow::new("Beta", 2, dec!(21)),
            PriceRow::new("Alpha", 2, dec!(11)),
            PriceRow::new("Beta", 1, dec!(20)),
            PriceRow::new("Alpha", 1, dec!(10)),
        ])
        .unwrap();

        let names: Vec<&str> = market.series().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
        assert_eq!(market.find("Beta").unwrap().prices(), &[dec!(20), dec!(21)]);
        assert_eq!(market.rows().len(), 4);
    }

    #[test]
    fn duplicate_periods_are_rejected() {
        let result = MarketData::from_rows(vec![
            PriceRow::new("Alpha", 1, dec!(10)),
            PriceRow::new("Alpha", 1, dec!(11)),
        ]);
        assert!(matches!(result, Err(PriceDataError::DuplicatePeriod { period: 1, .. })));
    }

    #[test]
    fn empty_dataset_is_rejected() {
        assert!(matches!(
            MarketData::from_rows(Vec::new()),
            Err(PriceDataError::EmptyDataset)
        ));
    }
}
