use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::Holding;
use crate::{Stock, round_cents};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioRow {
    pub stock: String,
    pub quantity: Decimal,
    pub average_buy_price: Decimal,
    pub current_price: Decimal,
    pub value: Decimal,
    pub change_percent: Decimal,
    pub gain_loss: Decimal,
}

/// Holdings valued at current prices, with capital and totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioOverview {
    pub rows: Vec<PortfolioRow>,
    pub capital: Decimal,
    pub invested: Decimal,
    pub market_value: Decimal,
    pub total_value: Decimal,
    pub total_gain: Decimal,
    pub total_change_percent: Decimal,
}

impl PortfolioOverview {
    pub(super) fn build(
        cash: Decimal,
        holdings: &BTreeMap<String, Holding>,
        stocks: &[Stock],
    ) -> Self {
        let rows: Vec<PortfolioRow> = holdings
            .iter()
            .filter_map(|(name, holding)| {
                let stock = stocks.iter().find(|s| s.name() == name)?;
                Some(PortfolioRow::build(name, holding, stock.current_price()))
            })
            .collect();

        let invested: Decimal = holdings
            .iter()
            .filter(|(name, _)| rows.iter().any(|r| &r.stock == *name))
            .map(|(_, h)| h.quantity.saturating_mul(h.average_buy_price))
            .fold(Decimal::ZERO, Decimal::saturating_add);
        let market_value = rows
            .iter()
            .map(|r| r.quantity.saturating_mul(r.current_price))
            .fold(Decimal::ZERO, Decimal::saturating_add);
        let total_change_percent = if invested.is_zero() {
            Decimal::ZERO
        } else {
            round_cents((market_value / invested - Decimal::ONE) * Decimal::ONE_HUNDRED)
        };

        Self {
            rows,
            capital: round_cents(cash),
            invested: round_cents(invested),
            market_value: round_cents(market_value),
            total_value: round_cents(market_value + cash),
            total_gain: round_cents(market_value - invested),
            total_change_percent,
        }
    }
}

impl PortfolioRow {
    fn build(
        name: &str,
        holding: &Holding,
        current_price: Decimal,
    ) -> Self {
        let buy = holding.average_buy_price;
        let change_percent = if buy.is_zero() {
            Decimal::ZERO
        } else {
            round_cents((current_price - buy) / buy * Decimal::ONE_HUNDRED)
        };
        Self {
            stock: name.to_string(),
            quantity: holding.quantity,
            average_buy_price: round_cents(buy),
            current_price: round_cents(current_price),
            value: round_cents(holding.quantity.saturating_mul(current_price)),
            change_percent,
            gain_loss: round_cents((current_price - buy).saturating_mul(holding.quantity)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal_macros::dec;

    use super::*;
    use crate::{Player, PriceSeries};

    #[test]
    fn overview_reports_rows_and_totals() {
        let stock = Stock::new(Arc::new(PriceSeries::new("A", vec![dec!(12)]).unwrap()));
        let mut player = Player::new(dec!(500));
        player.endow("A", Holding::new(dec!(10), dec!(10)));

        let overview = player.overview(&[stock]);

        assert_eq!(overview.rows.len(), 1);
        let row = &overview.rows[0];
        assert_eq!(row.value, dec!(120));
        assert_eq!(row.change_percent, dec!(20));
        assert_eq!(row.gain_loss, dec!(20));
        assert_eq!(overview.invested, dec!(100));
        assert_eq!(overview.total_value, dec!(620));
        assert_eq!(overview.total_gain, dec!(20));
        assert_eq!(overview.total_change_percent, dec!(20));
    }

    #[test]
    fn empty_portfolio_has_zero_change() {
        let overview = Player::new(dec!(1000)).overview(&[]);
        assert!(overview.rows.is_empty());
        assert_eq!(overview.total_value, dec!(1000));
        assert_eq!(overview.total_change_percent, Decimal::ZERO);
    }
}
