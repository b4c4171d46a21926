use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::{Holding, LedgerError, PortfolioOverview, TradeAction, TradeRecord};
use crate::{Period, Stock, round_cents};

/// Cash, holdings and the append-only logs of one participant.
///
/// Trades either apply in full or leave the ledger untouched.
#[derive(Debug, Clone)]
pub struct Player {
    cash: Decimal,
    holdings: BTreeMap<String, Holding>,
    action_log: Vec<TradeRecord>,
    performance_log: Vec<Decimal>,
}

impl Player {
    #[must_use]
    pub fn new(starting_cash: Decimal) -> Self {
        Self {
            cash: starting_cash,
            holdings: BTreeMap::new(),
            action_log: Vec::new(),
            performance_log: Vec::new(),
        }
    }

    #[must_use]
    pub fn cash(&self) -> Decimal {
        self.cash
    }

    #[must_use]
    pub fn holdings(&self) -> &BTreeMap<String, Holding> {
        &self.holdings
    }

    #[must_use]
    pub fn holding(
        &self,
        stock_name: &str,
    ) -> Option<&Holding> {
        self.holdings.get(stock_name)
    }

    #[must_use]
    pub fn action_log(&self) -> &[TradeRecord] {
        &self.action_log
    }

    #[must_use]
    pub fn performance_log(&self) -> &[Decimal] {
        &self.performance_log
    }

    /// Places a holding directly into the ledger without a trade record.
    pub fn endow(
        &mut self,
        stock_name: impl Into<String>,
        holding: Holding,
    ) {
        self.holdings.insert(stock_name.into(), holding);
    }

    pub fn buy(
        &mut self,
        stock: &Stock,
        quantity: Decimal,
        period: Period,
    ) -> Result<TradeRecord, LedgerError> {
        require_positive(quantity)?;
        let price = stock.current_price();
        let cost = quantity.checked_mul(price).ok_or(LedgerError::InsufficientCapital {
            available: self.cash,
            required: Decimal::MAX,
        })?;
        if cost > self.cash {
            return Err(LedgerError::InsufficientCapital {
                available: self.cash,
                required: cost,
            });
        }

        let holding = match self.holding(stock.name()) {
            Some(existing) => existing.merged(quantity, price).ok_or(LedgerError::InvalidQuantity(quantity))?,
            None => Holding::new(quantity, price),
        };

        self.cash -= cost;
        self.holdings.insert(stock.name().to_string(), holding);

        Ok(self.append(period, TradeAction::Buy, stock, quantity))
    }

    pub fn sell(
        &mut self,
        stock: &Stock,
        quantity: Decimal,
        period: Period,
    ) -> Result<TradeRecord, LedgerError> {
        require_positive(quantity)?;
        let available = self.holding(stock.name()).map_or(Decimal::ZERO, |h| h.quantity);
        if quantity > available {
            return Err(LedgerError::InsufficientHoldings {
                stock: stock.name().to_string(),
                available,
                requested: quantity,
            });
        }

        let cash = quantity
            .checked_mul(stock.current_price())
            .and_then(|proceeds| self.cash.checked_add(proceeds))
            .ok_or(LedgerError::InvalidQuantity(quantity))?;

        self.cash = cash;
        let remaining = available - quantity;
        if remaining.is_zero() {
            self.holdings.remove(stock.name());
        } else if let Some(holding) = self.holdings.get_mut(stock.name()) {
            holding.quantity = remaining;
        }

        Ok(self.append(period, TradeAction::Sell, stock, quantity))
    }

    /// Cash plus the market value of every holding, rounded to cents.
    ///
    /// Holdings whose stock is not among `stocks` contribute nothing.
    #[must_use]
    pub fn total_value(
        &self,
        stocks: &[Stock],
    ) -> Decimal {
        let market_value: Decimal = self
            .holdings
            .iter()
            .filter_map(|(name, holding)| {
                stocks
                    .iter()
                    .find(|s| s.name() == name)
                    .map(|s| holding.quantity.saturating_mul(s.current_price()))
            })
            .fold(Decimal::ZERO, Decimal::saturating_add);
        round_cents(self.cash.saturating_add(market_value))
    }

    pub fn track_performance(
        &mut self,
        stocks: &[Stock],
    ) -> Decimal {
        let total = self.total_value(stocks);
        self.performance_log.push(total);
        total
    }

    #[must_use]
    pub fn overview(
        &self,
        stocks: &[Stock],
    ) -> PortfolioOverview {
        PortfolioOverview::build(self.cash, &self.holdings, stocks)
    }

    fn append(
        &mut self,
        period: Period,
        action: TradeAction,
        stock: &Stock,
        quantity: Decimal,
    ) -> TradeRecord {
        let record = TradeRecord {
            period,
            action,
            stock_name: stock.name().to_string(),
            quantity,
            price: stock.current_price(),
        };
        self.action_log.push(record.clone());
        record
    }
}

fn require_positive(quantity: Decimal) -> Result<(), LedgerError> {
    if quantity <= Decimal::ZERO {
        return Err(LedgerError::InvalidQuantity(quantity));
    }
    Ok(())
}
