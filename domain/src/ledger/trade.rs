use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TradeAction::Buy => "Buy",
            TradeAction::Sell => "Sell",
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An executed trade. Appended to the action log and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeRecord {
    pub period: Period,
    pub action: TradeAction,
    pub stock_name: String,
    pub quantity: Decimal,
    pub price: Decimal,
}

impl TradeRecord {
    #[must_use]
    pub fn notional(&self) -> Decimal {
        self.quantity * self.price
    }
}
