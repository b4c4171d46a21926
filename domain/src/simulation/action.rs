use rust_decimal::Decimal;

use super::Group;
use crate::TradeAction;

#[derive(Clone, Debug)]
pub enum SimulationAction {
    Enroll {
        group: Group,
    },
    Advance,
    Trade {
        action: TradeAction,
        stock: String,
        quantity: Decimal,
    },
    Conclude,
}
