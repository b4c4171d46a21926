use rust_decimal::Decimal;

use crate::TradeRecord;

/// Durable writes requested by the state machine. The caller forwards them to
/// the persistence gateway.
#[derive(Clone, Debug, PartialEq)]
pub enum SimulationEffect {
    RecordTrade(TradeRecord),
    RecordResult { total_value: Decimal },
}
