use rust_decimal::Decimal;
use serde::Serialize;

use super::{Group, SimulationPhase, SimulationState};
use crate::{MarketQuote, ParticipantId, Period, PortfolioOverview, TradeRecord};

/// Everything a participant's screen shows, detached from the live state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub participant_id: ParticipantId,
    pub group: Option<Group>,
    pub phase: SimulationPhase,
    pub total_periods: Period,
    pub cash: Decimal,
    pub total_value: Decimal,
    pub quotes: Vec<MarketQuote>,
    pub portfolio: PortfolioOverview,
    pub actions: Vec<TradeRecord>,
    pub performance: Vec<Decimal>,
}

impl SessionView {
    pub(super) fn of(state: &SimulationState) -> Self {
        let visible_period = match state.phase() {
            SimulationPhase::AwaitingSurvey => None,
            SimulationPhase::InProgress { period } => Some(period),
            SimulationPhase::Completed => Some(state.config().total_periods),
        };
        let quotes = visible_period
            .map(|period| {
                state
                    .stocks()
                    .iter()
                    .map(|stock| MarketQuote::for_period(stock, period))
                    .collect()
            })
            .unwrap_or_default();
        let player = state.player();

        Self {
            participant_id: state.participant_id().clone(),
            group: state.group(),
            phase: state.phase(),
            total_periods: state.config().total_periods,
            cash: player.cash(),
            total_value: state.total_value(),
            quotes,
            portfolio: player.overview(state.stocks()),
            actions: player.action_log().to_vec(),
            performance: player.performance_log().to_vec(),
        }
    }
}
