use rust_decimal::Decimal;

use super::{Group, SessionView, SimulationAction, SimulationConfig, SimulationEffect, SimulationError, SimulationPhase};
use crate::{Holding, MarketData, ParticipantId, Period, Player, Stock, TradeAction, round_cents};

/// Game state of one participant, from survey to final result.
///
/// While `InProgress { period }` the stock cursors rest on `period - 1`: the
/// participant trades on the last completed period's prices.
#[derive(Clone, Debug)]
pub struct SimulationState {
    participant_id: ParticipantId,
    pub(super) phase: SimulationPhase,
    config: SimulationConfig,
    group: Option<Group>,
    pub(super) stocks: Vec<Stock>,
    pub(super) player: Player,
}

impl SimulationState {
    #[must_use]
    pub fn new(
        participant_id: ParticipantId,
        market: &MarketData,
        config: SimulationConfig,
    ) -> Self {
        Self {
            participant_id,
            phase: SimulationPhase::AwaitingSurvey,
            config,
            group: None,
            stocks: market.stocks(),
            player: Player::new(Decimal::ZERO),
        }
    }

    pub fn process_action(
        &mut self,
        action: SimulationAction,
    ) -> Result<Vec<SimulationEffect>, SimulationError> {
        match action {
            SimulationAction::Enroll { group } => self.handle_enroll(group),
            SimulationAction::Advance => self.handle_advance(),
            SimulationAction::Trade {
                action,
                stock,
                quantity,
            } => self.handle_trade(action, &stock, quantity),
            SimulationAction::Conclude => self.handle_conclude(),
        }
    }

    #[must_use]
    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant_id
    }

    #[must_use]
    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    #[must_use]
    pub fn group(&self) -> Option<Group> {
        self.group
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    #[must_use]
    pub fn stocks(&self) -> &[Stock] {
        &self.stocks
    }

    #[must_use]
    pub fn total_value(&self) -> Decimal {
        self.player.total_value(&self.stocks)
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView::of(self)
    }

    fn in_progress_period(
        &self,
        action: &'static str,
    ) -> Result<Period, SimulationError> {
        match self.phase {
            SimulationPhase::InProgress { period } => Ok(period),
            phase => Err(SimulationError::InvalidPeriodRequest { action, phase }),
        }
    }

    fn advance_stocks(
        &mut self,
        period: Period,
    ) {
        for stock in &mut self.stocks {
            stock.advance_to(period);
        }
    }

    fn handle_enroll(
        &mut self,
        group: Group,
    ) -> Result<Vec<SimulationEffect>, SimulationError> {
        if self.phase != SimulationPhase::AwaitingSurvey {
            return Err(SimulationError::InvalidPeriodRequest {
                action: "Enroll",
                phase: self.phase,
            });
        }

        let mut player = Player::new(self.config.starting_cash(group));
        if group == Group::Treatment {
            let endowment = &self.config.endowment;
            let stock = self
                .stocks
                .iter()
                .find(|s| s.name() == endowment.stock)
                .ok_or_else(|| SimulationError::UnknownStock(endowment.stock.clone()))?;
            let buy_price = round_cents(stock.series().price_at(endowment.price_period));
            player.endow(endowment.stock.clone(), Holding::new(endowment.quantity, buy_price));
        }

        self.group = Some(group);
        self.player = player;

        for period in 1..self.config.first_visible_period {
            self.advance_stocks(period);
            self.player.track_performance(&self.stocks);
        }
        self.phase = SimulationPhase::InProgress {
            period: self.config.first_visible_period,
        };

        Ok(Vec::new())
    }

    fn handle_advance(&mut self) -> Result<Vec<SimulationEffect>, SimulationError> {
        let period = self.in_progress_period("Advance")?;
        if period >= self.config.total_periods {
            return self.handle_conclude();
        }

        self.advance_stocks(period);
        self.player.track_performance(&self.stocks);
        self.phase = SimulationPhase::InProgress { period: period + 1 };

        Ok(Vec::new())
    }

    fn handle_trade(
        &mut self,
        action: TradeAction,
        stock_name: &str,
        quantity: Decimal,
    ) -> Result<Vec<SimulationEffect>, SimulationError> {
        let period = self.in_progress_period(match action {
            TradeAction::Buy => "Buy",
            TradeAction::Sell => "Sell",
        })?;

        let stock = self
            .stocks
            .iter()
            .find(|s| s.name() == stock_name)
            .ok_or_else(|| SimulationError::UnknownStock(stock_name.to_string()))?;

        let record = match action {
            TradeAction::Buy => self.player.buy(stock, quantity, period)?,
            TradeAction::Sell => self.player.sell(stock, quantity, period)?,
        };

        Ok(vec![SimulationEffect::RecordTrade(record)])
    }

    /// Final valuation. Repeating it after completion yields the same result
    /// again; the store keeps one result per participant.
    fn handle_conclude(&mut self) -> Result<Vec<SimulationEffect>, SimulationError> {
        match self.phase {
            SimulationPhase::InProgress { period } if period >= self.config.total_periods => {}
            SimulationPhase::Completed => {}
            phase => {
                return Err(SimulationError::InvalidPeriodRequest {
                    action: "Conclude",
                    phase,
                });
            }
        }

        self.phase = SimulationPhase::Completed;
        Ok(vec![SimulationEffect::RecordResult {
            total_value: self.total_value(),
        }])
    }
}
