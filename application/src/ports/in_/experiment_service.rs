use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::ports::out_::{ActionRecord, ExperimentGateway, GatewayError, ResultRecord, SessionRepository, SurveyRecord};
use domain::{
    Group, MarketData, ParticipantId, PriceDataError, SessionView, SimulationAction, SimulationConfig, SimulationEffect,
    SimulationError, SimulationState, SurveyError, SurveyResponse, TradeAction, TradeRecord,
};

const MAX_ID_ATTEMPTS: usize = 8;

#[derive(Debug, Error)]
pub enum ExperimentServiceError {
    #[error("no session for participant {0}")]
    SessionNotFound(ParticipantId),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Survey(#[from] SurveyError),

    #[error("price dataset unusable: {0}")]
    PriceData(#[from] PriceDataError),

    #[error(transparent)]
    Persistence(#[from] GatewayError),
}

/// Outcome of an accepted trade. The trade has taken effect in the session
/// even when `persistence_warning` reports that the durable write failed.
#[derive(Debug, Clone, Serialize)]
pub struct TradeReceipt {
    pub trade: TradeRecord,
    pub persistence_warning: Option<String>,
    pub session: SessionView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperimentExport {
    pub surveys: Vec<SurveyRecord>,
    pub actions: Vec<ActionRecord>,
    pub results: Vec<ResultRecord>,
}

pub struct ExperimentService {
    gateway: Arc<dyn ExperimentGateway>,
    sessions: Arc<dyn SessionRepository>,
    config: SimulationConfig,
    enrollment: Mutex<()>,
    session_locks: Mutex<HashMap<ParticipantId, Arc<Mutex<()>>>>,
}

impl ExperimentService {
    pub fn new(
        gateway: Arc<dyn ExperimentGateway>,
        sessions: Arc<dyn SessionRepository>,
        config: SimulationConfig,
    ) -> Self {
        Self {
            gateway,
            sessions,
            config,
            enrollment: Mutex::new(()),
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Accepts a survey, assigns the participant's group and starts their game.
    ///
    /// Counting participants, picking the group and recording the survey run
    /// under one lock so concurrent signups cannot break the alternation.
    pub async fn submit_survey(
        &self,
        survey: SurveyResponse,
    ) -> Result<SessionView, ExperimentServiceError> {
        let survey = survey.normalized()?;
        let market = MarketData::from_rows(self.gateway.load_price_dataset().await?)?;

        let _enrollment = self.enrollment.lock().await;
        let participant_id = self.fresh_participant_id().await;
        let group = Group::for_signup(self.gateway.count_participants().await?);

        let mut state = SimulationState::new(participant_id.clone(), &market, self.config.clone());
        state.process_action(SimulationAction::Enroll { group })?;

        self.gateway.record_survey(&participant_id, &survey, group).await?;
        self.sessions.save_session(&state).await;

        info!(participant_id = %participant_id, group = %group, "Participant enrolled");
        Ok(state.view())
    }

    pub async fn view(
        &self,
        participant_id: &ParticipantId,
    ) -> Result<SessionView, ExperimentServiceError> {
        Ok(self.load(participant_id).await?.view())
    }

    pub async fn advance(
        &self,
        participant_id: &ParticipantId,
    ) -> Result<SessionView, ExperimentServiceError> {
        self.transition(participant_id, SimulationAction::Advance).await
    }

    /// Final valuation. Safe to call repeatedly once the game has ended.
    pub async fn conclude(
        &self,
        participant_id: &ParticipantId,
    ) -> Result<SessionView, ExperimentServiceError> {
        self.transition(participant_id, SimulationAction::Conclude).await
    }

    pub async fn buy(
        &self,
        participant_id: &ParticipantId,
        stock: &str,
        quantity: Decimal,
    ) -> Result<TradeReceipt, ExperimentServiceError> {
        self.trade(participant_id, TradeAction::Buy, stock, quantity).await
    }

    pub async fn sell(
        &self,
        participant_id: &ParticipantId,
        stock: &str,
        quantity: Decimal,
    ) -> Result<TradeReceipt, ExperimentServiceError> {
        self.trade(participant_id, TradeAction::Sell, stock, quantity).await
    }

    pub async fn trade(
        &self,
        participant_id: &ParticipantId,
        action: TradeAction,
        stock: &str,
        quantity: Decimal,
    ) -> Result<TradeReceipt, ExperimentServiceError> {
        let _session = self.lock_session(participant_id).await;
        let mut state = self.load(participant_id).await?;
        let effects = state.process_action(SimulationAction::Trade {
            action,
            stock: stock.to_string(),
            quantity,
        })?;
        self.sessions.save_session(&state).await;

        let mut trade = None;
        let mut persistence_warning = None;
        for effect in effects {
            if let SimulationEffect::RecordTrade(record) = &effect {
                trade = Some(record.clone());
            }
            if let Err(err) = self.apply_effect(participant_id, effect).await {
                warn!(participant_id = %participant_id, error = %err, "Trade executed but not persisted");
                persistence_warning = Some(err.to_string());
            }
        }

        let trade = trade.ok_or_else(|| {
            ExperimentServiceError::Simulation(SimulationError::InvalidPeriodRequest {
                action: action.as_str(),
                phase: state.phase(),
            })
        })?;
        debug!(
            participant_id = %participant_id,
            period = trade.period,
            action = %trade.action,
            stock = %trade.stock_name,
            quantity = %trade.quantity,
            price = %trade.price,
            "Trade executed"
        );

        Ok(TradeReceipt {
            trade,
            persistence_warning,
            session: state.view(),
        })
    }

    pub async fn export(&self) -> Result<ExperimentExport, ExperimentServiceError> {
        Ok(ExperimentExport {
            surveys: self.gateway.list_surveys().await?,
            actions: self.gateway.list_actions().await?,
            results: self.gateway.list_results().await?,
        })
    }

    async fn transition(
        &self,
        participant_id: &ParticipantId,
        action: SimulationAction,
    ) -> Result<SessionView, ExperimentServiceError> {
        let _session = self.lock_session(participant_id).await;
        let mut state = self.load(participant_id).await?;
        let effects = state.process_action(action)?;
        self.sessions.save_session(&state).await;

        for effect in effects {
            self.apply_effect(participant_id, effect).await?;
        }

        debug!(participant_id = %participant_id, phase = ?state.phase(), "Session transitioned");
        Ok(state.view())
    }

    async fn apply_effect(
        &self,
        participant_id: &ParticipantId,
        effect: SimulationEffect,
    ) -> Result<(), GatewayError> {
        match effect {
            SimulationEffect::RecordTrade(record) => self.gateway.record_action(participant_id, &record).await,
            SimulationEffect::RecordResult { total_value } => {
                self.gateway.record_result(participant_id, total_value).await?;
                info!(participant_id = %participant_id, total_value = %total_value, "Final result recorded");
                Ok(())
            }
        }
    }

    /// Serializes load, process and save for one participant. Held until the
    /// effects of the action are written.
    async fn lock_session(
        &self,
        participant_id: &ParticipantId,
    ) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.session_locks.lock().await;
            Arc::clone(locks.entry(participant_id.clone()).or_default())
        };
        lock.lock_owned().await
    }

    async fn load(
        &self,
        participant_id: &ParticipantId,
    ) -> Result<SimulationState, ExperimentServiceError> {
        self.sessions
            .load_session(participant_id)
            .await
            .ok_or_else(|| ExperimentServiceError::SessionNotFound(participant_id.clone()))
    }

    async fn fresh_participant_id(&self) -> ParticipantId {
        let mut candidate = ParticipantId::generate();
        for _ in 1..MAX_ID_ATTEMPTS {
            if self.sessions.load_session(&candidate).await.is_none() {
                break;
            }
            candidate = ParticipantId::generate();
        }
        candidate
    }
}
