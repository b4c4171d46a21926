use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use rust_decimal::Decimal;

use application::ports::out_::{
    ActionRecord, ExperimentGateway, GatewayError, ResultRecord, SessionRepository, SurveyRecord,
};
use domain::{Group, ParticipantId, PriceRow, SimulationState, SurveyResponse, TradeRecord};

use crate::dataset::default_price_rows;

/// Process-local store for sessions and collected data. Nothing survives a
/// restart.
pub struct InMemory {
    prices: Vec<PriceRow>,
    surveys: RwLock<Vec<SurveyRecord>>,
    actions: RwLock<Vec<ActionRecord>>,
    results: RwLock<Vec<ResultRecord>>,
    sessions: RwLock<HashMap<ParticipantId, SimulationState>>,
}

impl InMemory {
    pub fn new() -> Self {
        Self::with_prices(default_price_rows())
    }

    pub fn with_prices(prices: Vec<PriceRow>) -> Self {
        Self {
            prices,
            surveys: RwLock::new(Vec::new()),
            actions: RwLock::new(Vec::new()),
            results: RwLock::new(Vec::new()),
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> GatewayError {
    GatewayError::Unavailable("in-memory store poisoned".to_string())
}

#[async_trait]
impl ExperimentGateway for InMemory {
    async fn record_survey(
        &self,
        participant_id: &ParticipantId,
        survey: &SurveyResponse,
        group: Group,
    ) -> Result<(), GatewayError> {
        let record = SurveyRecord {
            participant_id: participant_id.clone(),
            survey: survey.clone(),
            group,
        };
        let mut surveys = self.surveys.write().map_err(poisoned)?;
        match surveys.iter_mut().find(|s| &s.participant_id == participant_id) {
            Some(existing) => *existing = record,
            None => surveys.push(record),
        }
        Ok(())
    }

    async fn record_action(
        &self,
        participant_id: &ParticipantId,
        trade: &TradeRecord,
    ) -> Result<(), GatewayError> {
        self.actions.write().map_err(poisoned)?.push(ActionRecord {
            participant_id: participant_id.clone(),
            trade: trade.clone(),
        });
        Ok(())
    }

    async fn record_result(
        &self,
        participant_id: &ParticipantId,
        total_value: Decimal,
    ) -> Result<(), GatewayError> {
        let mut results = self.results.write().map_err(poisoned)?;
        match results.iter_mut().find(|r| &r.participant_id == participant_id) {
            Some(existing) => existing.total_value = total_value,
            None => results.push(ResultRecord {
                participant_id: participant_id.clone(),
                total_value,
            }),
        }
        Ok(())
    }

    async fn load_price_dataset(&self) -> Result<Vec<PriceRow>, GatewayError> {
        Ok(self.prices.clone())
    }

    async fn count_participants(&self) -> Result<u64, GatewayError> {
        Ok(self.surveys.read().map_err(poisoned)?.len() as u64)
    }

    async fn list_surveys(&self) -> Result<Vec<SurveyRecord>, GatewayError> {
        Ok(self.surveys.read().map_err(poisoned)?.clone())
    }

    async fn list_actions(&self) -> Result<Vec<ActionRecord>, GatewayError> {
        Ok(self.actions.read().map_err(poisoned)?.clone())
    }

    async fn list_results(&self) -> Result<Vec<ResultRecord>, GatewayError> {
        Ok(self.results.read().map_err(poisoned)?.clone())
    }
}

#[async_trait]
impl SessionRepository for InMemory {
    async fn load_session(
        &self,
        participant_id: &ParticipantId,
    ) -> Option<SimulationState> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(participant_id)
            .cloned()
    }

    async fn save_session(
        &self,
        state: &SimulationState,
    ) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(state.participant_id().clone(), state.clone());
    }
}
