use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use domain::{Group, ParticipantId, PriceRow, SurveyResponse, TradeRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage write failed: {0}")]
    Write(String),

    #[error("storage read failed: {0}")]
    Read(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyRecord {
    pub participant_id: ParticipantId,
    #[serde(flatten)]
    pub survey: SurveyResponse,
    pub group: Group,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord {
    pub participant_id: ParticipantId,
    #[serde(flatten)]
    pub trade: TradeRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub participant_id: ParticipantId,
    pub total_value: Decimal,
}

/// Durable store for everything the experiment collects.
#[async_trait]
pub trait ExperimentGateway: Send + Sync {
    /// Upsert keyed by participant id.
    async fn record_survey(
        &self,
        participant_id: &ParticipantId,
        survey: &SurveyResponse,
        group: Group,
    ) -> Result<(), GatewayError>;

    /// Append-only.
    async fn record_action(
        &self,
        participant_id: &ParticipantId,
        trade: &TradeRecord,
    ) -> Result<(), GatewayError>;

    /// Upsert keyed by participant id; the last write wins.
    async fn record_result(
        &self,
        participant_id: &ParticipantId,
        total_value: Decimal,
    ) -> Result<(), GatewayError>;

    async fn load_price_dataset(&self) -> Result<Vec<PriceRow>, GatewayError>;

    async fn count_participants(&self) -> Result<u64, GatewayError>;

    async fn list_surveys(&self) -> Result<Vec<SurveyRecord>, GatewayError>;

    async fn list_actions(&self) -> Result<Vec<ActionRecord>, GatewayError>;

    async fn list_results(&self) -> Result<Vec<ResultRecord>, GatewayError>;
}
