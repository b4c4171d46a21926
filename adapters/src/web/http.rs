use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use application::ports::in_::{ExperimentExport, TradeReceipt};
use domain::{ParticipantId, SessionView, SurveyResponse, TradeAction};

use super::error::ApiError;
use super::state::AppState;

pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

#[derive(Debug, Deserialize)]
pub struct TradeRequest {
    pub action: TradeAction,
    pub stock: String,
    pub quantity: Decimal,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// Caller address: the first `x-forwarded-for` hop, else the socket peer.
#[derive(Debug, Clone)]
pub struct ClientIp(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        Ok(ClientIp(forwarded.or(peer)))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/participants", post(submit_survey))
        .route("/participants/{participant_id}", get(get_session))
        .route("/participants/{participant_id}/advance", post(advance))
        .route("/participants/{participant_id}/trades", post(trade))
        .route("/participants/{participant_id}/conclude", post(conclude))
        .route("/admin/export", get(admin_export))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn submit_survey(
    State(state): State<Arc<AppState>>,
    ClientIp(client_ip): ClientIp,
    Json(mut survey): Json<SurveyResponse>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    if client_ip.is_some() {
        survey.source_ip = client_ip;
    }
    let view = state.experiment.submit_survey(survey).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(participant_id): Path<ParticipantId>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.experiment.view(&participant_id).await?))
}

async fn advance(
    State(state): State<Arc<AppState>>,
    Path(participant_id): Path<ParticipantId>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.experiment.advance(&participant_id).await?))
}

async fn conclude(
    State(state): State<Arc<AppState>>,
    Path(participant_id): Path<ParticipantId>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.experiment.conclude(&participant_id).await?))
}

async fn trade(
    State(state): State<Arc<AppState>>,
    Path(participant_id): Path<ParticipantId>,
    Json(request): Json<TradeRequest>,
) -> Result<Json<TradeReceipt>, ApiError> {
    debug!(participant_id = %participant_id, request = ?request, "<- Trade");
    let receipt = state
        .experiment
        .trade(&participant_id, request.action, &request.stock, request.quantity)
        .await?;
    Ok(Json(receipt))
}

async fn admin_export(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ExperimentExport>, ApiError> {
    let Some(expected) = state.admin_password.as_deref() else {
        return Err(ApiError::Forbidden("admin export disabled".to_string()));
    };
    let supplied = headers.get(ADMIN_PASSWORD_HEADER).and_then(|v| v.to_str().ok());
    if supplied != Some(expected) {
        warn!("Admin export refused: wrong password");
        return Err(ApiError::Unauthorized);
    }
    Ok(Json(state.experiment.export().await?))
}
