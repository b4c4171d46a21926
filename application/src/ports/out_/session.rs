use async_trait::async_trait;

use domain::{ParticipantId, SimulationState};

/// Live game sessions, one per participant. Completed sessions stay here so a
/// repeated completion check still finds them.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn load_session(
        &self,
        participant_id: &ParticipantId,
    ) -> Option<SimulationState>;

    async fn save_session(
        &self,
        state: &SimulationState,
    );
}
