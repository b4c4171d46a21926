use thiserror::Error;

use super::SimulationPhase;
use crate::LedgerError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("{action} not valid in phase {phase:?}")]
    InvalidPeriodRequest {
        action: &'static str,
        phase: SimulationPhase,
    },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("unknown stock: {0}")]
    UnknownStock(String),
}
