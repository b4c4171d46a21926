//! Core of the trading experiment: price playback, the participant ledger and
//! the per-participant simulation state machine. Nothing in here performs I/O.

mod ledger;
mod market;
mod simulation;
mod types;

pub use ledger::{Holding, LedgerError, Player, PortfolioOverview, PortfolioRow, TradeAction, TradeRecord};
pub use market::{MarketData, MarketQuote, PriceDataError, PriceRow, PriceSeries, Stock, round_cents};
pub use simulation::{
    EndowmentConfig, Group, SessionView, SimulationAction, SimulationConfig, SimulationEffect, SimulationError,
    SimulationPhase, SimulationState, SurveyError, SurveyResponse,
};
pub use types::{ParticipantId, Period};
