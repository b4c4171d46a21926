mod action;
mod config;
mod effect;
mod error;
mod group;
mod state;
mod survey;
mod view;


pub use action::SimulationAction;
pub use config::{EndowmentConfig, SimulationConfig, SimulationPhase};
pub use effect::SimulationEffect;
pub use error::SimulationError;
pub use group::Group;
pub use state::SimulationState;
pub use survey::{SurveyError, SurveyResponse};
pub use view::SessionView;
