mod error;
mod holding;
mod overview;
mod player;
mod trade;

pub use error::LedgerError;
pub use holding::Holding;
pub use overview::{PortfolioOverview, PortfolioRow};
pub use player::Player;
pub use trade::{TradeAction, TradeRecord};
