mod error;
mod http;
mod state;

pub use error::ApiError;
pub use http::{ADMIN_PASSWORD_HEADER, ClientIp, TradeRequest, router};
pub use state::AppState;
