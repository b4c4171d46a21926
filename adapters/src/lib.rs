mod dataset;
mod in_memory;
mod sqlite;
mod web;

pub use dataset::default_price_rows;
pub use in_memory::InMemory;
pub use sqlite::SqliteGateway;
pub use web::{ADMIN_PASSWORD_HEADER, ApiError, AppState, ClientIp, TradeRequest, router};
