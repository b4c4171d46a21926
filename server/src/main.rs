mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use adapters::{AppState, InMemory, SqliteGateway, default_price_rows, router};
use application::ports::in_::ExperimentService;
use application::ports::out_::{ExperimentGateway, SessionRepository};
use domain::SimulationConfig;

use config::ServerConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env();

    let sessions = Arc::new(InMemory::new());
    let gateway: Arc<dyn ExperimentGateway> = match &config.database {
        Some(path) => match open_sqlite(path) {
            Ok(gateway) => gateway,
            Err(err) => {
                error!(path = %path, error = %err, "Could not open database");
                std::process::exit(1);
            }
        },
        None => {
            warn!("BOURSE_DATABASE not set; collected data lives in memory only");
            sessions.clone() as Arc<dyn ExperimentGateway>
        }
    };
    let session_repo: Arc<dyn SessionRepository> = sessions;

    let experiment = Arc::new(ExperimentService::new(gateway, session_repo, SimulationConfig::default()));

    if config.admin_password.is_none() {
        info!("BOURSE_ADMIN_PASSWORD not set; admin export disabled");
    }
    let app_state = Arc::new(AppState::new(experiment, config.admin_password.clone()));

    let app = router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let bind_addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(addr = %bind_addr, error = %err, "Could not bind");
            std::process::exit(1);
        }
    };
    info!("Server listening on {bind_addr}");
    if let Err(err) = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await {
        error!(error = %err, "Server error");
    }
    info!("Server shut down");
}

fn open_sqlite(path: &str) -> Result<Arc<dyn ExperimentGateway>, application::ports::out_::GatewayError> {
    let gateway = SqliteGateway::open(path)?;
    let seeded = gateway.seed_prices_if_empty(&default_price_rows())?;
    info!(path = %path, seeded, "Using SQLite store");
    Ok(Arc::new(gateway))
}
