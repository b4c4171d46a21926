/// Server settings read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// SQLite file; the in-memory store is used when unset.
    pub database: Option<String>,
    pub admin_password: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("BOURSE_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let host = std::env::var("BOURSE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let database = std::env::var("BOURSE_DATABASE").ok().filter(|s| !s.is_empty());
        let admin_password = std::env::var("BOURSE_ADMIN_PASSWORD").ok().filter(|s| !s.is_empty());

        Self {
            host,
            port,
            database,
            admin_password,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
