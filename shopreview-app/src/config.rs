use shopreview_errors::AppError;
use std::{env, fmt::Display, net::SocketAddr, str::FromStr};
use tracing::{info, warn};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub run_migrations: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());
        if database_url.is_none() {
            warn!("DATABASE_URL not set, using the in-memory store");
        }

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::Internal("JWT_SECRET must be set".to_string()))?;

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: try_load("BIND_ADDR", DEFAULT_BIND_ADDR)?,
            run_migrations: try_load("RUN_MIGRATIONS", "false")?,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, AppError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| AppError::Internal(format!("Invalid {key} value {raw:?}: {e}")))
}
