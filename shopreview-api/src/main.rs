mod routes;
mod session;

use shopreview_app::{AppConfig, AppContext};
use shopreview_errors::AppError;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Server stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let app_context = AppContext::connect(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind {}: {e}", config.bind_addr)))?;

    tracing::info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, routes::app(app_context))
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {e}")))
}
