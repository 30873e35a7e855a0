use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod state;

use config::AppConfig;
use services::booking_store::InMemoryBookingStore;
use services::mpesa_service::MpesaService;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(AppConfig::from_env().context("failed to load configuration")?);
    tracing::info!("✅ App config loaded");
    tracing::info!("📱 Short code: {}", config.mpesa_short_code);
    tracing::info!("🌐 Environment: {}", config.mpesa_environment.as_str());
    tracing::info!("📨 Callback URL: {}", config.mpesa_callback_url);
    if !config.is_production() {
        tracing::warn!("Running against the M-Pesa sandbox");
    }

    let app_state = initialize_app_state(config.clone())?;
    let app = routes::build_router(app_state);
    start_server(app, &config).await
}

fn initialize_app_state(config: Arc<AppConfig>) -> anyhow::Result<AppState> {
    let mpesa_service = Arc::new(MpesaService::new(config.clone())?);
    let booking_store = Arc::new(InMemoryBookingStore::new());
    Ok(AppState::new(config, mpesa_service, booking_store))
}

async fn start_server(app: axum::Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    tracing::info!("🚀 Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}
