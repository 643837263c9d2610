use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use huduma::config::AppConfig;
use huduma::errors::AppError;
use huduma::services::gateway::simulated::SimulatedGateway;
use huduma::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    let mpesa = config
        .initial_mpesa_config()
        .map_err(|e| AppError::Config(e.to_string()))?;

    tracing::info!(
        service_fee_percentage = %mpesa.service_fee_percentage,
        week_start = ?config.week_start,
        "using simulated payment gateway (confirm delay: {:?})",
        config.gateway_confirm_delay()
    );
    let gateway = SimulatedGateway::new(config.gateway_confirm_delay());

    let state = Arc::new(AppState::new(config.clone(), mpesa, Box::new(gateway)));

    let app = huduma::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
