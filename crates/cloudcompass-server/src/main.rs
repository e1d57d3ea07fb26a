use clap::Parser;
use cloudcompass_server::{create_router, AppState, ServerConfig};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cloudcompass_server=info,cloudcompass_suggest=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::parse();
    let state = AppState::from_config(&config);
    {
        let settings = state.settings.read().await;
        if cloudcompass_core::ai_configured(&settings) {
            info!(provider = %settings.provider, model = %settings.model, "AI advisors enabled");
        } else {
            info!("AI not configured, advisors will use built-in fallbacks");
        }
    }

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("CloudCompass API listening on http://{}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
