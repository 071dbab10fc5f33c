use anyhow::Context;
use relay_core::models::settings::{LogFormat, ServerConfig};
use tracing_subscriber::EnvFilter;

pub mod core;
pub mod platforms;
pub mod server;
pub mod storage;

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let state = server::AppState::new(&config);
    let app = server::router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!(
        "[server] listening on http://{} ({} youtube strategy)",
        addr,
        config.youtube_strategy
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("[server] stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("[server] could not listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("[server] shutdown requested");
}
