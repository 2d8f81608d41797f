mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(cirex_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let extractor = match &config.extractor_endpoint {
        Some(endpoint) => Some(Arc::new(cirex_extract::ExtractClient::new(
            endpoint,
            config.extractor_api_key.as_deref(),
            config.extractor_timeout_secs,
        )?)),
        None => {
            tracing::warn!(
                "CIREX_EXTRACTOR_ENDPOINT not configured; extraction requests will return 500"
            );
            None
        }
    };

    tracing::info!(
        bind_addr = %config.bind_addr,
        extractor_configured = extractor.is_some(),
        "starting cirex server"
    );

    let app = build_app(AppState {
        config: Arc::clone(&config),
        extractor,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
