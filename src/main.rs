// src/main.rs

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use dot_backend::api::app_router;
use dot_backend::config::CONFIG;
use dot_backend::llm::{GeminiClient, TextGenerator};
use dot_backend::state::AppState;

/// Graceful shutdown signal handler for SIGTERM and Ctrl+C
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(CONFIG.logging.tracing_level())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    CONFIG.validate()?;

    info!("Starting persona chat backend");
    info!("Model: {}", CONFIG.gemini.model);

    // Applied on every pooled connection; cascading deletes rely on foreign keys
    let connect_options = SqliteConnectOptions::from_str(&CONFIG.database.url)?
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(CONFIG.database.max_connections)
        .connect_with(connect_options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::new(CONFIG.gemini.clone())?);
    let app_state = Arc::new(AppState::new(
        pool,
        generator,
        &CONFIG.auth,
        &CONFIG.persona,
    )?);

    let app = app_router(app_state);

    let bind_address = CONFIG.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("HTTP server listening on http://{}", bind_address);
    info!("Health endpoints: /health, /ready, /live");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}
