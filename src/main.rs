use std::sync::Arc;

use book_genre_api::{
    config::Config,
    db::{create_pool, MemoryStore, PgStore, Store},
    routes::{create_router, AppState},
    services::{GenrePredictor, OpenAiGenerator},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn Store> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = create_pool(url, config.database_max_connections).await?;
            tracing::info!("Connected to PostgreSQL");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, feedback is kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let predictor = build_predictor(&config);

    let state = Arc::new(AppState::new(store, predictor));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// A missing key or client build failure leaves prediction unavailable
fn build_predictor(config: &Config) -> GenrePredictor {
    let Some(api_key) = config.api_key() else {
        tracing::warn!("OPENAI_API_KEY not set, genre prediction is unavailable");
        return GenrePredictor::unavailable();
    };

    match OpenAiGenerator::new(
        api_key.to_string(),
        config.openai_api_url.clone(),
        config.openai_model.clone(),
        config.predictor_timeout(),
    ) {
        Ok(generator) => {
            tracing::info!(
                model = %config.openai_model,
                timeout_secs = config.predictor_timeout_secs,
                "Genre predictor ready"
            );
            GenrePredictor::new(Arc::new(generator), config.predictor_timeout())
        }
        Err(e) => {
            tracing::warn!(error = %e, "OpenAI client not initialized, genre prediction is unavailable");
            GenrePredictor::unavailable()
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
