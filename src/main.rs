mod config;
mod llm;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use crate::llm::LlmStream;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // A missing .env file is fine; real deployments set the environment directly.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::RelayConfig::from_env()?;

    // Initialize LLM client (non-fatal: the relay answers 503 until configured).
    let llm: Option<Arc<dyn LlmStream>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured; relay disabled");
            None
        }
    };

    let state = state::AppState::new(llm, config.persona);
    let app = routes::app(state);

    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|source| StartupError::Bind { port, source })?;

    tracing::info!(%port, "support relay listening");
    axum::serve(listener, app).await.map_err(StartupError::Serve)
}
