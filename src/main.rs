mod agent;
mod config;
mod providers;
mod server;
mod store;
mod traits;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::agent::Agent;
use crate::config::AppConfig;
use crate::providers::OpenAiCompatibleProvider;
use crate::server::AppState;
use crate::store::RestPlanStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));
    let config = AppConfig::load(&config_path)?;
    info!(config = %config_path.display(), "configuration loaded");

    let provider = Arc::new(OpenAiCompatibleProvider::new(
        &config.provider.base_url,
        &config.provider.api_key,
    )?);
    let plan_store = Arc::new(RestPlanStore::new(
        &config.store.base_url,
        &config.store.service_key,
    )?);
    let agent = Arc::new(Agent::new(provider, plan_store, &config.provider.model));

    let auth_token = match config.server.auth_token.clone() {
        Some(token) if !token.is_empty() => token,
        _ => {
            let token = uuid::Uuid::new_v4().to_string();
            // Only log a prefix to avoid exposing the full token in logs
            let prefix = token.get(..8).unwrap_or("????????");
            info!(
                "Ephemeral API token created (prefix: {}..., not persisted)",
                prefix
            );
            token
        }
    };

    let state = AppState { agent, auth_token };
    server::start_server(state, &config.server.bind_addr, config.server.port).await
}
