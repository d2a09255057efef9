//! Carelink application binary - composition root.
//!
//! Ties together all Carelink crates into a single executable:
//! 1. Load configuration (CLI > env > TOML > defaults, with .env support)
//! 2. Initialize tracing
//! 3. Open SQLite storage and run migrations
//! 4. Build the provider client and the chat pipeline
//! 5. Start the axum REST API server

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use carelink_api::routes;
use carelink_api::state::AppState;
use carelink_chat::{ChatPipeline, ClassifierPolicy, DocumentStore, HttpProviderClient};
use carelink_core::config::CarelinkConfig;
use carelink_core::error::CarelinkError;
use carelink_storage::Database;

mod cli;
use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), CarelinkError> {
    // Pick up a local .env before reading any environment variables.
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();

    let config_path = args.resolve_config_path();
    let mut config = CarelinkConfig::load_or_default(&config_path);
    config.apply_env_overrides();
    config.server.port = args.resolve_port(config.server.port);
    if let Some(data_dir) = args.resolve_data_dir() {
        config.general.data_dir = data_dir;
    }
    if let Some(log_level) = args.resolve_log_level() {
        config.general.log_level = log_level;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!(
        port = config.server.port,
        model = %config.provider.model,
        policy = %config.chat.classifier_policy,
        "Carelink starting"
    );

    if config.provider.api_key.is_empty() {
        tracing::warn!(
            "No provider API key configured (set CARELINK_API_KEY); chat requests will fail"
        );
    }

    let db_path = expand_home(&config.general.data_dir).join("carelink.db");
    let database = Arc::new(Database::new(&db_path)?);

    let provider = HttpProviderClient::new(&config.provider)
        .map_err(|e| CarelinkError::Provider(e.to_string()))?;

    let policy = match config.chat.classifier_policy.parse::<ClassifierPolicy>() {
        Ok(policy) => policy,
        Err(e) => {
            tracing::warn!("{}; falling back to keyword policy", e);
            ClassifierPolicy::Keyword
        }
    };

    let pipeline = ChatPipeline::new(
        Arc::new(provider),
        DocumentStore::nhs_guidance(),
        policy,
        config.chat.temperature,
    );

    let state = AppState::new(config, database, pipeline);

    routes::start_server(state).await
}

/// Expand a leading `~` to the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE");
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME");

        if let Ok(home) = home {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
