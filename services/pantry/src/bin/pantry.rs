//! services/pantry/src/bin/pantry.rs

use pantry_lib::{
    adapters::{load_achievement_catalog, load_knowledge_base, InMemoryProgressStore, SystemClock},
    config::Config,
    error::ServiceError,
    service::{handle_line, AppState},
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Starting pantry...");

    // --- 2. Load Static Tables ---
    let knowledge = Arc::new(load_knowledge_base(config.knowledge_base_path.as_deref()).await?);
    let catalog = Arc::new(load_achievement_catalog(config.achievements_path.as_deref()).await?);

    // --- 3. Build the Shared AppState ---
    let state = AppState::new(
        config.clone(),
        knowledge,
        catalog,
        Arc::new(InMemoryProgressStore::new()),
        Arc::new(SystemClock),
    );

    // --- 4. Process the Request Stream ---
    let input: Box<dyn AsyncRead + Unpin + Send> = match &config.input_path {
        Some(path) => {
            info!("Reading requests from {}", path.display());
            Box::new(tokio::fs::File::open(path).await?)
        }
        None => {
            info!("Reading requests from stdin");
            Box::new(tokio::io::stdin())
        }
    };

    let mut lines = BufReader::new(input).lines();
    let mut stdout = tokio::io::stdout();
    let mut handled = 0usize;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(&state, &line).await;
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await?;
        handled += 1;
    }
    stdout.flush().await?;

    info!(handled, "Request stream finished");
    Ok(())
}
