//! Marketplace Poller binary.
//!
//! Entry point for the event polling service.

use std::env;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marketplace_poller::client::{ClientConfig, MarketplaceClient};
use marketplace_poller::config::PollerConfig;
use marketplace_poller::events::EventType;
use marketplace_poller::likes::LikeAggregator;
use marketplace_poller::poller::PollerService;

/// Reads a numeric environment variable with a fallback.
fn env_u64(name: &str, default: u64) -> anyhow::Result<u64> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| anyhow::anyhow!("{name} must be a valid number, got {value:?}")),
        Err(_) => Ok(default),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,marketplace_poller=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let base_url = env::var("MARKETPLACE_BASE_URL")
        .unwrap_or_else(|_| "https://integ-api.marketplace.example/v1".to_string());
    let state_file = env::var("POLLER_STATE_FILE")
        .unwrap_or_else(|_| "./marketplace-poller.state".to_string());
    let poll_wait_ms = env_u64("POLL_WAIT_MS", 250)?;
    let poll_idle_wait_ms = env_u64("POLL_IDLE_WAIT_MS", 10_000)?;
    let event_types = env::var("EVENT_TYPES")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(EventType::from_wire)
                .collect::<Vec<_>>()
        })
        .unwrap_or_else(|_| vec![EventType::ListingLiked, EventType::ListingUnliked]);

    let mut client_config = ClientConfig::new(base_url.clone());
    if let (Ok(client_id), Ok(client_secret)) = (
        env::var("MARKETPLACE_CLIENT_ID"),
        env::var("MARKETPLACE_CLIENT_SECRET"),
    ) {
        client_config = client_config.with_credentials(client_id, client_secret);
    }

    tracing::info!("Starting Marketplace Poller");
    tracing::info!("API base URL: {}", base_url);
    tracing::info!("State file: {}", state_file);
    tracing::info!(
        "Poll waits: {} ms active / {} ms idle",
        poll_wait_ms,
        poll_idle_wait_ms
    );

    let client = MarketplaceClient::new(client_config)?;

    let config = PollerConfig::with_event_types(event_types)
        .with_poll_waits(poll_wait_ms, poll_idle_wait_ms)
        .with_state_file(state_file);
    let aggregator = LikeAggregator::new(client.clone(), config.max_conflict_retries);

    let service = Arc::new(PollerService::new(config, client, aggregator)?);

    let runner = Arc::clone(&service);
    let handle = tokio::spawn(async move { runner.run().await });

    tracing::info!("Press <CTRL>+C to quit.");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down poller");

    service.stop();
    handle.await?;

    let snapshot = service.metrics().snapshot();
    tracing::info!(
        "Processed {} events over {} poll cycles",
        snapshot.events_processed,
        snapshot.poll_cycles
    );

    Ok(())
}
