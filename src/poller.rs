//! Main event poll loop.
//!
//! Repeatedly fetches new events from the marketplace feed, hands each one
//! to the configured handler in arrival order, persists the last processed
//! sequence ID, and applies an adaptive delay: short after a full page
//! (backlog likely), long once the feed is caught up.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::client::{ClientError, MarketplaceClient};
use crate::config::{ConfigError, PollerConfig};
use crate::error::PollerError;
use crate::events::{Event, EventCursor, EventFilter, EventPage};
use crate::metrics::PollerMetrics;
use crate::store::CursorStore;

/// Source of event pages.
///
/// Implemented by [`MarketplaceClient`] for production and by in-memory
/// doubles in tests.
pub trait EventFeed: Send + Sync {
    /// Fetches one page of events matching the filter.
    fn query_events(
        &self,
        filter: &EventFilter,
    ) -> impl Future<Output = Result<EventPage, ClientError>> + Send;
}

impl EventFeed for MarketplaceClient {
    async fn query_events(&self, filter: &EventFilter) -> Result<EventPage, ClientError> {
        MarketplaceClient::query_events(self, filter).await
    }
}

/// Side-effecting reaction to a single event.
///
/// Handlers run synchronously, in arrival order, before the cursor
/// advances past the event. A handler failure is logged and counted but
/// does not stop the batch; the cursor advances regardless.
pub trait EventHandler: Send + Sync {
    /// Processes one event.
    fn handle(&self, event: &Event) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Handler that only logs each event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHandler;

impl EventHandler for LogHandler {
    async fn handle(&self, event: &Event) -> anyhow::Result<()> {
        debug!(
            sequence_id = event.sequence_id,
            event_type = %event.event_type,
            resource_id = event.resource_id.as_deref().unwrap_or(""),
            "Handled event"
        );
        Ok(())
    }
}

/// Outcome of a single poll iteration.
#[derive(Debug, Clone, Copy)]
pub struct PollOutcome {
    /// Number of events handled in this iteration.
    pub events_processed: usize,

    /// Whether the fetched page was filled to capacity.
    pub full_page: bool,

    /// Delay to apply before the next iteration.
    pub next_delay: Duration,
}

/// The event poller service.
pub struct PollerService<F, H> {
    /// Configuration.
    config: PollerConfig,

    /// Event feed.
    feed: F,

    /// Event handler.
    handler: H,

    /// Durable cursor storage.
    store: CursorStore,

    /// Metrics.
    metrics: Arc<PollerMetrics>,

    /// Whether the service is running.
    running: Arc<AtomicBool>,

    /// Wakes the inter-iteration delay on shutdown.
    shutdown: Arc<Notify>,

    /// Instant the service was created; cold starts poll from here on.
    started_at: DateTime<Utc>,
}

impl<F, H> PollerService<F, H>
where
    F: EventFeed,
    H: EventHandler,
{
    /// Creates a new poller service.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: PollerConfig, feed: F, handler: H) -> Result<Self, ConfigError> {
        config.validate()?;
        let store = CursorStore::new(&config.state_file);

        Ok(Self {
            config,
            feed,
            handler,
            store,
            metrics: Arc::new(PollerMetrics::new()),
            running: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
            started_at: Utc::now(),
        })
    }

    /// Returns the metrics.
    #[must_use]
    pub fn metrics(&self) -> Arc<PollerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Returns the cursor store.
    #[must_use]
    pub const fn store(&self) -> &CursorStore {
        &self.store
    }

    /// Returns true if the service is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Stops the service.
    ///
    /// Takes effect at the next cancellation point: the top of the next
    /// iteration, or immediately if the loop is waiting out a delay.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
        self.shutdown.notify_one();
        info!("Poller stop requested");
    }

    /// Runs the poll loop until stopped.
    ///
    /// Loads the stored cursor once at startup; the cursor then lives in
    /// this call's scope and is threaded through each iteration. The loop
    /// never dies on fetch, persistence, or handler failures — those are
    /// logged and retried on the next tick.
    pub async fn run(&self) {
        self.running.store(true, Ordering::Relaxed);

        let stored = self.store.load().await;
        match stored {
            Some(sequence_id) => {
                info!(
                    sequence_id,
                    "Resuming event polling from last seen sequence ID"
                );
            }
            None => {
                info!("No stored state found");
                info!(start = %self.started_at, "Starting event polling from current time");
            }
        }

        let mut cursor = EventCursor::from_stored(stored);

        while self.is_running() {
            let outcome = self.poll_once(&mut cursor).await;

            if !self.is_running() {
                break;
            }

            tokio::select! {
                _ = self.shutdown.notified() => {}
                _ = tokio::time::sleep(outcome.next_delay) => {}
            }
        }

        info!(
            events_processed = cursor.events_processed(),
            "Event poller stopped"
        );
    }

    /// Runs a single fetch-handle-persist cycle.
    ///
    /// Advances the cursor past every event in the page and persists the
    /// new position before the delay is armed. Returns the outcome with
    /// the adaptive delay for the next iteration.
    pub async fn poll_once(&self, cursor: &mut EventCursor) -> PollOutcome {
        self.metrics.record_poll();

        let filter = self.build_filter(cursor);
        let page = match self.feed.query_events(&filter).await {
            Ok(page) => page,
            Err(e) => {
                let err = PollerError::Fetch(e);
                warn!(error = %err, "Event fetch failed, retrying on idle delay");
                self.metrics.record_fetch_error();
                return PollOutcome {
                    events_processed: 0,
                    full_page: false,
                    next_delay: self.config.poll_idle_wait(),
                };
            }
        };

        let full_page = page.is_full();
        if page.is_empty() {
            debug!("No new events");
        }

        let mut handled = 0usize;
        for event in &page.events {
            // Idempotency guard: the feed should only send events past the
            // cursor, but a replayed page must not re-trigger handlers
            if cursor.is_processed(event.sequence_id) {
                debug!(
                    sequence_id = event.sequence_id,
                    "Skipping already processed event"
                );
                continue;
            }

            info!(
                sequence_id = event.sequence_id,
                event_type = %event.event_type,
                resource_id = event.resource_id.as_deref().unwrap_or(""),
                "Event detected"
            );

            if let Err(e) = self.handler.handle(event).await {
                let err = PollerError::Processing {
                    sequence_id: event.sequence_id,
                    message: e.to_string(),
                };
                warn!(error = %err, "Event handler failed, advancing past event");
                self.metrics.record_handler_error();
            }

            cursor.advance(event.sequence_id);
            handled += 1;
        }

        self.metrics.record_page(handled as u64, full_page);

        let mut next_delay = if full_page {
            self.config.poll_wait()
        } else {
            self.config.poll_idle_wait()
        };

        if let Some(last_sequence_id) = page.last_sequence_id() {
            if let Err(e) = self.store.save(last_sequence_id).await {
                let err = PollerError::Persist(e);
                error!(
                    error = %err,
                    last_sequence_id,
                    "Cursor persistence failed, continuing with in-memory cursor"
                );
                self.metrics.record_persist_error();
                next_delay = self.config.poll_idle_wait();
            }
        }

        PollOutcome {
            events_processed: handled,
            full_page,
            next_delay,
        }
    }

    /// Builds the feed filter for the current cursor position.
    ///
    /// With a known cursor the feed is asked for events strictly after it;
    /// on a cold start the feed is asked for events created at or after
    /// service start, so the full history is never replayed.
    fn build_filter(&self, cursor: &EventCursor) -> EventFilter {
        match cursor.last_sequence_id() {
            Some(sequence_id) => {
                EventFilter::after_sequence_id(self.config.event_types.clone(), sequence_id)
            }
            None => EventFilter::created_at_start(self.config.event_types.clone(), self.started_at),
        }
    }
}
