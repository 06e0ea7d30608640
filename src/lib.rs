//! Marketplace Poller - background service for marketplace integration events.
//!
//! This crate polls the marketplace Integration API event feed, processes
//! each event in arrival order, and persists the last processed sequence ID
//! so polling resumes from the correct position across restarts. The delay
//! between fetches adapts to the feed: short after a full page (backlog
//! likely), long once caught up.
//!
//! # Components
//!
//! - [`config`]: Poller configuration
//! - [`client`]: Integration API HTTP client
//! - [`events`]: Event feed types and cursor
//! - [`store`]: Durable cursor storage
//! - [`poller`]: The poll loop service
//! - [`likes`]: Like counter aggregation handler
//! - [`metrics`]: Poller metrics
//! - [`error`]: Poll iteration errors

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod likes;
pub mod metrics;
pub mod poller;
pub mod store;

pub use client::{ClientConfig, ClientError, Listing, MarketplaceClient};
pub use config::PollerConfig;
pub use error::PollerError;
pub use events::{Event, EventCursor, EventFilter, EventPage, EventType};
pub use likes::{LikeAggregator, ListingStore};
pub use metrics::PollerMetrics;
pub use poller::{EventFeed, EventHandler, LogHandler, PollOutcome, PollerService};
pub use store::CursorStore;
