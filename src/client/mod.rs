//! HTTP client for the marketplace Integration API.
//!
//! This module provides a type-safe client for the two remote surfaces the
//! poller consumes: the paginated event feed and the listing entity store.
//!
//! # Example
//!
//! ```rust,ignore
//! use marketplace_poller::client::{ClientConfig, MarketplaceClient};
//! use marketplace_poller::events::{EventFilter, EventType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MarketplaceClient::with_base_url("https://integ-api.example.com/v1")?;
//!
//!     let filter = EventFilter::after_sequence_id(vec![EventType::ListingLiked], 1042);
//!     let page = client.query_events(&filter).await?;
//!     println!("Fetched {} events", page.events.len());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use config::ClientConfig;
pub use error::ClientError;
pub use http::MarketplaceClient;
pub use types::{Listing, ListingAttributes};
