//! Like counter aggregation.
//!
//! Keeps a denormalized `likes` counter in listing public data in sync
//! with like/unlike events from the feed. The counter update is an
//! optimistic read-modify-write: the listing is re-read and the write
//! retried when the entity version changed underneath us.

use std::future::Future;

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::client::{ClientError, Listing, MarketplaceClient};
use crate::events::{Event, EventType};
use crate::poller::EventHandler;

/// Public data key holding the like counter.
const LIKES_KEY: &str = "likes";

/// Listing read/update surface of the Integration API.
///
/// Implemented by [`MarketplaceClient`] for production and by in-memory
/// doubles in tests.
pub trait ListingStore: Send + Sync {
    /// Gets a listing by ID.
    fn get_listing(&self, id: &str) -> impl Future<Output = Result<Listing, ClientError>> + Send;

    /// Conditionally replaces a listing's public data.
    fn update_listing(
        &self,
        id: &str,
        public_data: &Map<String, Value>,
        expected_version: u64,
    ) -> impl Future<Output = Result<Listing, ClientError>> + Send;
}

impl ListingStore for MarketplaceClient {
    async fn get_listing(&self, id: &str) -> Result<Listing, ClientError> {
        MarketplaceClient::get_listing(self, id).await
    }

    async fn update_listing(
        &self,
        id: &str,
        public_data: &Map<String, Value>,
        expected_version: u64,
    ) -> Result<Listing, ClientError> {
        MarketplaceClient::update_listing(self, id, public_data, expected_version).await
    }
}

/// Event handler that aggregates like counters onto listings.
pub struct LikeAggregator<S> {
    /// Listing store.
    store: S,

    /// Maximum retries of the read-modify-write cycle on version conflict.
    max_conflict_retries: u32,
}

impl<S: ListingStore> LikeAggregator<S> {
    /// Creates a new aggregator over the given store.
    #[must_use]
    pub fn new(store: S, max_conflict_retries: u32) -> Self {
        Self {
            store,
            max_conflict_retries,
        }
    }

    /// Adds a signed delta to a listing's like counter.
    ///
    /// Reads the current counter (absent counts as 0), adds `delta`, and
    /// writes the result back conditioned on the listing version observed
    /// during the read. A version conflict re-runs the whole cycle, up to
    /// the configured retry cap.
    ///
    /// Returns the counter value after the update.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be read, or if the update
    /// keeps conflicting after all retries.
    pub async fn apply_delta(&self, listing_id: &str, delta: i64) -> Result<i64, ClientError> {
        let mut attempt = 0;

        loop {
            let listing = self.store.get_listing(listing_id).await?;
            let current = listing.public_data_counter(LIKES_KEY);
            let updated = current.saturating_add(delta);

            let mut public_data = listing.attributes.public_data.clone();
            public_data.insert(LIKES_KEY.to_string(), json!(updated));

            match self
                .store
                .update_listing(listing_id, &public_data, listing.version)
                .await
            {
                Ok(saved) => return Ok(saved.public_data_counter(LIKES_KEY)),
                Err(e) if e.is_conflict() && attempt < self.max_conflict_retries => {
                    attempt += 1;
                    debug!(
                        listing_id,
                        attempt, "Listing changed during update, re-reading"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<S: ListingStore> EventHandler for LikeAggregator<S> {
    async fn handle(&self, event: &Event) -> anyhow::Result<()> {
        let delta = match event.event_type {
            EventType::ListingLiked => 1,
            EventType::ListingUnliked => -1,
            _ => return Ok(()),
        };

        let listing_id = event
            .resource_id
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("like event without resource ID"))?;

        let likes = self.apply_delta(listing_id, delta).await?;
        info!(listing_id, likes, "Updated like counter");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ListingAttributes;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Store double holding one listing, optionally conflicting N times.
    struct FakeStore {
        listing: Mutex<Listing>,
        conflicts_remaining: Mutex<u32>,
        update_attempts: Mutex<u32>,
    }

    impl FakeStore {
        fn with_likes(likes: Option<i64>) -> Self {
            let mut public_data = Map::new();
            if let Some(likes) = likes {
                public_data.insert(LIKES_KEY.to_string(), json!(likes));
            }
            Self {
                listing: Mutex::new(Listing {
                    id: "listing-9".to_string(),
                    version: 1,
                    attributes: ListingAttributes {
                        title: Some("Canoe".to_string()),
                        state: Some("published".to_string()),
                        public_data,
                    },
                }),
                conflicts_remaining: Mutex::new(0),
                update_attempts: Mutex::new(0),
            }
        }

        fn conflicting(likes: Option<i64>, conflicts: u32) -> Self {
            let store = Self::with_likes(likes);
            *store.conflicts_remaining.lock().expect("lock") = conflicts;
            store
        }

        fn update_attempts(&self) -> u32 {
            *self.update_attempts.lock().expect("lock")
        }
    }

    impl ListingStore for FakeStore {
        async fn get_listing(&self, _id: &str) -> Result<Listing, ClientError> {
            Ok(self.listing.lock().expect("lock").clone())
        }

        async fn update_listing(
            &self,
            _id: &str,
            public_data: &Map<String, Value>,
            expected_version: u64,
        ) -> Result<Listing, ClientError> {
            *self.update_attempts.lock().expect("lock") += 1;

            let mut conflicts = self.conflicts_remaining.lock().expect("lock");
            if *conflicts > 0 {
                *conflicts -= 1;
                // A concurrent writer bumped the version
                self.listing.lock().expect("lock").version += 1;
                return Err(ClientError::Conflict { expected_version });
            }
            drop(conflicts);

            let mut listing = self.listing.lock().expect("lock");
            if listing.version != expected_version {
                return Err(ClientError::Conflict { expected_version });
            }
            listing.attributes.public_data = public_data.clone();
            listing.version += 1;
            Ok(listing.clone())
        }
    }

    fn like_event(event_type: EventType, resource_id: Option<&str>) -> Event {
        Event {
            id: "evt-1".to_string(),
            sequence_id: 1043,
            event_type,
            created_at: Utc::now(),
            resource_id: resource_id.map(str::to_string),
            resource: Value::Null,
        }
    }

    #[tokio::test]
    async fn test_apply_delta_absent_counter_starts_at_zero() {
        let aggregator = LikeAggregator::new(FakeStore::with_likes(None), 3);

        let likes = aggregator.apply_delta("listing-9", 1).await.expect("delta");
        assert_eq!(likes, 1);
    }

    #[tokio::test]
    async fn test_apply_delta_adds_to_existing_counter() {
        let aggregator = LikeAggregator::new(FakeStore::with_likes(Some(12)), 3);

        let likes = aggregator.apply_delta("listing-9", 1).await.expect("delta");
        assert_eq!(likes, 13);

        let likes = aggregator
            .apply_delta("listing-9", -1)
            .await
            .expect("delta");
        assert_eq!(likes, 12);
    }

    #[tokio::test]
    async fn test_apply_delta_retries_conflicts() {
        let aggregator = LikeAggregator::new(FakeStore::conflicting(Some(5), 2), 3);

        let likes = aggregator.apply_delta("listing-9", 1).await.expect("delta");
        assert_eq!(likes, 6);
        assert_eq!(aggregator.store.update_attempts(), 3);
    }

    #[tokio::test]
    async fn test_apply_delta_surfaces_exhausted_conflicts() {
        let aggregator = LikeAggregator::new(FakeStore::conflicting(Some(5), 10), 2);

        let err = aggregator
            .apply_delta("listing-9", 1)
            .await
            .expect_err("conflict");
        assert!(err.is_conflict());
        assert_eq!(aggregator.store.update_attempts(), 3);
    }

    #[tokio::test]
    async fn test_handle_liked_increments() {
        let aggregator = LikeAggregator::new(FakeStore::with_likes(Some(2)), 3);

        aggregator
            .handle(&like_event(EventType::ListingLiked, Some("listing-9")))
            .await
            .expect("handle");

        let listing = aggregator.store.get_listing("listing-9").await.expect("get");
        assert_eq!(listing.public_data_counter(LIKES_KEY), 3);
    }

    #[tokio::test]
    async fn test_handle_unliked_decrements() {
        let aggregator = LikeAggregator::new(FakeStore::with_likes(Some(2)), 3);

        aggregator
            .handle(&like_event(EventType::ListingUnliked, Some("listing-9")))
            .await
            .expect("handle");

        let listing = aggregator.store.get_listing("listing-9").await.expect("get");
        assert_eq!(listing.public_data_counter(LIKES_KEY), 1);
    }

    #[tokio::test]
    async fn test_handle_ignores_other_event_types() {
        let aggregator = LikeAggregator::new(FakeStore::with_likes(Some(2)), 3);

        aggregator
            .handle(&like_event(EventType::ListingUpdated, Some("listing-9")))
            .await
            .expect("handle");

        assert_eq!(aggregator.store.update_attempts(), 0);
    }

    #[tokio::test]
    async fn test_handle_missing_resource_id_is_error() {
        let aggregator = LikeAggregator::new(FakeStore::with_likes(Some(2)), 3);

        let result = aggregator
            .handle(&like_event(EventType::ListingLiked, None))
            .await;
        assert!(result.is_err());
    }
}
