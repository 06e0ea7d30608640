//! Types for the marketplace event feed.
//!
//! Defines the event record, the query filter, and the page envelope
//! returned by the Integration API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a marketplace event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    /// A new listing was created.
    ListingCreated,
    /// A listing was updated.
    ListingUpdated,
    /// A listing received a like.
    ListingLiked,
    /// A like was removed from a listing.
    ListingUnliked,
    /// A user profile was updated.
    UserUpdated,
    /// Any event type this client does not know about.
    Other(String),
}

impl EventType {
    /// Returns the wire name of the event type (e.g., `"listing/liked"`).
    #[must_use]
    pub fn as_wire(&self) -> &str {
        match self {
            Self::ListingCreated => "listing/created",
            Self::ListingUpdated => "listing/updated",
            Self::ListingLiked => "listing/liked",
            Self::ListingUnliked => "listing/unliked",
            Self::UserUpdated => "user/updated",
            Self::Other(s) => s,
        }
    }

    /// Parses a wire name into an event type.
    ///
    /// Unknown names are preserved as [`EventType::Other`] so that new
    /// server-side event categories never break deserialization.
    #[must_use]
    pub fn from_wire(s: &str) -> Self {
        match s {
            "listing/created" => Self::ListingCreated,
            "listing/updated" => Self::ListingUpdated,
            "listing/liked" => Self::ListingLiked,
            "listing/unliked" => Self::ListingUnliked,
            "user/updated" => Self::UserUpdated,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        Self::from_wire(&s)
    }
}

impl From<EventType> for String {
    fn from(t: EventType) -> Self {
        t.as_wire().to_string()
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// A single event from the marketplace feed.
///
/// Sequence IDs are strictly increasing across the feed; an event is never
/// reissued with a different payload for the same sequence ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event UUID assigned by the API.
    pub id: String,

    /// Position of the event in the globally ordered feed.
    pub sequence_id: u64,

    /// Event category.
    pub event_type: EventType,

    /// Creation time of the event.
    pub created_at: DateTime<Utc>,

    /// ID of the resource the event concerns (listing, user, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    /// Snapshot of the resource at event time, as sent by the API.
    #[serde(default)]
    pub resource: serde_json::Value,
}

/// Starting point for an event feed query.
///
/// Exactly one of the two variants is sent; the API rejects requests that
/// carry both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStart {
    /// Return events strictly after this sequence ID (resume semantics).
    AfterSequenceId(u64),
    /// Return events created at or after this instant (cold-start semantics).
    CreatedAtStart(DateTime<Utc>),
}

/// Filter for querying the event feed.
#[derive(Debug, Clone)]
pub struct EventFilter {
    /// Event categories to include.
    pub event_types: Vec<EventType>,

    /// Where in the feed to start.
    pub start: FeedStart,
}

impl EventFilter {
    /// Creates a filter that resumes strictly after the given sequence ID.
    #[must_use]
    pub fn after_sequence_id(event_types: Vec<EventType>, sequence_id: u64) -> Self {
        Self {
            event_types,
            start: FeedStart::AfterSequenceId(sequence_id),
        }
    }

    /// Creates a filter that starts from the given creation time.
    #[must_use]
    pub fn created_at_start(event_types: Vec<EventType>, start: DateTime<Utc>) -> Self {
        Self {
            event_types,
            start: FeedStart::CreatedAtStart(start),
        }
    }

    /// Renders the filter as URL query parameters.
    #[must_use]
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(2);

        if !self.event_types.is_empty() {
            let types = self
                .event_types
                .iter()
                .map(EventType::as_wire)
                .collect::<Vec<_>>()
                .join(",");
            params.push(("eventTypes".to_string(), types));
        }

        match &self.start {
            FeedStart::AfterSequenceId(seq) => {
                params.push(("startAfterSequenceId".to_string(), seq.to_string()));
            }
            FeedStart::CreatedAtStart(ts) => {
                params.push(("createdAtStart".to_string(), ts.to_rfc3339()));
            }
        }

        params
    }
}

/// Pagination metadata attached to an event page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Maximum number of events the API returns per page.
    pub per_page: u32,

    /// Number of events actually returned in this page.
    pub total_returned: u32,
}

/// One page of events from the feed, in ascending sequence-ID order.
#[derive(Debug, Clone)]
pub struct EventPage {
    /// Events in the page.
    pub events: Vec<Event>,

    /// Pagination metadata.
    pub meta: PageMeta,
}

impl EventPage {
    /// Returns an empty page with the given page size.
    #[must_use]
    pub fn empty(per_page: u32) -> Self {
        Self {
            events: Vec::new(),
            meta: PageMeta {
                per_page,
                total_returned: 0,
            },
        }
    }

    /// Returns true if the page holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns true if the page was filled to capacity.
    ///
    /// A full page signals that more events are likely immediately
    /// available, so the poller should come back quickly.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.meta.per_page > 0 && self.events.len() as u32 == self.meta.per_page
    }

    /// Returns the sequence ID of the last (highest) event in the page.
    #[must_use]
    pub fn last_sequence_id(&self) -> Option<u64> {
        self.events.last().map(|e| e.sequence_id)
    }
}
