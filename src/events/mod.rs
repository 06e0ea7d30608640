//! Event feed types for the marketplace poller.
//!
//! # Components
//!
//! - [`types`]: Event, EventType, EventFilter, EventPage
//! - [`cursor`]: EventCursor for tracking feed position

pub mod cursor;
pub mod types;

pub use cursor::EventCursor;
pub use types::{Event, EventFilter, EventPage, EventType, FeedStart, PageMeta};
