//! Event cursor for tracking feed position.
//!
//! The cursor marks the boundary between processed and unprocessed events
//! and is the sole piece of durable state the poller owns.

use serde::{Deserialize, Serialize};

/// Cursor over the marketplace event feed.
///
/// Holds the sequence ID of the most recently processed event. `None`
/// means no event has been processed yet (cold start).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventCursor {
    /// Sequence ID of the last processed event, if any.
    last_sequence_id: Option<u64>,

    /// Number of events processed since this cursor was created.
    events_processed: u64,
}

impl EventCursor {
    /// Creates a cursor with no known position (cold start).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_sequence_id: None,
            events_processed: 0,
        }
    }

    /// Creates a cursor resuming from a stored sequence ID.
    #[must_use]
    pub const fn resume_from(sequence_id: u64) -> Self {
        Self {
            last_sequence_id: Some(sequence_id),
            events_processed: 0,
        }
    }

    /// Creates a cursor from an optional stored value.
    #[must_use]
    pub const fn from_stored(stored: Option<u64>) -> Self {
        Self {
            last_sequence_id: stored,
            events_processed: 0,
        }
    }

    /// Returns the last processed sequence ID, if any.
    #[must_use]
    pub const fn last_sequence_id(&self) -> Option<u64> {
        self.last_sequence_id
    }

    /// Returns the number of events processed through this cursor.
    #[must_use]
    pub const fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Returns true if the given sequence ID has already been processed.
    #[must_use]
    pub fn is_processed(&self, sequence_id: u64) -> bool {
        self.last_sequence_id
            .is_some_and(|last| sequence_id <= last)
    }

    /// Advances the cursor to the given sequence ID.
    ///
    /// The cursor never moves backwards; an advance to a sequence ID at or
    /// below the current position is ignored.
    pub fn advance(&mut self, sequence_id: u64) {
        if self.last_sequence_id.is_none_or(|last| sequence_id > last) {
            self.last_sequence_id = Some(sequence_id);
            self.events_processed = self.events_processed.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_new() {
        let cursor = EventCursor::new();
        assert_eq!(cursor.last_sequence_id(), None);
        assert_eq!(cursor.events_processed(), 0);
    }

    #[test]
    fn test_cursor_resume_from() {
        let cursor = EventCursor::resume_from(1042);
        assert_eq!(cursor.last_sequence_id(), Some(1042));
        assert_eq!(cursor.events_processed(), 0);
    }

    #[test]
    fn test_cursor_from_stored() {
        assert_eq!(EventCursor::from_stored(None).last_sequence_id(), None);
        assert_eq!(
            EventCursor::from_stored(Some(7)).last_sequence_id(),
            Some(7)
        );
    }

    #[test]
    fn test_cursor_is_processed() {
        let cursor = EventCursor::resume_from(1042);

        assert!(cursor.is_processed(1042));
        assert!(cursor.is_processed(1000));
        assert!(!cursor.is_processed(1043));

        let cold = EventCursor::new();
        assert!(!cold.is_processed(0));
        assert!(!cold.is_processed(1));
    }

    #[test]
    fn test_cursor_advance_monotonic() {
        let mut cursor = EventCursor::new();

        cursor.advance(10);
        assert_eq!(cursor.last_sequence_id(), Some(10));
        assert_eq!(cursor.events_processed(), 1);

        cursor.advance(20);
        assert_eq!(cursor.last_sequence_id(), Some(20));
        assert_eq!(cursor.events_processed(), 2);

        // Never moves backwards
        cursor.advance(15);
        assert_eq!(cursor.last_sequence_id(), Some(20));
        assert_eq!(cursor.events_processed(), 2);

        cursor.advance(20);
        assert_eq!(cursor.last_sequence_id(), Some(20));
        assert_eq!(cursor.events_processed(), 2);
    }
}
