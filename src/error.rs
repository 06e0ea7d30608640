//! Poller error types.
//!
//! The three failure kinds a poll iteration can hit. None of them is
//! allowed to terminate the loop; they are logged and counted, and the
//! next iteration is rescheduled on the idle delay.

use crate::client::ClientError;
use crate::store::StoreError;

/// Errors surfaced by a poll iteration.
#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    /// The event page could not be fetched.
    #[error("event fetch failed: {0}")]
    Fetch(#[from] ClientError),

    /// The cursor could not be persisted.
    #[error("cursor persistence failed: {0}")]
    Persist(#[from] StoreError),

    /// A handler failed while processing an event.
    #[error("event processing failed for sequence ID {sequence_id}: {message}")]
    Processing {
        /// Sequence ID of the event that failed.
        sequence_id: u64,
        /// Handler error message.
        message: String,
    },
}
