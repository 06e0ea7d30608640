//! Poller configuration.
//!
//! Provides configuration options for the event poll loop.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::events::EventType;

/// Configuration for the event poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Delay in milliseconds before the next fetch when the last page was
    /// full and more events are likely buffered.
    pub poll_wait_ms: u64,

    /// Delay in milliseconds before the next fetch when the poller has
    /// caught up with the feed.
    pub poll_idle_wait_ms: u64,

    /// Path of the file holding the last processed sequence ID.
    pub state_file: PathBuf,

    /// Event categories to poll for.
    pub event_types: Vec<EventType>,

    /// Maximum retries of the read-modify-write cycle when a conditional
    /// listing update hits a version conflict.
    pub max_conflict_retries: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_wait_ms: 250,
            poll_idle_wait_ms: 10_000,
            state_file: PathBuf::from("./marketplace-poller.state"),
            event_types: vec![EventType::ListingLiked, EventType::ListingUnliked],
            max_conflict_retries: 3,
        }
    }
}

impl PollerConfig {
    /// Creates a configuration polling for the given event types.
    #[must_use]
    pub fn with_event_types(event_types: Vec<EventType>) -> Self {
        Self {
            event_types,
            ..Default::default()
        }
    }

    /// Sets the active and idle poll delays.
    #[must_use]
    pub fn with_poll_waits(mut self, poll_wait_ms: u64, poll_idle_wait_ms: u64) -> Self {
        self.poll_wait_ms = poll_wait_ms;
        self.poll_idle_wait_ms = poll_idle_wait_ms;
        self
    }

    /// Sets the state file path.
    #[must_use]
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = path.into();
        self
    }

    /// Sets the maximum conflict retries for conditional updates.
    #[must_use]
    pub fn with_max_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }

    /// Returns the delay applied after a full page.
    #[must_use]
    pub const fn poll_wait(&self) -> Duration {
        Duration::from_millis(self.poll_wait_ms)
    }

    /// Returns the delay applied once the feed is caught up.
    #[must_use]
    pub const fn poll_idle_wait(&self) -> Duration {
        Duration::from_millis(self.poll_idle_wait_ms)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_wait_ms == 0 {
            return Err(ConfigError::InvalidPollWait);
        }

        if self.poll_idle_wait_ms < self.poll_wait_ms {
            return Err(ConfigError::InvalidIdleWait);
        }

        if self.state_file.as_os_str().is_empty() {
            return Err(ConfigError::EmptyStateFile);
        }

        if self.event_types.is_empty() {
            return Err(ConfigError::NoEventTypes);
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid active poll delay.
    #[error("poll_wait_ms must be > 0")]
    InvalidPollWait,

    /// Idle delay shorter than the active delay.
    #[error("poll_idle_wait_ms must be >= poll_wait_ms")]
    InvalidIdleWait,

    /// Empty state file path.
    #[error("state_file must not be empty")]
    EmptyStateFile,

    /// No event types to poll for.
    #[error("event_types must not be empty")]
    NoEventTypes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = PollerConfig::default();
        assert_eq!(config.poll_wait_ms, 250);
        assert_eq!(config.poll_idle_wait_ms, 10_000);
        assert_eq!(config.max_conflict_retries, 3);
        assert!(!config.event_types.is_empty());
    }

    #[test]
    fn test_config_builder() {
        let config = PollerConfig::with_event_types(vec![EventType::UserUpdated])
            .with_poll_waits(100, 5_000)
            .with_state_file("/tmp/poller.state")
            .with_max_conflict_retries(5);

        assert_eq!(config.event_types, vec![EventType::UserUpdated]);
        assert_eq!(config.poll_wait_ms, 100);
        assert_eq!(config.poll_idle_wait_ms, 5_000);
        assert_eq!(config.state_file, PathBuf::from("/tmp/poller.state"));
        assert_eq!(config.max_conflict_retries, 5);
    }

    #[test]
    fn test_config_durations() {
        let config = PollerConfig::default();
        assert_eq!(config.poll_wait(), Duration::from_millis(250));
        assert_eq!(config.poll_idle_wait(), Duration::from_millis(10_000));
    }

    #[test]
    fn test_config_validate_valid() {
        assert!(PollerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validate_zero_poll_wait() {
        let config = PollerConfig {
            poll_wait_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPollWait)
        ));
    }

    #[test]
    fn test_config_validate_idle_shorter_than_active() {
        let config = PollerConfig {
            poll_wait_ms: 1_000,
            poll_idle_wait_ms: 500,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidIdleWait)
        ));
    }

    #[test]
    fn test_config_validate_empty_state_file() {
        let config = PollerConfig {
            state_file: PathBuf::new(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyStateFile)
        ));
    }

    #[test]
    fn test_config_validate_no_event_types() {
        let config = PollerConfig {
            event_types: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoEventTypes)));
    }
}
