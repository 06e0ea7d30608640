//! Client configuration.
//!
//! Provides configuration options for the Integration API client.

use std::time::Duration;

/// Default base URL for the Integration API.
pub const DEFAULT_BASE_URL: &str = "https://integ-api.marketplace.example/v1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default maximum retries.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for the Integration API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the API.
    pub base_url: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Maximum number of retries for failed requests.
    pub max_retries: u32,

    /// Client ID for authentication.
    pub client_id: Option<String>,

    /// Client secret for authentication.
    pub client_secret: Option<String>,

    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            client_id: None,
            client_secret: None,
            user_agent: format!("marketplace-poller/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum number of retries.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the client credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or the timeout is zero.
    pub fn validate(&self) -> Result<(), super::error::ClientError> {
        if self.base_url.is_empty() {
            return Err(super::error::ClientError::InvalidConfig(
                "base_url must not be empty".to_string(),
            ));
        }

        if self.timeout.is_zero() {
            return Err(super::error::ClientError::InvalidConfig(
                "timeout must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert!(config.client_id.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("https://api.example.com")
            .with_timeout(Duration::from_secs(5))
            .with_max_retries(1)
            .with_credentials("id-123", "secret-456")
            .with_user_agent("tester/1.0");

        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.client_id.as_deref(), Some("id-123"));
        assert_eq!(config.client_secret.as_deref(), Some("secret-456"));
        assert_eq!(config.user_agent, "tester/1.0");
    }

    #[test]
    fn test_config_validate_empty_base_url() {
        let config = ClientConfig::new("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_zero_timeout() {
        let config =
            ClientConfig::new("https://api.example.com").with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
