//! HTTP client implementation.
//!
//! Provides the client for the marketplace Integration API: event feed
//! queries plus listing reads and conditional updates.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use super::config::ClientConfig;
use super::error::ClientError;
use super::types::Listing;
use crate::events::{Event, EventFilter, EventPage, PageMeta};

/// API error response format.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

/// API error details.
#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    message: String,
}

/// Events query response envelope.
#[derive(Debug, Deserialize)]
struct EventsResponse {
    data: Vec<Event>,
    meta: PageMeta,
}

/// Listings query response envelope.
#[derive(Debug, Deserialize)]
struct ListingsResponse {
    data: Vec<Listing>,
}

/// Single listing response envelope.
#[derive(Debug, Deserialize)]
struct ListingResponse {
    data: Listing,
}

/// Conditional listing update request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateListingRequest<'a> {
    public_data: &'a Map<String, Value>,
    expected_version: u64,
}

/// HTTP client for the marketplace Integration API.
#[derive(Debug, Clone)]
pub struct MarketplaceClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl MarketplaceClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref client_id) = config.client_id {
            if let Ok(value) = HeaderValue::from_str(client_id) {
                headers.insert("X-Client-Id", value);
            }
        }
        if let Some(ref client_secret) = config.client_secret {
            if let Ok(mut value) = HeaderValue::from_str(client_secret) {
                value.set_sensitive(true);
                headers.insert("X-Client-Secret", value);
            }
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(&config.user_agent)
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self { config, http })
    }

    /// Creates a new client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, ClientError> {
        Self::new(ClientConfig::default())
    }

    /// Creates a new client with the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::new(ClientConfig::new(base_url))
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Queries one page of events matching the filter.
    ///
    /// Events are returned in ascending sequence-ID order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after retries.
    pub async fn query_events(&self, filter: &EventFilter) -> Result<EventPage, ClientError> {
        let params = filter.to_query_params();
        let url = format!("{}/events", self.config.base_url);

        let response: EventsResponse = self
            .get_with_retry(|| self.http.get(&url).query(&params))
            .await?;

        Ok(EventPage {
            events: response.data,
            meta: response.meta,
        })
    }

    /// Gets a single listing by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the listing is not found.
    pub async fn get_listing(&self, id: &str) -> Result<Listing, ClientError> {
        let url = format!("{}/listings/{}", self.config.base_url, id);

        let response: ListingResponse = self.get_with_retry(|| self.http.get(&url)).await?;
        Ok(response.data)
    }

    /// Queries listings by IDs.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after retries.
    pub async fn get_listings(&self, ids: &[&str]) -> Result<Vec<Listing>, ClientError> {
        let url = format!("{}/listings", self.config.base_url);
        let params = [("ids".to_string(), ids.join(","))];

        let response: ListingsResponse = self
            .get_with_retry(|| self.http.get(&url).query(&params))
            .await?;
        Ok(response.data)
    }

    /// Conditionally updates a listing's public data.
    ///
    /// The update is applied only if the listing is still at
    /// `expected_version`; otherwise the API answers 409 and this returns
    /// [`ClientError::Conflict`]. The request is sent exactly once — the
    /// caller decides whether to re-read and retry.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the listing is missing, or
    /// the version check fails.
    pub async fn update_listing(
        &self,
        id: &str,
        public_data: &Map<String, Value>,
        expected_version: u64,
    ) -> Result<Listing, ClientError> {
        let url = format!("{}/listings/{}", self.config.base_url, id);
        let body = UpdateListingRequest {
            public_data,
            expected_version,
        };

        let resp = self
            .http
            .patch(&url)
            .query(&[("expand", "true")])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::CONFLICT {
            return Err(ClientError::Conflict { expected_version });
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(format!("listing {}", id)));
        }
        if !status.is_success() {
            return Err(Self::error_from_response(status, resp).await);
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ClientError::Deserialization(e.to_string()))?;
        let response: ListingResponse = serde_json::from_str(&body)
            .map_err(|e| ClientError::Deserialization(e.to_string()))?;
        Ok(response.data)
    }

    /// Makes a GET request with bounded retry.
    ///
    /// Timeouts back off exponentially; 429 honors the `Retry-After`
    /// header. All other failures are returned immediately.
    async fn get_with_retry<T, F>(&self, request_fn: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0;

        loop {
            match request_fn().send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_success() {
                        let body = resp
                            .text()
                            .await
                            .map_err(|e| ClientError::Deserialization(e.to_string()))?;
                        return serde_json::from_str(&body)
                            .map_err(|e| ClientError::Deserialization(e.to_string()));
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("Retry-After")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse().ok());

                        if attempt < self.config.max_retries {
                            tokio::time::sleep(self.rate_limit_backoff(retry_after)).await;
                            attempt += 1;
                            continue;
                        }

                        return Err(ClientError::RateLimited { retry_after });
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(ClientError::NotFound("resource".to_string()));
                    }
                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(ClientError::Unauthorized);
                    }

                    return Err(Self::error_from_response(status, resp).await);
                }
                Err(e) => {
                    if e.is_timeout() && attempt < self.config.max_retries {
                        attempt += 1;
                        tokio::time::sleep(Duration::from_millis(100 * (1 << attempt))).await;
                        continue;
                    }
                    return Err(ClientError::from(e));
                }
            }
        }
    }

    /// Returns the wait before retrying a rate-limited request.
    ///
    /// Honors the server's `Retry-After` header but never sleeps longer
    /// than the request timeout, so a hostile or misconfigured header
    /// cannot stall the poll loop past its cancellation bound.
    fn rate_limit_backoff(&self, retry_after: Option<u64>) -> Duration {
        Duration::from_secs(retry_after.unwrap_or(1)).min(self.config.timeout)
    }

    /// Maps a non-success response into an API error.
    async fn error_from_response(
        status: reqwest::StatusCode,
        resp: reqwest::Response,
    ) -> ClientError {
        let body = resp.text().await.unwrap_or_default();
        if let Ok(error_resp) = serde_json::from_str::<ApiErrorResponse>(&body) {
            return ClientError::Api {
                code: error_resp.error.code,
                message: error_resp.error.message,
            };
        }

        ClientError::Api {
            code: status.as_str().to_string(),
            message: body,
        }
    }
}
