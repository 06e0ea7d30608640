//! Entity types returned by the Integration API.
//!
//! Only the listing entity is modeled; the poller reads and conditionally
//! updates listings when aggregating like counters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A marketplace listing as returned by the Integration API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Listing UUID.
    pub id: String,

    /// Entity version, incremented by the API on every write. Conditional
    /// updates send this back as the expected version.
    pub version: u64,

    /// Listing attributes.
    pub attributes: ListingAttributes,
}

/// Attributes of a listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingAttributes {
    /// Listing title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Listing state (e.g., `"published"`, `"pendingApproval"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Free-form public data attached to the listing.
    #[serde(default)]
    pub public_data: Map<String, Value>,
}

impl Listing {
    /// Reads a numeric counter from the listing's public data.
    ///
    /// An absent or non-numeric value counts as 0.
    #[must_use]
    pub fn public_data_counter(&self, key: &str) -> i64 {
        self.attributes
            .public_data
            .get(key)
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing_with_public_data(public_data: Value) -> Listing {
        let public_data = match public_data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Listing {
            id: "listing-9".to_string(),
            version: 3,
            attributes: ListingAttributes {
                title: Some("Canoe".to_string()),
                state: Some("published".to_string()),
                public_data,
            },
        }
    }

    #[test]
    fn test_listing_deserialization() {
        let json = r#"{
            "id": "listing-9",
            "version": 3,
            "attributes": {
                "title": "Canoe",
                "state": "published",
                "publicData": {"likes": 12}
            }
        }"#;

        let listing: Listing = serde_json::from_str(json).expect("listing json");
        assert_eq!(listing.id, "listing-9");
        assert_eq!(listing.version, 3);
        assert_eq!(listing.public_data_counter("likes"), 12);
    }

    #[test]
    fn test_counter_absent_defaults_to_zero() {
        let listing = listing_with_public_data(json!({}));
        assert_eq!(listing.public_data_counter("likes"), 0);
    }

    #[test]
    fn test_counter_non_numeric_defaults_to_zero() {
        let listing = listing_with_public_data(json!({"likes": "twelve"}));
        assert_eq!(listing.public_data_counter("likes"), 0);
    }
}
