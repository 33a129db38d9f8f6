//! Host status client
//!
//! One outbound GET per call against a host's status endpoint, decoded into
//! a [`HostStatus`]. No retries, no timeout beyond the transport default.

use crate::error::StatusError;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

/// Status information for a single host, at the time of querying.
///
/// Unknown fields are ignored and missing ones default to zero or empty.
/// [`HostStatus::from_body`] matches keys case-insensitively (`Version`,
/// `version`, `APPLICATION`, ...); the last of several spellings wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HostStatus {
    pub application: String,
    #[serde(alias = "Version")]
    pub version: String,
    pub requests_count: u64,
    pub success_count: u64,
    pub error_count: u64,
}

impl HostStatus {
    /// Decodes a response body, tagging failures with the URL it came from.
    pub fn from_body(url: &str, body: &[u8]) -> Result<Self, StatusError> {
        let unmarshal = |source: serde_json::Error| StatusError::Unmarshal {
            url: url.to_string(),
            source,
        };

        let FoldedFields(fields) = serde_json::from_slice(body).map_err(unmarshal)?;
        serde_json::from_value(Value::Object(fields)).map_err(unmarshal)
    }
}

/// Top-level object with lowercased keys, later keys overwriting earlier
/// ones in document order.
struct FoldedFields(Map<String, Value>);

impl<'de> Deserialize<'de> for FoldedFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = FoldedFields;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FoldedFields, A::Error> {
                let mut fields = Map::new();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    fields.insert(key.to_lowercase(), value);
                }
                Ok(FoldedFields(fields))
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

/// Client for host status endpoints. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Clone, Debug, Default)]
pub struct HostClient {
    http: reqwest::Client,
}

impl HostClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Gets the [`HostStatus`] by making an outbound request to `url`.
    pub async fn fetch_status(&self, url: &str) -> Result<HostStatus, StatusError> {
        let request_error = |source: reqwest::Error| StatusError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.http.get(url).send().await.map_err(request_error)?;
        debug!(url, status = %response.status(), "status endpoint answered");

        let body = response.bytes().await.map_err(request_error)?;
        HostStatus::from_body(url, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://root.com/h1/status";

    #[test]
    fn test_decode_full_status() {
        let body = br#"{"application":"foo","Version":"1.1","requests_count":2,"success_count":1,"error_count":1}"#;
        let status = HostStatus::from_body(URL, body).unwrap();
        assert_eq!(
            status,
            HostStatus {
                application: "foo".to_string(),
                version: "1.1".to_string(),
                requests_count: 2,
                success_count: 1,
                error_count: 1,
            }
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let status = HostStatus::from_body(URL, br#"{"requests_count": 12345}"#).unwrap();
        assert_eq!(status.requests_count, 12345);
        assert_eq!(status.success_count, 0);
        assert_eq!(status.error_count, 0);
        assert!(status.application.is_empty());
        assert!(status.version.is_empty());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let body = br#"{"application":"app2","uptime":99,"tags":["a","b"]}"#;
        let status = HostStatus::from_body(URL, body).unwrap();
        assert_eq!(status.application, "app2");
    }

    #[test]
    fn test_lowercase_version_accepted() {
        let status = HostStatus::from_body(URL, br#"{"version":"v5"}"#).unwrap();
        assert_eq!(status.version, "v5");
    }

    #[test]
    fn test_keys_match_case_insensitively() {
        let body = br#"{"Application":"foo","VERSION":"1.1","Requests_Count":3,"success_COUNT":2}"#;
        let status = HostStatus::from_body(URL, body).unwrap();
        assert_eq!(status.application, "foo");
        assert_eq!(status.version, "1.1");
        assert_eq!(status.requests_count, 3);
        assert_eq!(status.success_count, 2);
    }

    #[test]
    fn test_last_spelling_of_a_key_wins() {
        let status = HostStatus::from_body(URL, br#"{"Version":"1.0","version":"2.0"}"#).unwrap();
        assert_eq!(status.version, "2.0");

        let status = HostStatus::from_body(URL, br#"{"version":"2.0","Version":"1.0"}"#).unwrap();
        assert_eq!(status.version, "1.0");
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        let err = HostStatus::from_body(URL, b"[1, 2]").unwrap_err();
        assert_eq!(err.kind(), "unmarshal");
    }

    #[test]
    fn test_invalid_json_returns_unmarshal_error() {
        let err = HostStatus::from_body(URL, br#"{"invalid}}"#).unwrap_err();
        assert_eq!(err.kind(), "unmarshal");
        assert!(err.to_string().contains(URL));
    }

    #[test]
    fn test_negative_counter_is_rejected() {
        let err = HostStatus::from_body(URL, br#"{"error_count": -1}"#).unwrap_err();
        assert!(matches!(err, StatusError::Unmarshal { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_returns_request_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{port}/h1/status");

        let err = HostClient::new().fetch_status(&url).await.unwrap_err();
        assert_eq!(err.kind(), "request");
        assert!(err.to_string().contains(&url));
    }
}
