//! Transport seam between the gateway and the network
//!
//! The gateway never talks to `reqwest` directly; it hands a
//! [`PreparedRequest`] to a [`Transport`]. A transport error means no
//! response was received at all. Any HTTP status, including 4xx and 5xx,
//! comes back as a [`RawResponse`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Client as ReqwestClient;
use tracing::debug;

use crate::http::client::GatewayConfig;
use crate::http::request::PreparedRequest;
use crate::{Error, Result};

/// Response as received from the network
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers with lower-cased names
    pub headers: HashMap<String, String>,
    /// Response body
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Create a response with a JSON body
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            headers: HashMap::from([("content-type".to_string(), "application/json".to_string())]),
            body: body.to_string().into_bytes(),
        }
    }

    /// Add a header
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Broad cause of a transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection could not be established
    Connect,
    /// The request timed out
    Timeout,
    /// Anything else (body errors, redirects, TLS)
    Other,
}

/// Failure where no HTTP response was received
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, error.to_string())
    }
}

/// Dispatches prepared requests
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &PreparedRequest) -> std::result::Result<RawResponse, TransportError>;
}

/// Transport backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Build the underlying client from gateway configuration
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let mut builder = ReqwestClient::builder()
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(!config.validate_tls);

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().map_err(|e| Error::HttpRequest {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
        })?;

        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: ReqwestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &PreparedRequest) -> std::result::Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        for (key, value) in &request.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                builder = builder.header(name, value);
            }
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        debug!(method = %request.method, url = %request.url, "Dispatching request");
        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_response_helpers() {
        let response = RawResponse::json(422, &json!({"message": "invalid"}))
            .with_header("TraceResponse", "00-abc-01");

        assert!(!response.is_success());
        assert_eq!(response.headers["traceresponse"], "00-abc-01");
        assert_eq!(response.headers["content-type"], "application/json");
    }

    #[test]
    fn test_reqwest_transport_builds() {
        let config = GatewayConfig::default();
        assert!(ReqwestTransport::new(&config).is_ok());
    }
}
