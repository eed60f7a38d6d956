//! HTTP error classification
//!
//! Turns a non-2xx [`RawResponse`] or a [`TransportError`] into an
//! [`HttpError`] that keeps everything the error normalizer needs: status,
//! parsed body, correlation id and an echo of the originating request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::http::request::PreparedRequest;
use crate::http::transport::{RawResponse, TransportError};

/// Response header carrying the backend's trace/correlation id
pub const CORRELATION_HEADER: &str = "traceresponse";

/// Classification of HTTP failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClassification {
    /// No response was received
    NetworkError,
    /// 401, handled by the authentication flow
    AuthenticationError,
    /// 422 request validation failure
    ValidationError,
    /// Other 4xx
    ClientError,
    /// 5xx
    ServerError,
    /// Anything else
    Unknown,
}

impl ErrorClassification {
    /// Classify an HTTP status code
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorClassification::AuthenticationError,
            422 => ErrorClassification::ValidationError,
            400..=499 => ErrorClassification::ClientError,
            500..=599 => ErrorClassification::ServerError,
            _ => ErrorClassification::Unknown,
        }
    }
}

/// The request that produced an error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEcho {
    /// HTTP method
    pub method: String,
    /// Path as given by the caller
    pub path: String,
    /// Serialized request body
    pub payload: Option<String>,
}

impl From<&PreparedRequest> for RequestEcho {
    fn from(request: &PreparedRequest) -> Self {
        Self {
            method: request.method.to_string(),
            path: request.path.clone(),
            payload: request.body.clone(),
        }
    }
}

/// Normalized HTTP error representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpError {
    /// HTTP status code, `None` when no response was received
    pub status_code: Option<u16>,
    /// Error classification
    pub classification: ErrorClassification,
    /// Human-readable error message
    pub message: String,
    /// Response body, parsed as JSON when possible
    pub body: Option<Value>,
    /// Correlation id reported by the backend
    pub correlation_id: Option<String>,
    /// Originating request
    pub request: RequestEcho,
}

impl HttpError {
    /// Create from a received non-2xx response
    pub fn from_response(request: &PreparedRequest, response: &RawResponse) -> Self {
        let body = if response.body.is_empty() {
            None
        } else {
            match serde_json::from_slice::<Value>(&response.body) {
                Ok(json) => Some(json),
                Err(_) => Some(Value::String(
                    String::from_utf8_lossy(&response.body).into_owned(),
                )),
            }
        };

        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status code {}", response.status));

        Self {
            status_code: Some(response.status),
            classification: ErrorClassification::from_status(response.status),
            message,
            body,
            correlation_id: response.headers.get(CORRELATION_HEADER).cloned(),
            request: RequestEcho::from(request),
        }
    }

    /// Create from a transport failure
    pub fn from_transport(request: &PreparedRequest, error: &TransportError) -> Self {
        Self {
            request: RequestEcho::from(request),
            ..Self::network(error.message.clone(), &request.path, request.method.as_str())
        }
    }

    /// A network-level failure with no response
    pub fn network(message: impl Into<String>, path: &str, method: &str) -> Self {
        Self {
            status_code: None,
            classification: ErrorClassification::NetworkError,
            message: message.into(),
            body: None,
            correlation_id: None,
            request: RequestEcho {
                method: method.to_string(),
                path: path.to_string(),
                payload: None,
            },
        }
    }

    /// Whether a response was received at all
    pub fn has_response(&self) -> bool {
        self.status_code.is_some()
    }

    /// Whether the backend rejected the credentials
    pub fn is_unauthorized(&self) -> bool {
        self.status_code == Some(401)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.status_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            self.request.method,
            self.request.path,
            self.message
        )
    }
}

impl std::error::Error for HttpError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::RequestContext;
    use crate::http::transport::TransportErrorKind;
    use serde_json::json;
    use url::Url;

    fn prepared() -> PreparedRequest {
        RequestContext::post("concepts/odms/forms")
            .with_body(json!({"name": ""}))
            .prepare(&Url::parse("http://localhost/api/").unwrap())
            .unwrap()
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(ErrorClassification::from_status(401), ErrorClassification::AuthenticationError);
        assert_eq!(ErrorClassification::from_status(422), ErrorClassification::ValidationError);
        assert_eq!(ErrorClassification::from_status(404), ErrorClassification::ClientError);
        assert_eq!(ErrorClassification::from_status(503), ErrorClassification::ServerError);
        assert_eq!(ErrorClassification::from_status(302), ErrorClassification::Unknown);
    }

    #[test]
    fn test_from_response_extracts_message_and_correlation() {
        let response = RawResponse::json(409, &json!({"type": "AlreadyExistsException", "message": "Form exists"}))
            .with_header("traceresponse", "00-trace-01");

        let error = HttpError::from_response(&prepared(), &response);
        assert_eq!(error.status_code, Some(409));
        assert_eq!(error.message, "Form exists");
        assert_eq!(error.correlation_id.as_deref(), Some("00-trace-01"));
        assert_eq!(error.request.method, "POST");
        assert_eq!(error.request.path, "concepts/odms/forms");
        assert_eq!(error.request.payload.as_deref(), Some(r#"{"name":""}"#));
    }

    #[test]
    fn test_non_json_body_kept_as_text() {
        let response = RawResponse {
            status: 502,
            headers: Default::default(),
            body: b"Bad Gateway".to_vec(),
        };

        let error = HttpError::from_response(&prepared(), &response);
        assert_eq!(error.body, Some(json!("Bad Gateway")));
        assert_eq!(error.message, "Request failed with status code 502");
    }

    #[test]
    fn test_from_transport() {
        let failure = TransportError::new(TransportErrorKind::Connect, "Network Error");
        let error = HttpError::from_transport(&prepared(), &failure);
        assert!(!error.has_response());
        assert_eq!(error.message, "Network Error");
        assert_eq!(error.classification, ErrorClassification::NetworkError);
        assert!(error.request.payload.is_some());
    }
}
