//! Structured details attached to error notifications

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::http::HttpError;

/// What is known about a failed request
///
/// Fields that cannot be extracted are left empty instead of failing the
/// notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub path: Option<String>,
    pub method: Option<String>,
    pub status: Option<u16>,
    pub correlation_id: Option<String>,
    pub request_payload: Option<Value>,
    pub response_payload: Option<Value>,
}

impl ErrorDetail {
    /// Build the detail for an HTTP failure
    pub fn extract(error: &HttpError) -> Self {
        Self {
            path: Some(error.request.path.clone()).filter(|p| !p.is_empty()),
            method: Some(error.request.method.to_lowercase()).filter(|m| !m.is_empty()),
            status: error.status_code,
            correlation_id: error.correlation_id.clone(),
            request_payload: error.request.payload.as_deref().map(parse_payload),
            response_payload: error.body.clone(),
        }
    }
}

/// Parse an echoed request body, keeping the raw text when it is not JSON
fn parse_payload(raw: &str) -> Value {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Request payload is not JSON, keeping raw text");
            Value::String(raw.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{ErrorClassification, RequestEcho};
    use serde_json::json;

    fn error_with_payload(payload: Option<&str>) -> HttpError {
        HttpError {
            status_code: Some(422),
            classification: ErrorClassification::ValidationError,
            message: "invalid".into(),
            body: Some(json!({"message": "invalid"})),
            correlation_id: Some("00-abc-01".into()),
            request: RequestEcho {
                method: "PATCH".into(),
                path: "concepts/odms/items/OdmItem_1".into(),
                payload: payload.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_extract_full_detail() {
        let detail = ErrorDetail::extract(&error_with_payload(Some(r#"{"name":"x"}"#)));
        assert_eq!(detail.path.as_deref(), Some("concepts/odms/items/OdmItem_1"));
        assert_eq!(detail.method.as_deref(), Some("patch"));
        assert_eq!(detail.status, Some(422));
        assert_eq!(detail.correlation_id.as_deref(), Some("00-abc-01"));
        assert_eq!(detail.request_payload, Some(json!({"name": "x"})));
        assert_eq!(detail.response_payload, Some(json!({"message": "invalid"})));
    }

    #[test]
    fn test_malformed_request_payload_kept_raw() {
        let detail = ErrorDetail::extract(&error_with_payload(Some("{broken")));
        assert_eq!(detail.request_payload, Some(json!("{broken")));
    }

    #[test]
    fn test_missing_request_payload() {
        let detail = ErrorDetail::extract(&error_with_payload(None));
        assert_eq!(detail.request_payload, None);
    }
}
