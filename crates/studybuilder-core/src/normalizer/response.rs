//! Decoding of backend error bodies
//!
//! The backend answers failures with
//! `{"type": ..., "message": ..., "details": [{"error_code", "field", "msg", "ctx"}]}`.
//! Bodies are decoded leniently: anything that does not fit becomes
//! [`ErrorResponse::Empty`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

/// One segment of a field location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSegment {
    /// Array index
    Index(i64),
    /// Object key
    Key(String),
}

impl fmt::Display for FieldSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSegment::Index(i) => write!(f, "{}", i),
            FieldSegment::Key(k) => write!(f, "{}", k),
        }
    }
}

/// A field-level validation failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationDetail {
    /// Machine-readable failure code (`missing`, `string_too_short`, ...)
    #[serde(default)]
    pub error_code: Option<String>,
    /// Location of the offending field
    #[serde(default)]
    pub field: Vec<FieldSegment>,
    /// Raw message from the backend
    #[serde(default)]
    pub msg: Option<String>,
    /// Extra values for message rendering
    #[serde(default, deserialize_with = "object_or_empty")]
    pub ctx: Map<String, Value>,
}

impl ValidationDetail {
    /// `ctx.reason` when the backend supplied one
    pub fn reason(&self) -> Option<&str> {
        self.ctx
            .get("reason")
            .and_then(Value::as_str)
            .filter(|r| !r.is_empty())
    }
}

fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}

/// Shape of a backend error body
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorResponse {
    /// Field-level validation failures
    Validation {
        message: Option<String>,
        details: Vec<ValidationDetail>,
    },
    /// A single server-reported failure
    Message {
        message: String,
        error_type: Option<String>,
    },
    /// Nothing usable
    Empty,
}

impl ErrorResponse {
    /// Decode an error body
    pub fn decode(body: Option<&Value>) -> Self {
        let Some(Value::Object(obj)) = body else {
            return ErrorResponse::Empty;
        };

        let message = obj
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        if let Some(Value::Array(entries)) = obj.get("details") {
            let details: Vec<ValidationDetail> = entries
                .iter()
                .filter_map(|entry| match ValidationDetail::deserialize(entry) {
                    Ok(detail) => Some(detail),
                    Err(e) => {
                        warn!(error = %e, "Skipping malformed validation detail");
                        None
                    }
                })
                .collect();

            if !details.is_empty() {
                return ErrorResponse::Validation { message, details };
            }
        }

        match message {
            Some(message) => ErrorResponse::Message {
                message,
                error_type: obj.get("type").and_then(Value::as_str).map(str::to_string),
            },
            None => ErrorResponse::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_validation() {
        let body = json!({
            "type": "RequestValidationError",
            "message": "The request failed due to validation errors",
            "details": [
                {"error_code": "missing", "field": ["body", 0, "name"], "msg": "Field required", "ctx": {}},
                {"error_code": "string_too_short", "field": ["body", "oid"], "msg": "too short", "ctx": {"min_length": 1}}
            ]
        });

        match ErrorResponse::decode(Some(&body)) {
            ErrorResponse::Validation { message, details } => {
                assert_eq!(message.as_deref(), Some("The request failed due to validation errors"));
                assert_eq!(details.len(), 2);
                assert_eq!(
                    details[0].field,
                    vec![
                        FieldSegment::Key("body".into()),
                        FieldSegment::Index(0),
                        FieldSegment::Key("name".into())
                    ]
                );
                assert_eq!(details[1].ctx["min_length"], json!(1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_message() {
        let body = json!({"type": "NotFoundException", "message": "Form not found", "details": []});
        assert_eq!(
            ErrorResponse::decode(Some(&body)),
            ErrorResponse::Message {
                message: "Form not found".into(),
                error_type: Some("NotFoundException".into())
            }
        );
    }

    #[test]
    fn test_decode_shape_mismatch() {
        assert_eq!(ErrorResponse::decode(None), ErrorResponse::Empty);
        assert_eq!(ErrorResponse::decode(Some(&json!("Bad Gateway"))), ErrorResponse::Empty);
        assert_eq!(ErrorResponse::decode(Some(&json!({"detail": "x"}))), ErrorResponse::Empty);
    }

    #[test]
    fn test_malformed_details_fall_through_to_message() {
        let body = json!({"message": "broken", "details": [{"field": {"not": "a list"}}]});
        assert!(matches!(
            ErrorResponse::decode(Some(&body)),
            ErrorResponse::Message { .. }
        ));
    }

    #[test]
    fn test_non_object_ctx_becomes_empty() {
        let detail: ValidationDetail =
            serde_json::from_value(json!({"field": ["x"], "msg": "bad", "ctx": "oops"})).unwrap();
        assert!(detail.ctx.is_empty());
        assert_eq!(detail.reason(), None);
    }
}
