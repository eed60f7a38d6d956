//! Per-call request configuration and the outbound transform
//!
//! A [`RequestContext`] describes one call the way resource clients build
//! it: a path relative to the API root, query parameters as a JSON object,
//! an optional JSON body. The gateway mutates it through the outbound
//! transform steps below and finally turns it into a [`PreparedRequest`]
//! that a [`crate::http::Transport`] can dispatch.

use std::collections::HashMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::{Error, Result};

/// Query parameters as sent by resource clients
pub type Params = Map<String, Value>;

/// Query parameter carrying the selected study value version
pub const STUDY_VALUE_VERSION: &str = "study_value_version";

/// Page-size value the UI uses for "all rows"
pub const PAGE_SIZE_ALL: i64 = -1;

/// Page-size value the backend uses for "no limit"
pub const PAGE_SIZE_UNLIMITED: i64 = 0;

/// How the response body should be consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// JSON document
    #[default]
    Json,
    /// Raw bytes (XML or PDF exports)
    Binary,
}

/// Ephemeral configuration of a single API call
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// HTTP method
    pub method: Method,
    /// Path relative to the API base URL (may carry its own query string)
    pub url: String,
    /// Query parameters
    pub params: Option<Params>,
    /// Extra request headers
    pub headers: HashMap<String, String>,
    /// JSON request body
    pub body: Option<Value>,
    /// Expected response body type
    pub response_type: ResponseType,
    /// Skip user notifications when the call fails
    pub ignore_errors: bool,
    /// Set once a bearer credential has been attached
    pub with_credentials: bool,
}

impl RequestContext {
    /// Create a request for the given method and path
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: None,
            headers: HashMap::new(),
            body: None,
            response_type: ResponseType::Json,
            ignore_errors: false,
            with_credentials: false,
        }
    }

    /// Shorthand for a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Shorthand for a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Replace the query parameters
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    /// Add or replace a single query parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set the JSON body
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a request header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the expected response type
    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Do not raise notifications if this call fails
    pub fn ignore_errors(mut self) -> Self {
        self.ignore_errors = true;
        self
    }

    /// Whether this call is a read
    pub fn is_read(&self) -> bool {
        self.method == Method::GET
    }

    /// Whether the path targets a study-scoped resource
    pub fn is_study_scoped(&self) -> bool {
        self.url.contains("studies/")
    }

    /// Inject the selected study value version into study-scoped reads
    ///
    /// The parameter map is created when absent, even if no version is
    /// selected. Any caller-supplied version is replaced, or dropped when
    /// none is selected.
    pub fn inject_study_version(&mut self, version: Option<&str>) {
        if !(self.is_read() && self.is_study_scoped()) {
            return;
        }

        let params = self.params.get_or_insert_with(Map::new);
        match version {
            Some(version) => {
                params.insert(STUDY_VALUE_VERSION.to_string(), Value::from(version));
            }
            None => {
                params.remove(STUDY_VALUE_VERSION);
            }
        }
    }

    /// Rewrite the "all rows" page size into the backend's "no limit"
    pub fn normalize_page_size(&mut self) {
        let Some(params) = self.params.as_mut() else {
            return;
        };

        if params.get("page_size").and_then(Value::as_i64) == Some(PAGE_SIZE_ALL) {
            params.insert("page_size".to_string(), Value::from(PAGE_SIZE_UNLIMITED));
        }
    }

    /// Attach a bearer credential
    pub fn apply_bearer(&mut self, token: &str) {
        self.headers
            .insert("Authorization".to_string(), format!("Bearer {}", token));
        self.with_credentials = true;
    }

    /// Encode a structured `filters` parameter of a read as a JSON string
    pub fn serialize_filters(&mut self) -> Result<()> {
        if !self.is_read() {
            return Ok(());
        }
        let Some(params) = self.params.as_mut() else {
            return Ok(());
        };

        let needs_encoding = match params.get("filters") {
            None | Some(Value::Null) | Some(Value::String(_)) | Some(Value::Bool(false)) => false,
            Some(_) => true,
        };

        if needs_encoding {
            if let Some(filters) = params.get("filters") {
                let encoded = serde_json::to_string(filters)?;
                params.insert("filters".to_string(), Value::String(encoded));
            }
        }
        Ok(())
    }

    /// Resolve against the base URL and encode into a dispatchable request
    pub fn prepare(&self, base_url: &Url) -> Result<PreparedRequest> {
        let mut url = base_url.join(&self.url).map_err(|e| Error::HttpRequest {
            message: format!("Failed to join path: {}", self.url),
            source: Some(Box::new(e)),
        })?;

        if let Some(params) = &self.params {
            let pairs = encode_params(params);
            if !pairs.is_empty() {
                let mut query = url.query_pairs_mut();
                for (key, value) in &pairs {
                    query.append_pair(key, value);
                }
            }
        }

        let body = match &self.body {
            Some(body) => Some(serde_json::to_string(body)?),
            None => None,
        };

        let mut headers = self.headers.clone();
        if body.is_some() {
            headers
                .entry("Content-Type".to_string())
                .or_insert_with(|| "application/json".to_string());
        }

        Ok(PreparedRequest {
            method: self.method.clone(),
            path: self.url.clone(),
            url,
            headers,
            body,
            response_type: self.response_type,
            with_credentials: self.with_credentials,
        })
    }
}

/// A fully resolved request ready for the transport
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: Method,
    /// Path as given by the caller, before base URL resolution
    pub path: String,
    /// Absolute URL including the encoded query
    pub url: Url,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Serialized JSON body
    pub body: Option<String>,
    /// Expected response body type
    pub response_type: ResponseType,
    /// Whether a bearer credential was attached
    pub with_credentials: bool,
}

impl PreparedRequest {
    /// All values of a query parameter, in order
    pub fn query_values(&self, key: &str) -> Vec<String> {
        self.url
            .query_pairs()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
            .collect()
    }

    /// First value of a query parameter
    pub fn query_value(&self, key: &str) -> Option<String> {
        self.query_values(key).into_iter().next()
    }

    /// Look up a header case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Flatten query parameters into key/value pairs
///
/// Arrays repeat their key, `null` is omitted and nested objects are sent
/// as JSON text.
pub fn encode_params(params: &Params) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(item) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    pairs.push((key.clone(), text));
                }
            }
        }
    }
    pairs
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
