//! Gateway through which every backend call passes
//!
//! Applies the outbound transform (study version, page size, bearer token,
//! filters, URL resolution), dispatches through a [`Transport`] and runs the
//! inbound transform that turns failures into user notifications before
//! handing them back to the caller.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::context::AppContext;
use crate::http::auth::AuthProvider;
use crate::http::error::HttpError;
use crate::http::request::{Params, PreparedRequest, RequestContext};
use crate::http::transport::{RawResponse, ReqwestTransport, Transport};
use crate::i18n::Localizer;
use crate::normalizer::ErrorNormalizer;
use crate::notifications::{NewNotification, NotificationQueue};
use crate::{Error, Result};

/// Configuration for the underlying HTTP client
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Request timeout in seconds, `None` keeps the client default
    pub timeout_secs: Option<u64>,
    /// Whether to validate TLS certificates
    pub validate_tls: bool,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            validate_tls: true,
            user_agent: format!("studybuilder/{}", crate::VERSION),
        }
    }
}

/// Successful backend response
#[derive(Debug, Clone, Default)]
pub struct ApiResponse {
    pub status: u16,
    /// Headers with lower-cased names
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Deserialize the body; an empty body reads as `null`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Look up a header case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

impl From<RawResponse> for ApiResponse {
    fn from(raw: RawResponse) -> Self {
        Self {
            status: raw.status,
            headers: raw.headers,
            body: raw.body,
        }
    }
}

/// Shared gateway to the StudyBuilder API
///
/// Cloning is cheap; clones share context, transport and notifications.
#[derive(Clone)]
pub struct Gateway {
    context: Arc<AppContext>,
    transport: Arc<dyn Transport>,
    auth: Arc<dyn AuthProvider>,
    normalizer: ErrorNormalizer,
    notifications: NotificationQueue,
}

impl Gateway {
    /// Create a gateway dispatching through `reqwest`
    pub fn new(
        context: Arc<AppContext>,
        auth: Arc<dyn AuthProvider>,
        localizer: Arc<dyn Localizer>,
        notifications: NotificationQueue,
        config: &GatewayConfig,
    ) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(config)?);
        Ok(Self::with_transport(
            context,
            transport,
            auth,
            localizer,
            notifications,
        ))
    }

    /// Create a gateway over an arbitrary transport
    pub fn with_transport(
        context: Arc<AppContext>,
        transport: Arc<dyn Transport>,
        auth: Arc<dyn AuthProvider>,
        localizer: Arc<dyn Localizer>,
        notifications: NotificationQueue,
    ) -> Self {
        Self {
            context,
            transport,
            auth,
            normalizer: ErrorNormalizer::new(localizer),
            notifications,
        }
    }

    /// Execute a call
    ///
    /// Failures are always returned as [`Error::Http`], after any
    /// notification side effect. Outbound transform failures are returned
    /// without notifying.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.url))]
    pub async fn request(&self, mut request: RequestContext) -> Result<ApiResponse> {
        let prepared = self.outbound(&mut request).await?;

        let error = match self.transport.send(&prepared).await {
            Ok(response) if response.is_success() => {
                debug!(status = response.status, "Request succeeded");
                return Ok(response.into());
            }
            Ok(response) => HttpError::from_response(&prepared, &response),
            Err(e) => HttpError::from_transport(&prepared, &e),
        };

        warn!(error = %error, "Request failed");
        self.report(&request, &error);
        Err(Error::Http(error))
    }

    async fn outbound(&self, request: &mut RequestContext) -> Result<PreparedRequest> {
        let version = self.context.study_version();
        request.inject_study_version(version.as_deref());
        request.normalize_page_size();

        match self.auth.access_token().await? {
            Some(token) => request.apply_bearer(&token),
            None => self.auth.clear(),
        }

        request.serialize_filters()?;
        request.prepare(self.context.base_url())
    }

    fn report(&self, request: &RequestContext, error: &HttpError) {
        if request.ignore_errors {
            debug!("Errors ignored for this request");
            return;
        }

        if !error.has_response() {
            self.notifications
                .add(NewNotification::error(error.message.clone()));
            return;
        }

        if error.is_unauthorized() {
            debug!("Unauthorized response left to the authentication flow");
            return;
        }

        for notification in self.normalizer.notifications(error) {
            self.notifications.add(notification);
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.request(RequestContext::get(path)).await
    }

    pub async fn get_with(&self, path: &str, params: Params) -> Result<ApiResponse> {
        self.request(RequestContext::get(path).with_params(params))
            .await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<ApiResponse> {
        self.request(RequestContext::post(path).with_body(body))
            .await
    }

    /// POST with query parameters
    pub async fn post_with(&self, path: &str, body: Value, params: Params) -> Result<ApiResponse> {
        self.request(
            RequestContext::post(path)
                .with_body(body)
                .with_params(params),
        )
        .await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<ApiResponse> {
        self.request(RequestContext::new(Method::PATCH, path).with_body(body))
            .await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<ApiResponse> {
        self.request(RequestContext::new(Method::PUT, path).with_body(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.request(RequestContext::new(Method::DELETE, path))
            .await
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.context
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn normalizer(&self) -> &ErrorNormalizer {
        &self.normalizer
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.context.base_url().as_str())
            .field("notifications", &self.notifications.len())
            .finish()
    }
}
