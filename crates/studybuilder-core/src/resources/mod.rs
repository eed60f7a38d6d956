//! Resource clients
//!
//! Thin wrappers mapping backend resources to fixed URL templates. All of
//! them go through the [`Gateway`], so every call gets the same outbound
//! and inbound treatment.

pub mod active_substances;
pub mod activity_instance_classes;
pub mod activity_item_classes;
pub mod admin;
pub mod crfs;
pub mod ct_terms;
pub mod dictionaries;
pub mod numeric_values;
pub mod pharmaceutical_products;
pub mod study;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::http::{Gateway, Params, RequestContext};
use crate::Result;

pub use active_substances::ActiveSubstancesClient;
pub use activity_instance_classes::{ActivityInstanceClassesClient, InstanceAction};
pub use activity_item_classes::ActivityItemClassesClient;
pub use admin::AdminClient;
pub use crfs::{CrfsClient, ExportFormat, ExportRequest, OdmSource};
pub use ct_terms::CtTermsClient;
pub use dictionaries::DictionariesClient;
pub use numeric_values::NumericValuesClient;
pub use pharmaceutical_products::PharmaceuticalProductsClient;
pub use study::{StudyClient, StudyDataSupplier};

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Total number of rows, `0` unless `total_count` was requested
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub size: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 0,
            size: 0,
        }
    }
}

/// Standard operations of a versioned library collection
///
/// Lifecycle endpoints follow the backend convention:
/// `{uid}/approvals`, `{uid}/activations` and `{uid}/versions`.
#[derive(Debug, Clone)]
pub struct ResourceCollection {
    gateway: Gateway,
    resource: String,
}

impl ResourceCollection {
    pub fn new(gateway: Gateway, resource: impl Into<String>) -> Self {
        Self {
            gateway,
            resource: resource.into(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Path of a sub-resource
    pub fn url(&self, suffix: &str) -> String {
        if suffix.is_empty() {
            self.resource.clone()
        } else {
            format!("{}/{}", self.resource, suffix)
        }
    }

    /// Dispatch a request and decode the JSON body
    pub async fn send(&self, request: RequestContext) -> Result<Value> {
        self.gateway.request(request).await?.json()
    }

    pub async fn get_all(&self, params: Params) -> Result<Page<Value>> {
        let response = self
            .gateway
            .request(RequestContext::get(self.url("")).with_params(params))
            .await?;
        response.json()
    }

    pub async fn get_object(&self, uid: &str) -> Result<Value> {
        self.send(RequestContext::get(self.url(uid))).await
    }

    /// Distinct values of a column, for table filters
    pub async fn get_headers(&self, params: Params) -> Result<Value> {
        self.send(RequestContext::get(self.url("headers")).with_params(params))
            .await
    }

    pub async fn create(&self, data: Value) -> Result<Value> {
        self.send(RequestContext::post(self.url("")).with_body(data))
            .await
    }

    pub async fn update(&self, uid: &str, data: Value) -> Result<Value> {
        self.send(RequestContext::new(Method::PATCH, self.url(uid)).with_body(data))
            .await
    }

    pub async fn delete(&self, uid: &str) -> Result<Value> {
        self.send(RequestContext::new(Method::DELETE, self.url(uid)))
            .await
    }

    pub async fn approve(&self, uid: &str) -> Result<Value> {
        self.send(RequestContext::post(self.url(&format!("{}/approvals", uid))))
            .await
    }

    pub async fn inactivate(&self, uid: &str) -> Result<Value> {
        self.send(RequestContext::new(
            Method::DELETE,
            self.url(&format!("{}/activations", uid)),
        ))
        .await
    }

    pub async fn reactivate(&self, uid: &str) -> Result<Value> {
        self.send(RequestContext::post(self.url(&format!("{}/activations", uid))))
            .await
    }

    /// Start a new draft version
    pub async fn new_version(&self, uid: &str, params: Option<Params>) -> Result<Value> {
        let mut request = RequestContext::post(self.url(&format!("{}/versions", uid)));
        if let Some(params) = params {
            request = request.with_params(params);
        }
        self.send(request).await
    }

    pub async fn get_versions(&self, uid: &str) -> Result<Value> {
        self.send(RequestContext::get(self.url(&format!("{}/versions", uid))))
            .await
    }
}

/// Fetch every page of a listing
///
/// `params` (filters, sorting) are sent with every page. Stops at the first
/// short page or once `total` rows were collected. A `page_size` of zero
/// asks the backend for everything in one call.
pub async fn fetch_all_pages<T: DeserializeOwned>(
    gateway: &Gateway,
    path: &str,
    params: &Params,
    page_size: u64,
) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut page_number: u64 = 1;

    loop {
        let mut params = params.clone();
        params.insert("page_number".to_string(), Value::from(page_number));
        params.insert("page_size".to_string(), Value::from(page_size));
        params.insert("total_count".to_string(), Value::Bool(true));

        let page: Page<T> = gateway.get_with(path, params).await?.json()?;
        let fetched = page.items.len() as u64;
        items.extend(page.items);

        debug!(path, page_number, fetched, total = page.total, "Fetched page");

        if page_size == 0 || fetched < page_size || items.len() as u64 >= page.total {
            break;
        }
        page_number += 1;
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gateway, FakeTransport};
    use serde_json::{json, Map};

    #[test]
    fn test_page_defaults() {
        let page: Page<Value> = serde_json::from_value(json!({"items": [{"uid": "x"}]})).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 0);

        let empty: Page<Value> = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, Page::default());
    }

    #[tokio::test]
    async fn test_fetch_all_pages_follows_total() {
        let transport = FakeTransport::new();
        transport.respond(200, json!({"items": [{"uid": "a"}, {"uid": "b"}], "total": 3}));
        transport.respond(200, json!({"items": [{"uid": "c"}], "total": 3}));

        let mut params = Map::new();
        params.insert("filters".to_string(), json!({"status": {"v": ["Final"]}}));
        let items: Vec<Value> = fetch_all_pages(&gateway(transport.clone()), "concepts/odms/forms", &params, 2)
            .await
            .unwrap();

        assert_eq!(items.len(), 3);
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].query_value("page_number").as_deref(), Some("2"));
        assert_eq!(
            requests[1].query_value("filters").as_deref(),
            Some(r#"{"status":{"v":["Final"]}}"#)
        );
    }

    #[tokio::test]
    async fn test_fetch_all_pages_zero_size_is_one_call() {
        let transport = FakeTransport::new();
        transport.respond(200, json!({"items": [{"uid": "a"}], "total": 40}));

        let items: Vec<Value> = fetch_all_pages(&gateway(transport.clone()), "ct/terms", &Map::new(), 0)
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(transport.requests().len(), 1);
    }
}
