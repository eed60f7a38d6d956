//! Active substance library client

use serde_json::{json, Map, Value};

use crate::http::request::PAGE_SIZE_UNLIMITED;
use crate::http::{Gateway, Params, RequestContext};
use crate::resources::{Page, ResourceCollection};
use crate::Result;

const RESOURCE: &str = "concepts/active-substances";

/// Library status of approved objects
pub const STATUS_FINAL: &str = "Final";

#[derive(Debug, Clone)]
pub struct ActiveSubstancesClient {
    collection: ResourceCollection,
}

impl ActiveSubstancesClient {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            collection: ResourceCollection::new(gateway, RESOURCE),
        }
    }

    pub fn collection(&self) -> &ResourceCollection {
        &self.collection
    }

    /// Listing with filters, sorting and paging passed through
    pub async fn get_filtered(&self, params: Params) -> Result<Page<Value>> {
        self.collection
            .gateway()
            .request(RequestContext::get(self.collection.url("")).with_params(params))
            .await?
            .json()
    }

    /// Every substance in `Final` status
    pub async fn get_final(&self) -> Result<Page<Value>> {
        let mut params = Map::new();
        params.insert("page_size".to_string(), Value::from(PAGE_SIZE_UNLIMITED));
        params.insert(
            "filters".to_string(),
            json!({"status": {"v": [STATUS_FINAL]}}),
        );
        self.get_filtered(params).await
    }
}
