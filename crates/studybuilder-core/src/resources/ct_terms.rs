//! Controlled terminology term client

use serde_json::{Map, Value};

use crate::http::request::PAGE_SIZE_UNLIMITED;
use crate::http::{Gateway, Params, RequestContext};
use crate::resources::{Page, ResourceCollection};
use crate::Result;

const RESOURCE: &str = "ct/terms";

/// Sponsor codelist holding adverse event terms
pub const ADVERSE_EVENTS_CODELIST: &str = "Adverse Events";

#[derive(Debug, Clone)]
pub struct CtTermsClient {
    collection: ResourceCollection,
}

impl CtTermsClient {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            collection: ResourceCollection::new(gateway, RESOURCE),
        }
    }

    pub fn collection(&self) -> &ResourceCollection {
        &self.collection
    }

    /// Terms of a codelist; `all` lifts the page limit
    pub async fn get_terms_by_codelist(&self, codelist_name: &str, all: bool) -> Result<Page<Value>> {
        let mut params: Params = Map::new();
        params.insert("codelist_name".to_string(), Value::from(codelist_name));
        if all {
            params.insert("page_size".to_string(), Value::from(PAGE_SIZE_UNLIMITED));
        }

        self.collection
            .gateway()
            .request(RequestContext::get(self.collection.url("")).with_params(params))
            .await?
            .json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gateway, relative_path, FakeTransport};

    #[tokio::test]
    async fn test_terms_by_codelist() {
        let transport = FakeTransport::new();
        let client = CtTermsClient::new(gateway(transport.clone()));

        client
            .get_terms_by_codelist(ADVERSE_EVENTS_CODELIST, true)
            .await
            .unwrap();
        let request = transport.last();
        assert_eq!(relative_path(&request), "ct/terms");
        assert_eq!(request.query_value("codelist_name").as_deref(), Some("Adverse Events"));
        assert_eq!(request.query_value("page_size").as_deref(), Some("0"));

        client.get_terms_by_codelist("Unit", false).await.unwrap();
        assert!(transport.last().query_value("page_size").is_none());
    }
}
