//! Dictionary term client (UNII substances and friends)

use serde_json::Value;

use crate::http::{Gateway, Params, RequestContext};
use crate::resources::{Page, ResourceCollection};
use crate::Result;

const RESOURCE: &str = "dictionaries";

#[derive(Debug, Clone)]
pub struct DictionariesClient {
    substances: ResourceCollection,
}

impl DictionariesClient {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            substances: ResourceCollection::new(gateway, format!("{}/substances", RESOURCE)),
        }
    }

    /// Substance dictionary terms with the standard library operations
    pub fn substances(&self) -> &ResourceCollection {
        &self.substances
    }

    /// All substances in one page
    pub async fn get_substances(&self, params: Option<Params>) -> Result<Page<Value>> {
        let mut request = RequestContext::get(self.substances.url(""));
        if let Some(params) = params {
            request = request.with_params(params);
        }
        self.substances.gateway().request(request).await?.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gateway, relative_path, FakeTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_get_substances() {
        let transport = FakeTransport::new();
        transport.respond(200, json!({"items": [{"term_uid": "DictionaryTerm_000001"}], "total": 1}));
        let client = DictionariesClient::new(gateway(transport.clone()));

        let page = client.get_substances(None).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(relative_path(&transport.last()), "dictionaries/substances");
    }

    #[tokio::test]
    async fn test_substance_headers() {
        let transport = FakeTransport::new();
        let client = DictionariesClient::new(gateway(transport.clone()));

        let mut params = serde_json::Map::new();
        params.insert("field_name".into(), json!("name"));
        client.substances().get_headers(params).await.unwrap();

        let request = transport.last();
        assert_eq!(relative_path(&request), "dictionaries/substances/headers");
        assert_eq!(request.query_value("field_name").as_deref(), Some("name"));
    }
}
