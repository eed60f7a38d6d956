//! Activity item class library client

use serde_json::Value;

use crate::http::{Gateway, Params, RequestContext};
use crate::resources::ResourceCollection;
use crate::Result;

const RESOURCE: &str = "activity-item-classes";

/// Codelist used for SDTM domain abbreviations
pub const SDTM_DOMAIN_ABBREVIATION_CODELIST_UID: &str = "C66734";

/// Category item class of an activity instance class
pub fn category_item_class(instance_class: &str) -> Option<&'static str> {
    match instance_class {
        "CategoricFindings" | "NumericFindings" | "TextualFindings" => Some("finding_category"),
        "Events" => Some("event_category"),
        "Interventions" => Some("intervention_category"),
        _ => None,
    }
}

/// Subcategory item class of an activity instance class
pub fn subcategory_item_class(instance_class: &str) -> Option<&'static str> {
    match instance_class {
        "CategoricFindings" | "NumericFindings" | "TextualFindings" => Some("finding_subcategory"),
        "Events" => Some("event_subcategory"),
        "Interventions" => Some("intervention_subcategory"),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct ActivityItemClassesClient {
    collection: ResourceCollection,
}

impl ActivityItemClassesClient {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            collection: ResourceCollection::new(gateway, RESOURCE),
        }
    }

    pub fn collection(&self) -> &ResourceCollection {
        &self.collection
    }

    pub async fn get_dataset_codelists(&self, uid: &str, dataset_uid: &str, params: Params) -> Result<Value> {
        let path = self
            .collection
            .url(&format!("{}/datasets/{}/codelists", uid, dataset_uid));
        self.collection
            .send(RequestContext::get(path).with_params(params))
            .await
    }

    pub async fn get_overview(&self, uid: &str, version: Option<&str>) -> Result<Value> {
        let mut request = RequestContext::get(self.collection.url(&format!("{}/overview", uid)));
        if let Some(version) = version.filter(|v| !v.is_empty()) {
            request = request.with_param("version", version);
        }
        self.collection.send(request).await
    }

    pub async fn get_activity_instance_classes(&self, uid: &str, params: Params) -> Result<Value> {
        let path = self
            .collection
            .url(&format!("{}/activity-instance-classes", uid));
        self.collection
            .send(RequestContext::get(path).with_params(params))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gateway, relative_path, FakeTransport};
    use serde_json::Map;

    #[tokio::test]
    async fn test_dataset_codelists_path() {
        let transport = FakeTransport::new();
        let client = ActivityItemClassesClient::new(gateway(transport.clone()));

        let mut params = Map::new();
        params.insert("page_size".into(), (-1).into());
        client
            .get_dataset_codelists("ActivityItemClass_1", "LB", params)
            .await
            .unwrap();

        let request = transport.last();
        assert_eq!(
            relative_path(&request),
            "activity-item-classes/ActivityItemClass_1/datasets/LB/codelists"
        );
        assert_eq!(request.query_value("page_size").as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn test_overview_and_instance_classes() {
        let transport = FakeTransport::new();
        let client = ActivityItemClassesClient::new(gateway(transport.clone()));

        client.get_overview("AIC_1", Some("")).await.unwrap();
        assert!(transport.last().url.query().is_none());

        client.get_activity_instance_classes("AIC_1", Map::new()).await.unwrap();
        assert_eq!(
            relative_path(&transport.last()),
            "activity-item-classes/AIC_1/activity-instance-classes"
        );
    }

    #[test]
    fn test_category_lookup() {
        assert_eq!(category_item_class("NumericFindings"), Some("finding_category"));
        assert_eq!(subcategory_item_class("Events"), Some("event_subcategory"));
        assert_eq!(category_item_class("Other"), None);
    }
}
