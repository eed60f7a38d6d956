//! Activity instance class library client

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::{Gateway, Params, RequestContext};
use crate::resources::ResourceCollection;
use crate::Result;

const RESOURCE: &str = "activity-instance-classes";

/// Review outcome of an activity instance in a study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceAction {
    #[serde(rename = "Reviewed")]
    Reviewed,
    #[serde(rename = "Review not needed")]
    ReviewNotNeeded,
    #[serde(rename = "Remove instance")]
    Remove,
    #[serde(rename = "Review needed")]
    ReviewNeeded,
    #[serde(rename = "Add instance")]
    Add,
    #[serde(rename = "Not applicable")]
    NotApplicable,
}

impl InstanceAction {
    pub fn label(&self) -> &'static str {
        match self {
            InstanceAction::Reviewed => "Reviewed",
            InstanceAction::ReviewNotNeeded => "Review not needed",
            InstanceAction::Remove => "Remove instance",
            InstanceAction::ReviewNeeded => "Review needed",
            InstanceAction::Add => "Add instance",
            InstanceAction::NotApplicable => "Not applicable",
        }
    }
}

impl fmt::Display for InstanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct ActivityInstanceClassesClient {
    collection: ResourceCollection,
}

impl ActivityInstanceClassesClient {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            collection: ResourceCollection::new(gateway, RESOURCE),
        }
    }

    /// Standard library operations
    pub fn collection(&self) -> &ResourceCollection {
        &self.collection
    }

    async fn get_with(&self, suffix: &str, params: Params) -> Result<Value> {
        self.collection
            .send(RequestContext::get(self.collection.url(suffix)).with_params(params))
            .await
    }

    async fn get_versioned(&self, suffix: &str, version: Option<&str>) -> Result<Value> {
        let mut request = RequestContext::get(self.collection.url(suffix));
        if let Some(version) = version.filter(|v| !v.is_empty()) {
            request = request.with_param("version", version);
        }
        self.collection.send(request).await
    }

    pub async fn get_activity_item_classes(&self, uid: &str, params: Params) -> Result<Value> {
        self.get_with(&format!("{}/activity-item-classes", uid), params)
            .await
    }

    pub async fn get_model_mapping_datasets(&self, params: Params) -> Result<Value> {
        self.get_with("model-mappings/datasets", params).await
    }

    pub async fn get_parent_class_overview(&self, uid: &str, version: Option<&str>) -> Result<Value> {
        self.get_versioned(&format!("{}/parent-class-overview", uid), version)
            .await
    }

    pub async fn get_overview(&self, uid: &str, version: Option<&str>) -> Result<Value> {
        self.get_versioned(&format!("{}/overview", uid), version)
            .await
    }

    pub async fn get_child_classes(&self, uid: &str, params: Params) -> Result<Value> {
        self.get_with(&format!("{}/child-classes", uid), params)
            .await
    }

    pub async fn get_item_classes(&self, uid: &str, params: Params) -> Result<Value> {
        self.get_with(&format!("{}/item-classes", uid), params)
            .await
    }
}
