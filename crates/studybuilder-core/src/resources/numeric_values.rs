//! Numeric values with unit

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::http::Gateway;
use crate::resources::ResourceCollection;
use crate::{Error, Result};

const RESOURCE: &str = "concepts/numeric-values-with-unit";

/// Library all user-created numeric values belong to
pub const LIBRARY_SPONSOR: &str = "Sponsor";

/// A numeric value to create
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericValueInput {
    pub value: Option<f64>,
    pub unit_definition_uid: Option<String>,
    #[serde(default)]
    pub library_name: String,
}

impl NumericValueInput {
    pub fn new(value: f64, unit_definition_uid: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            unit_definition_uid: Some(unit_definition_uid.into()),
            library_name: LIBRARY_SPONSOR.to_string(),
        }
    }

    /// Both a non-zero value and a unit are set
    pub fn is_complete(&self) -> bool {
        self.value.is_some_and(|v| v != 0.0)
            && self
                .unit_definition_uid
                .as_deref()
                .is_some_and(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct NumericValuesClient {
    collection: ResourceCollection,
}

impl NumericValuesClient {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            collection: ResourceCollection::new(gateway, RESOURCE),
        }
    }

    pub fn collection(&self) -> &ResourceCollection {
        &self.collection
    }

    /// Create a value in the sponsor library, returning its uid
    pub async fn create_numeric_value(&self, mut item: NumericValueInput) -> Result<String> {
        item.library_name = LIBRARY_SPONSOR.to_string();
        let created = self.collection.create(serde_json::to_value(&item)?).await?;

        created
            .get("uid")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Internal {
                message: "Created numeric value has no uid".to_string(),
                source: anyhow::anyhow!("response: {}", created),
            })
    }

    /// Create every complete value in order, skipping the rest
    pub async fn create_numeric_values(&self, items: Vec<NumericValueInput>) -> Result<Vec<String>> {
        let mut uids = Vec::new();
        for item in items {
            if !item.is_complete() {
                debug!(?item, "Skipping incomplete numeric value");
                continue;
            }
            uids.push(self.create_numeric_value(item).await?);
        }
        Ok(uids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gateway, relative_path, FakeTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_forces_sponsor_library() {
        let transport = FakeTransport::new();
        transport.respond(201, json!({"uid": "NumericValueWithUnit_1"}));
        let client = NumericValuesClient::new(gateway(transport.clone()));

        let item = NumericValueInput {
            value: Some(5.0),
            unit_definition_uid: Some("UnitDefinition_1".into()),
            library_name: "CDISC".into(),
        };
        let uid = client.create_numeric_value(item).await.unwrap();

        assert_eq!(uid, "NumericValueWithUnit_1");
        let request = transport.last();
        assert_eq!(relative_path(&request), "concepts/numeric-values-with-unit");
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["library_name"], "Sponsor");
    }

    #[tokio::test]
    async fn test_incomplete_values_are_skipped() {
        let transport = FakeTransport::new();
        transport.respond(201, json!({"uid": "NV_1"}));
        transport.respond(201, json!({"uid": "NV_2"}));
        let client = NumericValuesClient::new(gateway(transport.clone()));

        let uids = client
            .create_numeric_values(vec![
                NumericValueInput::new(1.0, "U_1"),
                NumericValueInput { value: None, ..NumericValueInput::new(0.0, "U_1") },
                NumericValueInput::new(0.0, "U_1"),
                NumericValueInput { unit_definition_uid: None, ..NumericValueInput::new(3.0, "") },
                NumericValueInput::new(2.0, "U_2"),
            ])
            .await
            .unwrap();

        assert_eq!(uids, vec!["NV_1", "NV_2"]);
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_uid_is_an_error() {
        let transport = FakeTransport::new();
        transport.respond(201, json!({}));
        let client = NumericValuesClient::new(gateway(transport));

        let err = client
            .create_numeric_value(NumericValueInput::new(1.0, "U_1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Internal { .. }));
    }
}
