//! Administration endpoints

use serde_json::Value;

use crate::http::{Gateway, Params};
use crate::Result;

const RESOURCE: &str = "admin";

#[derive(Debug, Clone)]
pub struct AdminClient {
    gateway: Gateway,
}

impl AdminClient {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Complexity burden attached to each activity
    pub async fn get_complexity_activity_burdens(&self, params: Params) -> Result<Value> {
        self.gateway
            .get_with(&format!("{}/complexity-scores/activity-burdens", RESOURCE), params)
            .await?
            .json()
    }

    /// Complexity burden definitions
    pub async fn get_complexity_burdens(&self, params: Params) -> Result<Value> {
        self.gateway
            .get_with(&format!("{}/complexity-scores/burdens", RESOURCE), params)
            .await?
            .json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gateway, relative_path, FakeTransport};
    use serde_json::{json, Map};

    #[tokio::test]
    async fn test_burden_paths() {
        let transport = FakeTransport::new();
        transport.respond(200, json!([{"burden_id": "B1"}]));
        let admin = AdminClient::new(gateway(transport.clone()));

        let burdens = admin.get_complexity_burdens(Map::new()).await.unwrap();
        assert_eq!(burdens[0]["burden_id"], "B1");
        assert_eq!(relative_path(&transport.last()), "admin/complexity-scores/burdens");

        admin.get_complexity_activity_burdens(Map::new()).await.unwrap();
        assert_eq!(
            relative_path(&transport.last()),
            "admin/complexity-scores/activity-burdens"
        );
    }
}
