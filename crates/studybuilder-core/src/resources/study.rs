//! Study-scoped endpoints: study data suppliers

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::http::{Gateway, Params, RequestContext};
use crate::resources::Page;
use crate::Result;

const RESOURCE: &str = "studies";

/// A data supplier selected for a study
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyDataSupplier {
    #[serde(default)]
    pub study_uid: String,
    #[serde(default)]
    pub study_data_supplier_uid: String,
    #[serde(default)]
    pub study_data_supplier_order: Option<u32>,
    #[serde(default)]
    pub data_supplier_uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub study_data_supplier_type: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StudyDataSupplier {
    /// Display name of the supplier type term
    pub fn type_name(&self) -> Option<&str> {
        self.study_data_supplier_type
            .as_ref()
            .and_then(|t| t.get("term_name"))
            .and_then(Value::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct StudyClient {
    gateway: Gateway,
}

impl StudyClient {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    fn suppliers_path(study_uid: &str, suffix: &str) -> String {
        if suffix.is_empty() {
            format!("{}/{}/study-data-suppliers", RESOURCE, study_uid)
        } else {
            format!("{}/{}/study-data-suppliers/{}", RESOURCE, study_uid, suffix)
        }
    }

    async fn send(&self, request: RequestContext) -> Result<Value> {
        self.gateway.request(request).await?.json()
    }

    pub async fn get_study_data_suppliers(&self, study_uid: &str, params: Params) -> Result<Page<StudyDataSupplier>> {
        self.gateway
            .get_with(&Self::suppliers_path(study_uid, ""), params)
            .await?
            .json()
    }

    pub async fn get_study_data_suppliers_headers(&self, study_uid: &str, params: Params) -> Result<Value> {
        self.send(RequestContext::get(Self::suppliers_path(study_uid, "headers")).with_params(params))
            .await
    }

    pub async fn get_study_data_supplier(&self, study_uid: &str, uid: &str) -> Result<StudyDataSupplier> {
        self.gateway
            .get(&Self::suppliers_path(study_uid, uid))
            .await?
            .json()
    }

    pub async fn create_study_data_supplier(&self, study_uid: &str, data: Value) -> Result<Value> {
        self.send(RequestContext::post(Self::suppliers_path(study_uid, "")).with_body(data))
            .await
    }

    pub async fn update_study_data_supplier(&self, study_uid: &str, uid: &str, data: Value) -> Result<Value> {
        self.send(RequestContext::new(Method::PUT, Self::suppliers_path(study_uid, uid)).with_body(data))
            .await
    }

    /// Move a supplier to a new position
    pub async fn update_study_data_supplier_order(&self, study_uid: &str, uid: &str, order: u32) -> Result<Value> {
        self.send(
            RequestContext::new(
                Method::PATCH,
                Self::suppliers_path(study_uid, &format!("{}/order", uid)),
            )
            .with_body(json!({"new_order": order})),
        )
        .await
    }

    /// Replace the full supplier selection of a study
    pub async fn sync_study_data_suppliers(&self, study_uid: &str, suppliers: Value) -> Result<Value> {
        self.send(
            RequestContext::new(Method::PUT, Self::suppliers_path(study_uid, "sync"))
                .with_body(json!({"suppliers": suppliers})),
        )
        .await
    }

    pub async fn delete_study_data_supplier(&self, study_uid: &str, uid: &str) -> Result<Value> {
        self.send(RequestContext::new(Method::DELETE, Self::suppliers_path(study_uid, uid)))
            .await
    }

    pub async fn get_study_data_suppliers_audit_trail(&self, study_uid: &str) -> Result<Value> {
        self.send(RequestContext::get(Self::suppliers_path(study_uid, "audit-trail")))
            .await
    }

    pub async fn get_study_data_supplier_audit_trail(&self, study_uid: &str, uid: &str) -> Result<Value> {
        self.send(RequestContext::get(Self::suppliers_path(
            study_uid,
            &format!("{}/audit-trail", uid),
        )))
        .await
    }
}
