//! CRF (ODM) library client
//!
//! Covers the `concepts/odms` family: collections (study events), forms,
//! item groups, items, their relationships and lifecycle, vendor
//! extensions, conditions, metadata lookups and XML/PDF export.

use std::fmt;
use std::str::FromStr;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::http::{ApiResponse, Gateway, Params, RequestContext, ResponseType};
use crate::resources::ResourceCollection;
use crate::{Error, Result};

const RESOURCE: &str = "concepts/odms";

/// ODM element family addressed by lifecycle and vendor operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OdmSource {
    /// CRF collections
    StudyEvents,
    Forms,
    ItemGroups,
    Items,
    Conditions,
    VendorNamespaces,
    VendorAttributes,
    VendorElements,
}

impl OdmSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            OdmSource::StudyEvents => "study-events",
            OdmSource::Forms => "forms",
            OdmSource::ItemGroups => "item-groups",
            OdmSource::Items => "items",
            OdmSource::Conditions => "conditions",
            OdmSource::VendorNamespaces => "vendor-namespaces",
            OdmSource::VendorAttributes => "vendor-attributes",
            OdmSource::VendorElements => "vendor-elements",
        }
    }

    pub const ALL: [OdmSource; 8] = [
        OdmSource::StudyEvents,
        OdmSource::Forms,
        OdmSource::ItemGroups,
        OdmSource::Items,
        OdmSource::Conditions,
        OdmSource::VendorNamespaces,
        OdmSource::VendorAttributes,
        OdmSource::VendorElements,
    ];
}

impl fmt::Display for OdmSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OdmSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        OdmSource::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| Error::Configuration {
                message: format!("Unknown ODM source '{}'", s),
                source: None,
            })
    }
}

/// Export output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xml,
    Pdf,
}

/// Parameters of a metadata export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub target_uids: Vec<String>,
    /// Kind of exported element (`form`, `study_event`, ...)
    pub target_type: String,
    /// Export flavour expected by the backend (`v1`, `clinspark`, ...)
    pub export_to: String,
    pub stylesheet: Option<String>,
    /// Library version; sent empty for the latest
    pub version: Option<String>,
    pub allowed_namespaces: Vec<String>,
    #[serde(default)]
    pub format: ExportFormat,
}

impl ExportRequest {
    fn params(&self) -> Params {
        let mut params = Map::new();
        params.insert(
            "target_uids".to_string(),
            Value::from(self.target_uids.clone()),
        );
        params.insert("target_type".to_string(), Value::from(self.target_type.clone()));
        params.insert("export_to".to_string(), Value::from(self.export_to.clone()));
        if let Some(stylesheet) = &self.stylesheet {
            params.insert("stylesheet".to_string(), Value::from(stylesheet.clone()));
        }
        if self.format == ExportFormat::Pdf {
            params.insert("pdf".to_string(), Value::Bool(true));
        }
        params.insert(
            "version".to_string(),
            Value::from(self.version.clone().unwrap_or_default()),
        );
        if !self.allowed_namespaces.is_empty() {
            params.insert(
                "allowed_namespaces".to_string(),
                Value::from(self.allowed_namespaces.clone()),
            );
        }
        params
    }
}

/// Client for the CRF library
#[derive(Debug, Clone)]
pub struct CrfsClient {
    odms: ResourceCollection,
}

impl CrfsClient {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            odms: ResourceCollection::new(gateway, RESOURCE),
        }
    }

    /// Lifecycle operations of one ODM element family
    pub fn source(&self, source: OdmSource) -> ResourceCollection {
        ResourceCollection::new(self.odms.gateway().clone(), self.odms.url(source.as_str()))
    }

    fn path(&self, suffix: &str) -> String {
        self.odms.url(suffix)
    }

    async fn get_path(&self, suffix: &str, params: Option<Params>) -> Result<Value> {
        let mut request = RequestContext::get(self.path(suffix));
        if let Some(params) = params {
            request = request.with_params(params);
        }
        self.odms.send(request).await
    }

    async fn post_path(&self, suffix: &str, data: Value) -> Result<Value> {
        self.odms
            .send(RequestContext::post(self.path(suffix)).with_body(data))
            .await
    }

    async fn post_override(&self, suffix: &str, data: Value, sync: bool) -> Result<Value> {
        self.odms
            .send(
                RequestContext::post(self.path(suffix))
                    .with_body(data)
                    .with_param("override", sync),
            )
            .await
    }

    async fn patch_path(&self, suffix: &str, data: Value) -> Result<Value> {
        self.odms
            .send(RequestContext::new(Method::PATCH, self.path(suffix)).with_body(data))
            .await
    }

    async fn delete_path(&self, suffix: &str) -> Result<Value> {
        self.odms
            .send(RequestContext::new(Method::DELETE, self.path(suffix)))
            .await
    }

    /// List a family, or the whole library when `source` is `None`
    pub async fn get(&self, source: Option<OdmSource>, params: Params) -> Result<Value> {
        let suffix = source.map(|s| s.as_str()).unwrap_or_default();
        self.get_path(suffix, Some(params)).await
    }

    pub async fn reactivate(&self, source: OdmSource, uid: &str) -> Result<Value> {
        self.source(source).reactivate(uid).await
    }

    pub async fn inactivate(&self, source: OdmSource, uid: &str) -> Result<Value> {
        self.source(source).inactivate(uid).await
    }

    pub async fn new_version(&self, source: OdmSource, uid: &str, params: Option<Params>) -> Result<Value> {
        self.source(source).new_version(uid, params).await
    }

    pub async fn approve(&self, source: OdmSource, uid: &str) -> Result<Value> {
        self.source(source).approve(uid).await
    }

    pub async fn delete(&self, source: OdmSource, uid: &str) -> Result<Value> {
        self.source(source).delete(uid).await
    }

    /// Version history of an element
    pub async fn get_audit_trail(&self, source: OdmSource, uid: &str) -> Result<Value> {
        self.source(source).get_versions(uid).await
    }

    pub async fn create_form(&self, data: Value) -> Result<Value> {
        self.post_path("forms", data).await
    }

    pub async fn update_form(&self, uid: &str, data: Value) -> Result<Value> {
        self.patch_path(&format!("forms/{}", uid), data).await
    }

    pub async fn get_form(&self, uid: &str) -> Result<Value> {
        self.get_path(&format!("forms/{}", uid), None).await
    }

    pub async fn create_item_group(&self, data: Value) -> Result<Value> {
        self.post_path("item-groups", data).await
    }

    pub async fn update_item_group(&self, uid: &str, data: Value) -> Result<Value> {
        self.patch_path(&format!("item-groups/{}", uid), data).await
    }

    pub async fn get_item_group(&self, uid: &str) -> Result<Value> {
        self.get_path(&format!("item-groups/{}", uid), None).await
    }

    pub async fn create_item(&self, data: Value) -> Result<Value> {
        self.post_path("items", data).await
    }

    pub async fn update_item(&self, uid: &str, data: Value) -> Result<Value> {
        self.patch_path(&format!("items/{}", uid), data).await
    }

    pub async fn get_item(&self, uid: &str) -> Result<Value> {
        self.get_path(&format!("items/{}", uid), None).await
    }

    pub async fn create_collection(&self, data: Value) -> Result<Value> {
        self.post_path("study-events", data).await
    }

    pub async fn update_collection(&self, uid: &str, data: Value) -> Result<Value> {
        self.patch_path(&format!("study-events/{}", uid), data).await
    }

    pub async fn get_collection(&self, uid: &str) -> Result<Value> {
        self.get_path(&format!("study-events/{}", uid), None).await
    }

    /// Link forms to a collection; `sync` replaces the existing links
    pub async fn add_forms_to_collection(&self, uid: &str, data: Value, sync: bool) -> Result<Value> {
        self.post_override(&format!("study-events/{}/forms", uid), data, sync)
            .await
    }

    pub async fn add_item_groups_to_form(&self, uid: &str, data: Value, sync: bool) -> Result<Value> {
        self.post_override(&format!("forms/{}/item-groups", uid), data, sync)
            .await
    }

    pub async fn add_items_to_item_group(&self, uid: &str, data: Value, sync: bool) -> Result<Value> {
        self.post_override(&format!("item-groups/{}/items", uid), data, sync)
            .await
    }

    pub async fn overwrite_forms_in_collection(&self, uid: &str, data: Value) -> Result<Value> {
        self.post_path(&format!("study-events/{}/forms", uid), data)
            .await
    }

    pub async fn overwrite_item_groups_in_form(&self, uid: &str, data: Value) -> Result<Value> {
        self.post_path(&format!("forms/{}/item-groups", uid), data)
            .await
    }

    pub async fn overwrite_items_in_item_group(&self, uid: &str, data: Value) -> Result<Value> {
        self.post_path(&format!("item-groups/{}/items", uid), data)
            .await
    }

    pub async fn add_activity_groups_to_form(&self, uid: &str, data: Value) -> Result<Value> {
        self.post_override(&format!("forms/{}/activity-groups", uid), data, true)
            .await
    }

    pub async fn add_activity_sub_groups_to_item_group(&self, uid: &str, data: Value) -> Result<Value> {
        self.post_override(&format!("item-groups/{}/activity-sub-groups", uid), data, true)
            .await
    }

    pub async fn add_activities_to_item(&self, uid: &str, data: Value) -> Result<Value> {
        self.post_override(&format!("items/{}/activities", uid), data, true)
            .await
    }

    /// Export elements as ODM XML or a rendered PDF
    ///
    /// The raw response is returned since the body is a document, not JSON.
    pub async fn export(&self, export: &ExportRequest) -> Result<ApiResponse> {
        let mut request = RequestContext::post(self.path("metadata/xmls/export"))
            .with_params(export.params());

        if export.format == ExportFormat::Pdf {
            request = request
                .with_body(Value::Object(Map::new()))
                .with_response_type(ResponseType::Binary)
                .with_header("Accept", "application/octet-stream");
        }

        self.odms.gateway().request(request).await
    }

    /// XSL stylesheet by name
    pub async fn get_xsl(&self, kind: &str) -> Result<ApiResponse> {
        self.odms
            .gateway()
            .get(&self.path(&format!("metadata/xmls/stylesheets/{}", kind)))
            .await
    }

    pub async fn get_aliases(&self, params: Params) -> Result<Value> {
        self.get_path("metadata/aliases", Some(params)).await
    }

    pub async fn get_descriptions(&self, params: Params) -> Result<Value> {
        self.get_path("metadata/descriptions", Some(params)).await
    }

    pub async fn get_expressions(&self, params: Params) -> Result<Value> {
        self.get_path("metadata/formal-expressions", Some(params))
            .await
    }

    pub async fn get_conditions(&self, params: Params) -> Result<Value> {
        self.get_path("conditions", Some(params)).await
    }

    pub async fn create_condition(&self, data: Value) -> Result<Value> {
        self.post_path("conditions", data).await
    }

    pub async fn edit_condition(&self, uid: &str, data: Value) -> Result<Value> {
        self.patch_path(&format!("conditions/{}", uid), data).await
    }

    pub async fn delete_condition(&self, uid: &str) -> Result<Value> {
        self.delete_path(&format!("conditions/{}", uid)).await
    }

    /// Elements referencing the given one
    pub async fn get_relationships(&self, source: OdmSource, uid: &str) -> Result<Value> {
        self.get_path(&format!("{}/{}/relationships", source, uid), None)
            .await
    }

    /// Forms with the collections they belong to
    pub async fn get_crf_forms(&self) -> Result<Value> {
        self.get_path("forms/study-events", None).await
    }

    /// Item groups with the forms they belong to
    pub async fn get_crf_groups(&self) -> Result<Value> {
        self.get_path("item-groups/forms", None).await
    }

    pub async fn get_all_namespaces(&self, params: Params) -> Result<Value> {
        self.get_path("vendor-namespaces", Some(params)).await
    }

    pub async fn get_namespace(&self, uid: &str) -> Result<Value> {
        self.get_path(&format!("vendor-namespaces/{}", uid), None)
            .await
    }

    pub async fn create_namespace(&self, data: Value) -> Result<Value> {
        self.post_path("vendor-namespaces", data).await
    }

    pub async fn delete_namespace(&self, uid: &str) -> Result<Value> {
        self.delete_path(&format!("vendor-namespaces/{}", uid)).await
    }

    pub async fn edit_namespace(&self, uid: &str, data: Value) -> Result<Value> {
        self.patch_path(&format!("vendor-namespaces/{}", uid), data)
            .await
    }

    pub async fn get_all_attributes(&self, params: Params) -> Result<Value> {
        self.get_path("vendor-attributes", Some(params)).await
    }

    pub async fn create_attribute(&self, data: Value) -> Result<Value> {
        self.post_path("vendor-attributes", data).await
    }

    pub async fn edit_attribute(&self, uid: &str, data: Value) -> Result<Value> {
        self.patch_path(&format!("vendor-attributes/{}", uid), data)
            .await
    }

    pub async fn get_all_elements(&self, params: Params) -> Result<Value> {
        self.get_path("vendor-elements", Some(params)).await
    }

    pub async fn create_element(&self, data: Value) -> Result<Value> {
        self.post_path("vendor-elements", data).await
    }

    pub async fn edit_element(&self, uid: &str, data: Value) -> Result<Value> {
        self.patch_path(&format!("vendor-elements/{}", uid), data)
            .await
    }

    /// Replace the vendor elements attached to an element
    pub async fn set_elements(&self, source: OdmSource, uid: &str, data: Value) -> Result<Value> {
        self.post_override(&format!("{}/{}/vendor-elements", source, uid), data, true)
            .await
    }

    pub async fn set_attributes(&self, source: OdmSource, uid: &str, data: Value) -> Result<Value> {
        self.post_override(&format!("{}/{}/vendor-attributes", source, uid), data, true)
            .await
    }

    pub async fn set_element_attributes(&self, source: OdmSource, uid: &str, data: Value) -> Result<Value> {
        self.post_override(
            &format!("{}/{}/vendor-element-attributes", source, uid),
            data,
            true,
        )
        .await
    }

    /// Replace all vendor extensions of an element in one call
    pub async fn set_extensions(&self, source: OdmSource, uid: &str, data: Value) -> Result<Value> {
        self.post_path(&format!("{}/{}/vendors", source, uid), data)
            .await
    }
}
