//! Pharmaceutical product library client and display helpers

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::http::Gateway;
use crate::resources::{fetch_all_pages, ResourceCollection};
use crate::Result;

const RESOURCE: &str = "concepts/pharmaceutical-products";

/// Page size used when collecting every product
pub const PHARMA_PRODUCTS_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PharmaceuticalProduct {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub formulations: Vec<Formulation>,
    #[serde(default)]
    pub dosage_forms: Option<Vec<DosageForm>>,
    #[serde(default)]
    pub routes_of_administration: Option<Vec<RouteOfAdministration>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Formulation {
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(default)]
    pub active_substance: ActiveSubstanceRef,
    #[serde(default)]
    pub formulation_name: Option<String>,
    #[serde(default)]
    pub strength: Option<Strength>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveSubstanceRef {
    #[serde(default)]
    pub inn: Option<String>,
    #[serde(default)]
    pub long_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Strength {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit_label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DosageForm {
    #[serde(default)]
    pub term_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteOfAdministration {
    #[serde(default)]
    pub name: String,
}

/// Ingredient label: substance, formulation name, then `(value unit)`
pub fn ingredient_name(ingredient: &Ingredient) -> String {
    let substance = &ingredient.active_substance;
    let mut result = substance
        .inn
        .as_deref()
        .filter(|inn| !inn.is_empty())
        .or(substance.long_number.as_deref())
        .unwrap_or_default()
        .to_string();

    if let Some(name) = ingredient.formulation_name.as_deref().filter(|n| !n.is_empty()) {
        result.push(' ');
        result.push_str(name);
    }

    if let Some(strength) = &ingredient.strength {
        let value = strength.value.map(|v| v.to_string()).unwrap_or_default();
        let unit = strength.unit_label.as_deref().unwrap_or_default();
        result.push_str(&format!(" ({} {})", value, unit));
    }

    result
}

/// All ingredients of all formulations, comma separated
pub fn display_ingredients(product: &PharmaceuticalProduct) -> String {
    product
        .formulations
        .iter()
        .flat_map(|formulation| formulation.ingredients.iter())
        .map(ingredient_name)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn display_dosage_forms(product: &PharmaceuticalProduct) -> Option<String> {
    product.dosage_forms.as_ref().map(|forms| {
        forms
            .iter()
            .map(|form| form.term_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    })
}

pub fn display_routes_of_administration(product: &PharmaceuticalProduct) -> Option<String> {
    product.routes_of_administration.as_ref().map(|routes| {
        routes
            .iter()
            .map(|route| route.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    })
}

#[derive(Debug, Clone)]
pub struct PharmaceuticalProductsClient {
    collection: ResourceCollection,
}

impl PharmaceuticalProductsClient {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            collection: ResourceCollection::new(gateway, RESOURCE),
        }
    }

    pub fn collection(&self) -> &ResourceCollection {
        &self.collection
    }

    /// Every product in the library, fetched page by page
    pub async fn get_pharma_products(&self) -> Result<Vec<PharmaceuticalProduct>> {
        fetch_all_pages(
            self.collection.gateway(),
            RESOURCE,
            &Map::new(),
            PHARMA_PRODUCTS_PAGE_SIZE,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gateway, FakeTransport};
    use serde_json::json;

    fn product() -> PharmaceuticalProduct {
        serde_json::from_value(json!({
            "uid": "PharmaceuticalProduct_1",
            "formulations": [
                {"ingredients": [
                    {"active_substance": {"inn": "paracetamol"}, "formulation_name": "tablet", "strength": {"value": 500, "unit_label": "mg"}},
                    {"active_substance": {"inn": null, "long_number": "LN-42"}}
                ]},
                {"ingredients": [
                    {"active_substance": {"inn": "caffeine"}, "strength": {"value": 2.5, "unit_label": "mg"}}
                ]}
            ],
            "dosage_forms": [{"term_name": "Tablet"}, {"term_name": "Capsule"}],
            "routes_of_administration": [{"name": "Oral"}],
            "library_name": "Sponsor"
        }))
        .unwrap()
    }

    #[test]
    fn test_display_helpers() {
        let product = product();
        assert_eq!(
            display_ingredients(&product),
            "paracetamol tablet (500 mg), LN-42, caffeine (2.5 mg)"
        );
        assert_eq!(display_dosage_forms(&product).as_deref(), Some("Tablet, Capsule"));
        assert_eq!(display_routes_of_administration(&product).as_deref(), Some("Oral"));
        assert_eq!(product.extra["library_name"], "Sponsor");
    }

    #[test]
    fn test_missing_lists_render_none() {
        let product = PharmaceuticalProduct::default();
        assert_eq!(display_ingredients(&product), "");
        assert_eq!(display_dosage_forms(&product), None);
        assert_eq!(display_routes_of_administration(&product), None);
    }

    #[tokio::test]
    async fn test_fetches_every_page() {
        let transport = FakeTransport::new();
        let first: Vec<Value> = (0..100).map(|i| json!({"uid": format!("PP_{}", i)})).collect();
        transport.respond(200, json!({"items": first, "total": 101, "page": 1, "size": 100}));
        transport.respond(200, json!({"items": [{"uid": "PP_100"}], "total": 101, "page": 2, "size": 100}));

        let client = PharmaceuticalProductsClient::new(gateway(transport.clone()));
        let products = client.get_pharma_products().await.unwrap();

        assert_eq!(products.len(), 101);
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].query_value("page_number").as_deref(), Some("2"));
        assert_eq!(requests[1].query_value("page_size").as_deref(), Some("100"));
    }
}
