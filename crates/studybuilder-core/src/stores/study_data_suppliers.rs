//! Study data supplier list with loading state
//!
//! State is shared behind a lock so views can observe `loading` while a
//! fetch is in flight.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use crate::http::Params;
use crate::resources::{Page, StudyClient, StudyDataSupplier};
use crate::Result;

#[derive(Debug, Default)]
struct SuppliersState {
    suppliers: Vec<StudyDataSupplier>,
    total_items: u64,
    loading: bool,
}

/// Clears the loading flag when the fetch ends, however it ends
struct LoadingGuard<'a> {
    state: &'a RwLock<SuppliersState>,
}

impl<'a> LoadingGuard<'a> {
    fn start(state: &'a RwLock<SuppliersState>) -> Self {
        write(state).loading = true;
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        write(self.state).loading = false;
    }
}

fn read(state: &RwLock<SuppliersState>) -> RwLockReadGuard<'_, SuppliersState> {
    state.read().unwrap_or_else(|e| e.into_inner())
}

fn write(state: &RwLock<SuppliersState>) -> RwLockWriteGuard<'_, SuppliersState> {
    state.write().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug, Clone)]
pub struct StudyDataSuppliersStore {
    client: StudyClient,
    state: Arc<RwLock<SuppliersState>>,
}

impl StudyDataSuppliersStore {
    pub fn new(client: StudyClient) -> Self {
        Self {
            client,
            state: Arc::default(),
        }
    }

    pub fn study_data_suppliers(&self) -> Vec<StudyDataSupplier> {
        read(&self.state).suppliers.clone()
    }

    /// Suppliers in display order, as returned by the backend
    pub fn sorted_study_data_suppliers(&self) -> Vec<StudyDataSupplier> {
        self.study_data_suppliers()
    }

    pub fn total_items(&self) -> u64 {
        read(&self.state).total_items
    }

    pub fn loading(&self) -> bool {
        read(&self.state).loading
    }

    /// Reload the supplier list of a study
    ///
    /// `total_count=true` is sent unless the caller set it.
    pub async fn fetch_study_data_suppliers(&self, study_uid: &str, mut params: Params) -> Result<Page<StudyDataSupplier>> {
        let _loading = LoadingGuard::start(&self.state);

        params
            .entry("total_count")
            .or_insert(Value::Bool(true));

        let page = self.client.get_study_data_suppliers(study_uid, params).await?;

        let mut state = write(&self.state);
        state.suppliers = page.items.clone();
        state.total_items = page.total;
        Ok(page)
    }

    pub async fn get_headers(&self, study_uid: &str, params: Params) -> Result<Value> {
        self.client
            .get_study_data_suppliers_headers(study_uid, params)
            .await
    }

    pub async fn get_study_data_supplier(&self, study_uid: &str, uid: &str) -> Result<StudyDataSupplier> {
        self.client.get_study_data_supplier(study_uid, uid).await
    }

    pub async fn create_study_data_supplier(&self, study_uid: &str, data: Value) -> Result<Value> {
        self.client
            .create_study_data_supplier(study_uid, data)
            .await
    }

    pub async fn update_study_data_supplier(&self, study_uid: &str, uid: &str, data: Value) -> Result<Value> {
        self.client
            .update_study_data_supplier(study_uid, uid, data)
            .await
    }

    pub async fn update_study_data_supplier_order(&self, study_uid: &str, uid: &str, order: u32) -> Result<Value> {
        self.client
            .update_study_data_supplier_order(study_uid, uid, order)
            .await
    }

    pub async fn delete_study_data_supplier(&self, study_uid: &str, uid: &str) -> Result<Value> {
        self.client.delete_study_data_supplier(study_uid, uid).await
    }

    pub async fn get_study_data_suppliers_audit_trail(&self, study_uid: &str) -> Result<Value> {
        self.client
            .get_study_data_suppliers_audit_trail(study_uid)
            .await
    }

    pub async fn fetch_study_data_supplier_audit_trail(&self, study_uid: &str, uid: &str) -> Result<Value> {
        self.client
            .get_study_data_supplier_audit_trail(study_uid, uid)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gateway, FakeTransport};
    use serde_json::{json, Map};

    #[tokio::test]
    async fn test_fetch_defaults_total_count() {
        let transport = FakeTransport::new();
        transport.respond(
            200,
            json!({"items": [{"study_data_supplier_uid": "StudyDataSupplier_000001", "name": "Lab"}], "total": 7}),
        );
        let store = StudyDataSuppliersStore::new(StudyClient::new(gateway(transport.clone())));

        store
            .fetch_study_data_suppliers("Study_000001", Map::new())
            .await
            .unwrap();

        assert_eq!(store.total_items(), 7);
        assert_eq!(store.study_data_suppliers()[0].name, "Lab");
        assert!(!store.loading());
        assert_eq!(transport.last().query_value("total_count").as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_explicit_total_count_is_kept() {
        let transport = FakeTransport::new();
        let store = StudyDataSuppliersStore::new(StudyClient::new(gateway(transport.clone())));

        let mut params = Map::new();
        params.insert("total_count".into(), json!(false));
        store
            .fetch_study_data_suppliers("Study_000001", params)
            .await
            .unwrap();

        assert_eq!(transport.last().query_value("total_count").as_deref(), Some("false"));
        assert_eq!(store.total_items(), 0);
    }

    #[tokio::test]
    async fn test_loading_cleared_on_failure() {
        let transport = FakeTransport::new();
        transport.respond(500, json!({"message": "Internal error"}));
        let store = StudyDataSuppliersStore::new(StudyClient::new(gateway(transport)));

        assert!(store
            .fetch_study_data_suppliers("Study_000001", Map::new())
            .await
            .is_err());
        assert!(!store.loading());
        assert!(store.study_data_suppliers().is_empty());
    }
}
