//! Snapshot of a form being edited, used to detect unsaved changes

use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormStore {
    form: Option<Value>,
}

impl FormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a copy of the form
    pub fn save(&mut self, form: &Value) {
        self.form = Some(form.clone());
    }

    /// Replace the snapshot with an empty object
    ///
    /// A reset store is not [`is_empty`](Self::is_empty): only a store that
    /// never saw a form is.
    pub fn reset(&mut self) {
        self.form = Some(Value::Object(Map::new()));
    }

    pub fn is_empty(&self) -> bool {
        self.form.is_none()
    }

    /// Deep comparison with the snapshot
    pub fn is_equal(&self, form: &Value) -> bool {
        self.form.as_ref() == Some(form)
    }

    pub fn form(&self) -> Option<&Value> {
        self.form.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_and_compare() {
        let mut store = FormStore::new();
        assert!(store.is_empty());

        let form = json!({"name": "Vitals", "items": [1, 2]});
        store.save(&form);
        assert!(!store.is_empty());
        assert!(store.is_equal(&json!({"items": [1, 2], "name": "Vitals"})));
        assert!(!store.is_equal(&json!({"name": "Vitals"})));
    }

    #[test]
    fn test_reset_is_not_empty() {
        let mut store = FormStore::new();
        store.save(&json!({"name": "x"}));
        store.reset();
        assert!(!store.is_empty());
        assert!(store.is_equal(&json!({})));
    }
}
