//! Substance dictionary cache

use serde_json::Value;

use crate::resources::DictionariesClient;
use crate::Result;

#[derive(Debug, Clone)]
pub struct CompoundsStore {
    client: DictionariesClient,
    substances: Vec<Value>,
}

impl CompoundsStore {
    pub fn new(client: DictionariesClient) -> Self {
        Self {
            client,
            substances: Vec::new(),
        }
    }

    pub fn substances(&self) -> &[Value] {
        &self.substances
    }

    /// Reload the substance list; the cache is untouched on failure
    pub async fn fetch_substances(&mut self) -> Result<()> {
        let page = self.client.get_substances(None).await?;
        self.substances = page.items;
        Ok(())
    }
}
