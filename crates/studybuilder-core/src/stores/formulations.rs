//! Lookup lists needed by the formulation editor

use serde_json::Value;

use crate::resources::ct_terms::ADVERSE_EVENTS_CODELIST;
use crate::resources::{ActiveSubstancesClient, CtTermsClient};
use crate::Result;

#[derive(Debug, Clone)]
pub struct FormulationsStore {
    substances_client: ActiveSubstancesClient,
    terms_client: CtTermsClient,
    active_substances: Vec<Value>,
    adverse_events: Vec<Value>,
}

impl FormulationsStore {
    pub fn new(substances_client: ActiveSubstancesClient, terms_client: CtTermsClient) -> Self {
        Self {
            substances_client,
            terms_client,
            active_substances: Vec::new(),
            adverse_events: Vec::new(),
        }
    }

    pub fn active_substances(&self) -> &[Value] {
        &self.active_substances
    }

    pub fn adverse_events(&self) -> &[Value] {
        &self.adverse_events
    }

    /// Reload the active substances in `Final` status
    pub async fn fetch_active_substances(&mut self) -> Result<()> {
        self.active_substances = self.substances_client.get_final().await?.items;
        Ok(())
    }

    /// Reload the adverse event terms
    pub async fn fetch_adverse_events(&mut self) -> Result<()> {
        self.adverse_events = self
            .terms_client
            .get_terms_by_codelist(ADVERSE_EVENTS_CODELIST, true)
            .await?
            .items;
        Ok(())
    }

    /// Load both lists concurrently
    ///
    /// Each list is stored as soon as its own call succeeds; the first
    /// failure is returned.
    pub async fn initialize(&mut self) -> Result<()> {
        let (substances, terms) = tokio::join!(
            self.substances_client.get_final(),
            self.terms_client
                .get_terms_by_codelist(ADVERSE_EVENTS_CODELIST, true),
        );

        let substances = substances.map(|page| self.active_substances = page.items);
        let terms = terms.map(|page| self.adverse_events = page.items);
        substances.and(terms)
    }
}
