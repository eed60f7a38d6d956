//! Shared utilities for command handlers

use crate::config::Config;
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use studybuilder_core::http::{AuthProvider, NoAuth, Params, TokenAuth};
use studybuilder_core::context::study_uid_from_path;
use studybuilder_core::{AppContext, Gateway, MessageCatalog, NotificationQueue};

/// Connection settings given on the command line
#[derive(Debug, Clone, Default)]
pub struct Connection {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub study_version: Option<String>,
    pub locale: Option<String>,
}

/// Build the gateway for one CLI run
///
/// Flags win over the config file. Without any token the calls go out
/// unauthenticated.
pub fn connect(connection: &Connection, config: &Config) -> Result<Gateway> {
    let base_url = connection
        .base_url
        .as_ref()
        .or(config.api.base_url.as_ref())
        .ok_or(Error::MissingBaseUrl)?;

    let context = Arc::new(AppContext::new(base_url)?);
    if let Some(version) = connection
        .study_version
        .as_ref()
        .or(config.api.study_version.as_ref())
    {
        context.set_study_version(version.clone());
    }

    let auth: Arc<dyn AuthProvider> = match connection.token.as_ref().or(config.api.token.as_ref()) {
        Some(token) => Arc::new(TokenAuth::new(token.clone())),
        None => Arc::new(NoAuth),
    };

    let catalog = load_catalog(config, connection.locale.as_deref())?;

    tracing::debug!(
        base_url = %context.base_url(),
        study_version = ?context.study_version(),
        locales = ?catalog.locales(),
        "Connecting"
    );

    Ok(Gateway::new(
        context,
        auth,
        Arc::new(catalog),
        NotificationQueue::new(),
        &config.gateway_config(),
    )?)
}

/// Built-in messages plus the configured message files
fn load_catalog(config: &Config, locale: Option<&str>) -> Result<MessageCatalog> {
    let mut catalog = MessageCatalog::with_defaults();
    for path in &config.i18n.catalogs {
        let merged = catalog.merge_file(path)?;
        tracing::debug!(path = %path.display(), merged, "Merged message file");
    }
    catalog.set_locale(locale.unwrap_or(&config.i18n.locale));
    Ok(catalog)
}

/// Turn `key=value` pairs into query parameters
///
/// Values that parse as JSON scalars or objects keep their type; anything
/// else is sent as a string. Repeated keys become arrays.
pub fn params_from_pairs(pairs: &[(String, String)]) -> Params {
    let mut params: Params = Map::new();
    for (key, raw) in pairs {
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::Object(_))) => value,
            _ => Value::String(raw.clone()),
        };
        match params.get_mut(key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                params.insert(key.clone(), value);
            }
        }
    }
    params
}

/// Parse `--filters` and add it to the parameters
pub fn add_filters(params: &mut Params, filters: Option<&str>) -> Result<()> {
    if let Some(raw) = filters {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| Error::invalid_args(format!("--filters must be a JSON object: {}", e)))?;
        if !value.is_object() {
            return Err(Error::invalid_args("--filters must be a JSON object"));
        }
        params.insert("filters".to_string(), value);
    }
    Ok(())
}

/// Accept a bare study uid or any study route or URL containing one
pub fn resolve_study_uid(input: &str) -> String {
    study_uid_from_path(input).unwrap_or_else(|| input.trim().to_string())
}
