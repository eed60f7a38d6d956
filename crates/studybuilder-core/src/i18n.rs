//! Localization of user-facing messages
//!
//! The error normalizer only needs two things from a localization backend:
//! whether a key exists for a locale, and rendering a key with a named
//! context. [`MessageCatalog`] provides both from nested JSON message trees
//! in the same shape the web frontend ships (`{"api": {"errors": {...}}}`).

use std::collections::HashMap;
use std::path::Path;
use std::sync::{OnceLock, RwLock};

use regex::Regex;
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Key of the generic fallback error message
pub const GENERAL_ERROR_KEY: &str = "_errors.general";

/// Translation lookup and rendering
pub trait Localizer: Send + Sync {
    /// Locale used for regular lookups
    fn active_locale(&self) -> String;

    /// Locale consulted when the active one has no entry
    fn fallback_locale(&self) -> String;

    /// Whether `key` has a message in `locale`
    fn exists(&self, key: &str, locale: &str) -> bool;

    /// Render `key` in `locale` with named placeholders taken from `ctx`
    fn render(&self, key: &str, locale: &str, ctx: &Map<String, Value>) -> Option<String>;

    /// Render `key` in the active locale, then the fallback locale, else the key itself
    fn translate(&self, key: &str) -> String {
        let empty = Map::new();
        self.render(key, &self.active_locale(), &empty)
            .or_else(|| self.render(key, &self.fallback_locale(), &empty))
            .unwrap_or_else(|| key.to_string())
    }
}

/// In-memory message catalog keyed by locale and dotted message key
#[derive(Debug)]
pub struct MessageCatalog {
    messages: HashMap<String, HashMap<String, String>>,
    active: RwLock<String>,
    fallback: String,
}

impl MessageCatalog {
    /// Create an empty catalog
    pub fn new(active: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            messages: HashMap::new(),
            active: RwLock::new(active.into()),
            fallback: fallback.into(),
        }
    }

    /// Create an English catalog holding the built-in messages
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new("en", "en");
        catalog.insert("en", GENERAL_ERROR_KEY, "An error occurred");
        catalog
    }

    /// Add or replace a single message
    pub fn insert(&mut self, locale: &str, key: &str, template: &str) {
        self.messages
            .entry(locale.to_string())
            .or_default()
            .insert(key.to_string(), template.to_string());
    }

    /// Merge a nested message tree for a locale
    ///
    /// Nested objects are flattened to dotted keys; non-string leaves are
    /// ignored.
    pub fn merge_tree(&mut self, locale: &str, tree: &Value) -> Result<usize> {
        let Value::Object(root) = tree else {
            return Err(Error::Localization {
                message: format!("Messages for locale '{}' must be a JSON object", locale),
            });
        };

        let mut flat = Vec::new();
        flatten(root, "", &mut flat);
        let count = flat.len();

        let entries = self.messages.entry(locale.to_string()).or_default();
        for (key, template) in flat {
            entries.insert(key, template);
        }
        Ok(count)
    }

    /// Merge a message tree from JSON text
    pub fn merge_json(&mut self, locale: &str, json: &str) -> Result<usize> {
        let tree: Value = serde_json::from_str(json)?;
        self.merge_tree(locale, &tree)
    }

    /// Merge a message file; the locale is taken from the file stem (`en.json`)
    pub fn merge_file(&mut self, path: &Path) -> Result<usize> {
        let locale = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::Localization {
                message: format!("Cannot derive locale from {}", path.display()),
            })?
            .to_string();
        let content = std::fs::read_to_string(path)?;
        self.merge_json(&locale, &content)
    }

    /// Switch the active locale
    pub fn set_locale(&self, locale: impl Into<String>) {
        let mut guard = self.active.write().unwrap_or_else(|e| e.into_inner());
        *guard = locale.into();
    }

    /// Locales with at least one message
    pub fn locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.messages.keys().cloned().collect();
        locales.sort();
        locales
    }

    fn template(&self, key: &str, locale: &str) -> Option<&String> {
        self.messages.get(locale).and_then(|m| m.get(key))
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Localizer for MessageCatalog {
    fn active_locale(&self) -> String {
        self.active.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn fallback_locale(&self) -> String {
        self.fallback.clone()
    }

    fn exists(&self, key: &str, locale: &str) -> bool {
        self.template(key, locale).is_some()
    }

    fn render(&self, key: &str, locale: &str, ctx: &Map<String, Value>) -> Option<String> {
        self.template(key, locale).map(|t| interpolate(t, ctx))
    }
}

fn flatten(map: &Map<String, Value>, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, value) in map {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(child) => flatten(child, &full, out),
            Value::String(template) => out.push((full, template.clone())),
            _ => {}
        }
    }
}

/// Replace `{name}` placeholders with values from `ctx`
///
/// Unknown placeholders are left untouched.
pub fn interpolate(template: &str, ctx: &Map<String, Value>) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER
        .get_or_init(|| Regex::new(r"\{\s*([A-Za-z0-9_]+)\s*\}").expect("valid placeholder pattern"));

    re.replace_all(template, |caps: &regex::Captures<'_>| match ctx.get(&caps[1]) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
        None => caps[0].to_string(),
    })
    .into_owned()
}
