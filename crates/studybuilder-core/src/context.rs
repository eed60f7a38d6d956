//! Shared application context
//!
//! Holds the values every outbound request needs to see: the service base
//! URL and the currently selected study value version. The context is shared
//! as `Arc<AppContext>` between the gateway and whatever UI layer changes the
//! selection, so a new selection is visible to the next request.

use std::sync::{OnceLock, RwLock};

use regex::Regex;
use url::Url;

use crate::{Error, Result};

/// Process-wide values read by every outbound request
#[derive(Debug)]
pub struct AppContext {
    base_url: Url,
    study_version: RwLock<Option<String>>,
}

impl AppContext {
    /// Create a context for the given API base URL
    ///
    /// A trailing slash is appended when missing so relative resource paths
    /// join below the versioned API root instead of replacing its last
    /// segment.
    pub fn new(base_url: &str) -> Result<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        let base_url = Url::parse(&normalized).map_err(|e| Error::Configuration {
            message: format!("Invalid API base URL: {}", base_url),
            source: Some(e.into()),
        })?;

        Ok(Self {
            base_url,
            study_version: RwLock::new(None),
        })
    }

    /// The API base URL, always ending with `/`
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Currently selected study value version
    pub fn study_version(&self) -> Option<String> {
        self.study_version
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Select a study value version for subsequent study-scoped reads
    pub fn set_study_version(&self, version: impl Into<String>) {
        let mut guard = self.study_version.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(version.into());
    }

    /// Go back to reading the latest study value
    pub fn clear_study_version(&self) {
        let mut guard = self.study_version.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

/// Extract a study uid (`Study_000123`) from a route or API path
pub fn study_uid_from_path(path: &str) -> Option<String> {
    static STUDY_UID: OnceLock<Regex> = OnceLock::new();
    let re = STUDY_UID.get_or_init(|| {
        Regex::new(r"(?i)/studies/(Study_[0-9]+)").expect("valid study uid pattern")
    });

    re.captures(path).map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let ctx = AppContext::new("https://sb.example.com/api").unwrap();
        assert_eq!(ctx.base_url().as_str(), "https://sb.example.com/api/");
        assert_eq!(
            ctx.base_url().join("concepts/odms/forms").unwrap().as_str(),
            "https://sb.example.com/api/concepts/odms/forms"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            AppContext::new("not a url"),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_study_version_selection() {
        let ctx = AppContext::new("http://localhost:8000").unwrap();
        assert_eq!(ctx.study_version(), None);

        ctx.set_study_version("3");
        assert_eq!(ctx.study_version().as_deref(), Some("3"));

        ctx.clear_study_version();
        assert_eq!(ctx.study_version(), None);
    }

    #[test]
    fn test_study_uid_from_path() {
        assert_eq!(
            study_uid_from_path("/studies/Study_000012/activities"),
            Some("Study_000012".to_string())
        );
        assert_eq!(
            study_uid_from_path("/STUDIES/study_7/overview"),
            Some("study_7".to_string())
        );
        assert_eq!(study_uid_from_path("/library/activities"), None);
    }
}
