//! StudyBuilder Core - API client layer for the StudyBuilder backend
//!
//! This crate provides everything a front end needs to talk to the
//! StudyBuilder REST API and report failures to its users.
//!
//! # Main Components
//!
//! - **Gateway**: single chokepoint for every backend call, applying study
//!   version injection, pagination and filter normalization and bearer auth
//! - **Error Normalization**: turns backend error bodies into localized,
//!   per-field user messages
//! - **Notifications**: time-ordered, deduplicated, auto-expiring queue of
//!   user-facing messages with a subscription channel
//! - **Resource Clients**: thin wrappers mapping backend resources to typed calls
//! - **Stores**: caches of fetched lists for UI consumption
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use studybuilder_core::{AppContext, Gateway, GatewayConfig, MessageCatalog, NotificationQueue, TokenAuth};
//! use studybuilder_core::resources::{CrfsClient, OdmSource};
//!
//! async fn example() -> studybuilder_core::Result<()> {
//!     let context = Arc::new(AppContext::new("https://studybuilder.example.com/api")?);
//!     let gateway = Gateway::new(
//!         context,
//!         Arc::new(TokenAuth::from_env("STUDYBUILDER_TOKEN")),
//!         Arc::new(MessageCatalog::with_defaults()),
//!         NotificationQueue::new(),
//!         &GatewayConfig::default(),
//!     )?;
//!
//!     let forms = CrfsClient::new(gateway).get(Some(OdmSource::Forms), Default::default()).await?;
//!     println!("{}", forms);
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod error;
pub mod http;
pub mod i18n;
pub mod normalizer;
pub mod notifications;
pub mod resources;
pub mod stores;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use context::AppContext;
pub use error::{Error, Result};
pub use http::{
    ApiResponse, AuthProvider, Gateway, GatewayConfig, HttpError, NoAuth, RequestContext,
    TokenAuth, Transport,
};
pub use i18n::{Localizer, MessageCatalog};
pub use normalizer::{ErrorDetail, ErrorNormalizer, ErrorResponse};
pub use notifications::{NewNotification, Notification, NotificationKind, NotificationQueue};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
