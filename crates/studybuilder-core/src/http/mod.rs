//! HTTP gateway for StudyBuilder API communication
//!
//! Every backend call passes through [`Gateway`], which applies the same
//! cross-cutting concerns to all of them:
//! - Base URL resolution and query encoding
//! - Study value version injection for study-scoped reads
//! - Page-size sentinel and filters normalization
//! - Bearer token acquisition through an [`AuthProvider`]
//! - Failure classification and user notification

pub mod auth;
pub mod client;
pub mod error;
pub mod request;
pub mod transport;

pub use auth::{AuthProvider, NoAuth, TokenAuth};
pub use client::{ApiResponse, Gateway, GatewayConfig};
pub use error::{ErrorClassification, HttpError, RequestEcho};
pub use request::{Params, PreparedRequest, RequestContext, ResponseType};
pub use transport::{RawResponse, ReqwestTransport, Transport, TransportError, TransportErrorKind};

// Re-export commonly used types
pub use reqwest::{Method, StatusCode};
