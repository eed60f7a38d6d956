//! Error normalization
//!
//! Turns a failed backend call into user-facing notification messages,
//! preferring field-level validation details over the generic message:
//! - One message per validation detail, labelled with a localized field name
//! - Error codes rendered through `api.errors.<code>` templates when present
//! - The top-level `message`, then a generic localized fallback

pub mod detail;
pub mod response;

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::http::HttpError;
use crate::i18n::{Localizer, GENERAL_ERROR_KEY};
use crate::notifications::NewNotification;

pub use detail::ErrorDetail;
pub use response::{ErrorResponse, FieldSegment, ValidationDetail};

/// Prefix of field label keys in the message catalog
pub const FIELD_KEY_PREFIX: &str = "api.fields";

/// Prefix of error code keys in the message catalog
pub const ERROR_KEY_PREFIX: &str = "api.errors";

const PLACEHOLDERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Maps backend failures to localized notification messages
#[derive(Clone)]
pub struct ErrorNormalizer {
    localizer: Arc<dyn Localizer>,
}

impl ErrorNormalizer {
    pub fn new(localizer: Arc<dyn Localizer>) -> Self {
        Self { localizer }
    }

    /// Error notifications for a failed call
    ///
    /// Every notification carries the same [`ErrorDetail`] and stays until
    /// dismissed.
    pub fn notifications(&self, error: &HttpError) -> Vec<NewNotification> {
        let detail = ErrorDetail::extract(error);
        self.messages(error)
            .into_iter()
            .map(|message| {
                NewNotification::error(message)
                    .timeout_ms(0)
                    .with_error(Some(detail.clone()))
            })
            .collect()
    }

    /// Messages for a failed call, one per validation detail
    pub fn messages(&self, error: &HttpError) -> Vec<String> {
        match ErrorResponse::decode(error.body.as_ref()) {
            ErrorResponse::Validation { message, details } => details
                .iter()
                .map(|detail| self.detail_message(detail, message.as_deref()))
                .collect(),
            ErrorResponse::Message { message, error_type } => {
                vec![self.resolve_error_message(error_type.as_deref(), Some(message), &Map::new())]
            }
            ErrorResponse::Empty => vec![self.localizer.translate(GENERAL_ERROR_KEY)],
        }
    }

    fn detail_message(&self, detail: &ValidationDetail, top_message: Option<&str>) -> String {
        let label = self.resolve_field_label(&detail.field);

        let mut ctx = Map::new();
        ctx.insert(
            "field".to_string(),
            label.clone().map(Value::String).unwrap_or(Value::Null),
        );
        ctx.insert(
            "msg".to_string(),
            detail.msg.clone().map(Value::String).unwrap_or(Value::Null),
        );
        for (key, value) in &detail.ctx {
            ctx.insert(key.clone(), value.clone());
        }

        let fallback = detail
            .reason()
            .map(str::to_string)
            .or_else(|| match (&label, &detail.msg) {
                (Some(label), Some(msg)) => Some(format!("{}: {}", label, msg)),
                (None, Some(msg)) => Some(msg.clone()),
                (Some(label), None) => Some(label.clone()),
                (None, None) => None,
            })
            .or_else(|| top_message.map(str::to_string));

        self.resolve_error_message(detail.error_code.as_deref(), fallback, &ctx)
    }

    /// Display label for a field location
    ///
    /// Lookup order: the literal joined path, then the path with array
    /// indices replaced by `a`, `b`, `c`... (indices passed as context), then
    /// a rendered path such as `body.[0].name`.
    pub fn resolve_field_label(&self, field: &[FieldSegment]) -> Option<String> {
        if field.is_empty() {
            return None;
        }

        let locale = self.localizer.fallback_locale();

        let literal_key = field_key(field.iter().map(ToString::to_string));
        if self.localizer.exists(&literal_key, &locale) {
            if let Some(label) = self.localizer.render(&literal_key, &locale, &Map::new()) {
                return Some(label);
            }
        }

        if let Some((placeholder_key, ctx)) = placeholder_key(field) {
            if self.localizer.exists(&placeholder_key, &locale) {
                if let Some(label) = self.localizer.render(&placeholder_key, &locale, &ctx) {
                    return Some(label);
                }
            }
        }

        Some(
            field
                .iter()
                .map(|segment| match segment {
                    FieldSegment::Index(i) => format!("[{}]", i),
                    FieldSegment::Key(k) => k.clone(),
                })
                .collect::<Vec<_>>()
                .join("."),
        )
    }

    /// Message for an error code, else `fallback`, else the generic message
    pub fn resolve_error_message(
        &self,
        code: Option<&str>,
        fallback: Option<String>,
        ctx: &Map<String, Value>,
    ) -> String {
        if let Some(code) = code.filter(|c| !c.is_empty()) {
            let key = format!("{}.{}", ERROR_KEY_PREFIX, code);
            for locale in [self.localizer.active_locale(), self.localizer.fallback_locale()] {
                if self.localizer.exists(&key, &locale) {
                    if let Some(message) = self.localizer.render(&key, &locale, ctx) {
                        return message;
                    }
                }
            }
        }

        fallback
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| self.localizer.translate(GENERAL_ERROR_KEY))
    }
}

impl std::fmt::Debug for ErrorNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorNormalizer")
            .field("active_locale", &self.localizer.active_locale())
            .finish()
    }
}

fn field_key(segments: impl Iterator<Item = String>) -> String {
    format!("{}.{}", FIELD_KEY_PREFIX, segments.collect::<Vec<_>>().join(","))
}

fn placeholder_key(field: &[FieldSegment]) -> Option<(String, Map<String, Value>)> {
    let mut ctx = Map::new();
    let mut segments = Vec::with_capacity(field.len());

    for segment in field {
        match segment {
            FieldSegment::Index(i) => {
                let letter = *PLACEHOLDERS.get(ctx.len())? as char;
                ctx.insert(letter.to_string(), Value::from(*i));
                segments.push(letter.to_string());
            }
            FieldSegment::Key(k) => segments.push(k.clone()),
        }
    }

    if ctx.is_empty() {
        return None;
    }
    Some((field_key(segments.into_iter()), ctx))
}
