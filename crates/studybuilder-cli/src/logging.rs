//! Logging setup for the StudyBuilder CLI
//!
//! This module provides:
//! - A session id attached to every command run
//! - Redaction of tokens before anything is traced
//! - Timing spans
//! - Subscriber setup for console or file output in compact, full or JSON format

use crate::config::LoggingSettings;
use crate::error::{Error, Result};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{field, Span};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Id of the current CLI session
static SESSION_ID: OnceLock<String> = OnceLock::new();

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Output format: compact, full, json
    pub format: LogFormat,
    /// Enable console output
    pub console: bool,
    /// Optional file output path
    pub file: Option<PathBuf>,
    /// Include thread IDs
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum LogFormat {
    /// Compact format for production
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "compact" => Some(LogFormat::Compact),
            "full" => Some(LogFormat::Full),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            console: true,
            file: None,
            thread_ids: false,
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Create logging config from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => {}
            1 => {
                config.level = "info".to_string();
            }
            2 => {
                config.level = "debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Full;
                config.source_location = true;
                config.thread_ids = true;
            }
        }

        config
    }

    /// Apply settings from the config file
    ///
    /// The file's level only applies when no `-v` flag raised the verbosity.
    pub fn merge_with_settings(&mut self, settings: &LoggingSettings, verbosity: u8) {
        if verbosity == 0 {
            if let Some(level) = &settings.level {
                self.level = level.clone();
            }
        }
        if let Some(format) = settings.format.as_deref().and_then(LogFormat::parse) {
            self.format = format;
        }
        if settings.file.is_some() {
            self.file = settings.file.clone();
        }
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        // RUST_LOG takes precedence
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            self.level = rust_log;
        }

        if let Ok(format) = std::env::var("STUDYBUILDER_LOG_FORMAT") {
            match LogFormat::parse(&format) {
                Some(format) => self.format = format,
                None => eprintln!("Invalid log format: {}, using default", format),
            }
        }

        if let Ok(file) = std::env::var("STUDYBUILDER_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
    }
}

/// Initialize the global logging system
///
/// The returned guard flushes the file writer and must be held until exit.
pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let (writer, guard, ansi) = match &config.file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let name = path
                .file_name()
                .ok_or_else(|| Error::config(format!("Invalid log file path {}", path.display())))?;
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (BoxMakeWriter::new(writer), Some(guard), false)
        }
        None if config.console => (
            BoxMakeWriter::new(std::io::stderr),
            None,
            std::io::stderr().is_terminal(),
        ),
        None => (BoxMakeWriter::new(std::io::sink), None, false),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(config.thread_ids)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let installed = match config.format {
        LogFormat::Compact => tracing::subscriber::set_global_default(builder.with_ansi(ansi).compact().finish()),
        LogFormat::Full => tracing::subscriber::set_global_default(builder.with_ansi(ansi).finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.with_ansi(false).json().finish()),
    };
    installed.map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;

    let session_id = SESSION_ID.get_or_init(generate_session_id);
    tracing::debug!(session_id = %session_id, config = ?config, "Logging system initialized");

    Ok(guard)
}

/// Generate a unique id for this session
pub fn generate_session_id() -> String {
    format!("cli_{}", Uuid::new_v4().simple())
}

/// Get the current session id
pub fn current_session_id() -> Option<&'static str> {
    SESSION_ID.get().map(|s| s.as_str())
}

/// Create a span with session id and timing
pub fn create_operation_span(operation: &str) -> Span {
    tracing::info_span!(
        "operation",
        operation = operation,
        session_id = current_session_id().unwrap_or("unknown"),
        duration_ms = field::Empty,
    )
}

/// Sensitive data redaction utilities
pub mod redaction {
    use regex::Regex;
    use std::sync::OnceLock;

    static TOKEN_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

    fn token_regex() -> Option<&'static Regex> {
        TOKEN_REGEX
            .get_or_init(|| Regex::new(r#"(?i)\b(token|bearer|password)([=:\s]+)['"]?([A-Za-z0-9_.~+/=-]{6,})['"]?"#).ok())
            .as_ref()
    }

    /// Redact tokens and passwords from a string
    pub fn redact_sensitive(input: &str) -> String {
        match token_regex() {
            Some(regex) => regex.replace_all(input, "$1$2***").into_owned(),
            None => input.to_string(),
        }
    }

    /// Redact sensitive information from JSON values
    pub fn redact_json_value(value: &mut serde_json::Value) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    if is_sensitive_key(key) && !val.is_null() {
                        *val = serde_json::Value::String("***".to_string());
                    } else {
                        redact_json_value(val);
                    }
                }
            }
            serde_json::Value::Array(arr) => {
                for item in arr.iter_mut() {
                    redact_json_value(item);
                }
            }
            serde_json::Value::String(s) => {
                *s = redact_sensitive(s);
            }
            _ => {}
        }
    }

    fn is_sensitive_key(key: &str) -> bool {
        let key_lower = key.to_lowercase();
        key_lower.contains("token")
            || key_lower.contains("password")
            || key_lower.contains("secret")
            || key_lower == "authorization"
    }
}

/// Performance timing utilities
pub mod timing {
    use std::time::Instant;
    use tracing::Span;

    /// A timer that logs its duration when dropped
    pub struct Timer {
        start: Instant,
        span: Span,
        operation: String,
    }

    impl Timer {
        pub fn new(operation: &str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation),
                operation: operation.to_string(),
            }
        }

        /// Span covering the timed operation
        pub fn span(&self) -> &Span {
            &self.span
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let duration = self.start.elapsed();
            self.span.record("duration_ms", duration.as_millis() as u64);

            tracing::debug!(
                operation = %self.operation,
                duration_ms = duration.as_millis() as u64,
                "Operation completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let input = "Authorization: Bearer eyJhbGciOi.abc-123 token=abcdef123456 password: hunter22";
        let redacted = redaction::redact_sensitive(input);
        assert!(redacted.contains("Bearer ***"));
        assert!(redacted.contains("token=***"));
        assert!(redacted.contains("password: ***"));
        assert!(!redacted.contains("eyJhbGciOi"));
        assert!(!redacted.contains("abcdef123456"));
        assert!(!redacted.contains("hunter22"));
    }

    #[test]
    fn test_json_redaction() {
        let mut value = serde_json::json!({
            "api": {"base_url": "https://sb.example.com/api/", "token": "abc", "study_version": null},
            "headers": {"Authorization": "Bearer abcdefghij"},
            "name": "Lab"
        });

        redaction::redact_json_value(&mut value);

        assert_eq!(value["api"]["token"], "***");
        assert_eq!(value["api"]["base_url"], "https://sb.example.com/api/");
        assert_eq!(value["headers"]["Authorization"], "***");
        assert_eq!(value["name"], "Lab");
    }

    #[test]
    fn test_logging_config_from_verbosity() {
        let config = LoggingConfig::from_verbosity(0);
        assert_eq!(config.level, "warn");
        assert!(!config.source_location);

        let config = LoggingConfig::from_verbosity(2);
        assert_eq!(config.level, "debug");
        assert!(config.source_location);

        let config = LoggingConfig::from_verbosity(3);
        assert_eq!(config.level, "trace");
        assert_eq!(config.format, LogFormat::Full);
        assert!(config.thread_ids);
    }

    #[test]
    fn test_file_settings_yield_to_verbosity() {
        let settings = LoggingSettings {
            level: Some("error".to_string()),
            format: Some("json".to_string()),
            file: Some(PathBuf::from("studybuilder.log")),
        };

        let mut quiet = LoggingConfig::from_verbosity(0);
        quiet.merge_with_settings(&settings, 0);
        assert_eq!(quiet.level, "error");
        assert_eq!(quiet.format, LogFormat::Json);
        assert_eq!(quiet.file, Some(PathBuf::from("studybuilder.log")));

        let mut verbose = LoggingConfig::from_verbosity(2);
        verbose.merge_with_settings(&settings, 2);
        assert_eq!(verbose.level, "debug");
    }

    #[test]
    fn test_session_ids_are_unique() {
        let a = generate_session_id();
        assert!(a.starts_with("cli_"));
        assert_ne!(a, generate_session_id());
    }
}
