//! Error types and handling for the CLI

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from the core library
    #[error("{0}")]
    Core(#[from] studybuilder_core::Error),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Invalid file format
    #[error("Invalid file format for {}: expected {}", path.display(), expected)]
    InvalidFormat { path: PathBuf, expected: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// No API base URL configured
    #[error("No API base URL configured. Set it via --base-url, STUDYBUILDER_API_URL or api.base_url in the config file")]
    MissingBaseUrl,

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(core) => core_exit_code(core),
            Self::FileNotFound { .. } => 3,
            Self::InvalidFormat { .. } => 4,
            Self::Config(_) | Self::MissingBaseUrl => 5,
            Self::InvalidArgs(_) => 6,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_) | Self::MissingBaseUrl)
    }
}

/// Exit codes for core failures; rejected calls map onto the status class
fn core_exit_code(error: &studybuilder_core::Error) -> i32 {
    use studybuilder_core::Error as Core;

    match error {
        Core::Http(http) => match http.status_code {
            None => 10,
            Some(401) | Some(403) => 9,
            Some(404) => 7,
            Some(status) if status < 500 => 8,
            Some(_) => 11,
        },
        Core::Configuration { .. } => 5,
        _ => 2,
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studybuilder_core::http::HttpError;

    fn http(status: Option<u16>) -> Error {
        let mut error = HttpError::network("failed", "concepts/odms/forms", "get");
        error.status_code = status;
        Error::Core(studybuilder_core::Error::Http(error))
    }

    #[test]
    fn test_exit_codes_follow_status_class() {
        assert_eq!(http(None).exit_code(), 10);
        assert_eq!(http(Some(401)).exit_code(), 9);
        assert_eq!(http(Some(404)).exit_code(), 7);
        assert_eq!(http(Some(422)).exit_code(), 8);
        assert_eq!(http(Some(503)).exit_code(), 11);
        assert_eq!(Error::MissingBaseUrl.exit_code(), 5);
    }

    #[test]
    fn test_help_hint() {
        assert!(Error::invalid_args("bad").should_show_help());
        assert!(Error::MissingBaseUrl.should_show_help());
        assert!(!Error::other("boom").should_show_help());
    }

    #[test]
    fn test_plain_format() {
        assert_eq!(format_error(&Error::config("no file"), false), "Error: Configuration error: no file");
    }
}
