//! Configuration management for the CLI
//!
//! Settings are resolved from, in increasing priority:
//! - Default values
//! - The first configuration file found (YAML, TOML or JSON)
//! - Environment variables (a `.env` file in the working directory is loaded first)
//! - Command-line arguments

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use studybuilder_core::GatewayConfig;

const APP_DIR: &str = "studybuilder";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend connection settings
    pub api: ApiConfig,

    /// Message catalog settings
    pub i18n: I18nConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingSettings,
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the API
    pub base_url: Option<String>,

    /// Bearer token; prefer STUDYBUILDER_TOKEN over storing it here
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Study value version injected into study-scoped reads
    pub study_version: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Verify TLS certificates
    pub validate_tls: bool,
}

/// Message catalog settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Active locale; field labels always come from English
    pub locale: String,

    /// Message files merged into the catalog; the file stem names the locale
    pub catalogs: Vec<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Use colored output by default
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

/// Logging settings stored in the config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level used when no verbosity flag is given
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Log file path
    pub file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            study_version: None,
            timeout_secs: None,
            validate_tls: true,
        }
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            catalogs: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            progress: true,
        }
    }
}

/// On-disk formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Yaml,
    Toml,
    Json,
}

impl FileFormat {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("toml") => FileFormat::Toml,
            _ => FileFormat::Json,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = match FileFormat::of(path) {
            FileFormat::Yaml => serde_yaml::from_str(&content)?,
            FileFormat::Toml => toml::from_str(&content).map_err(|e| Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: format!("TOML ({})", e.message()),
            })?,
            FileFormat::Json => serde_json::from_str(&content)?,
        };

        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    ///
    /// Environment overrides are applied on top either way.
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        // A missing .env file is not an error
        let _ = dotenv::dotenv();

        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::load()?,
        };
        config.merge_env();
        Ok(config)
    }

    /// Apply `STUDYBUILDER_*` environment variables
    pub fn merge_env(&mut self) {
        self.merge_vars(env_value);
    }

    fn merge_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("STUDYBUILDER_API_URL") {
            self.api.base_url = Some(url);
        }
        if let Some(token) = lookup("STUDYBUILDER_TOKEN") {
            self.api.token = Some(token);
        }
        if let Some(version) = lookup("STUDYBUILDER_STUDY_VERSION") {
            self.api.study_version = Some(version);
        }
        if let Some(locale) = lookup("STUDYBUILDER_LOCALE") {
            self.i18n.locale = locale;
        }
    }

    /// User-level configuration file
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.yaml"))
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".studybuilder.yaml"),
            PathBuf::from(".studybuilder.toml"),
            PathBuf::from(".studybuilder.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let app_dir = config_dir.join(APP_DIR);
            paths.push(app_dir.join("config.yaml"));
            paths.push(app_dir.join("config.toml"));
            paths.push(app_dir.join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".studybuilder.yaml"));
        }

        paths
    }

    /// Settings for the HTTP transport
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            timeout_secs: self.api.timeout_secs,
            validate_tls: self.api.validate_tls,
            ..GatewayConfig::default()
        }
    }

    /// Serialize in the given format
    pub fn render(&self, format: crate::cli::ConfigFormat) -> Result<String> {
        use crate::cli::ConfigFormat;

        Ok(match format {
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
        })
    }

    /// Save configuration to a file, in the format its extension names
    pub fn save(&self, path: &Path) -> Result<()> {
        use crate::cli::ConfigFormat;

        let content = match FileFormat::of(path) {
            FileFormat::Yaml => self.render(ConfigFormat::Yaml)?,
            FileFormat::Toml => self.render(ConfigFormat::Toml)?,
            FileFormat::Json => self.render(ConfigFormat::Json)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample() -> Config {
        let mut config = Config::default();
        config.api.base_url = Some("https://studybuilder.example.com/api/".to_string());
        config.api.timeout_secs = Some(30);
        config.i18n.locale = "de".to_string();
        config.i18n.catalogs = vec![PathBuf::from("i18n/de.json")];
        config.logging.level = Some("debug".to_string());
        config
    }

    #[test]
    fn test_save_and_load_by_extension() {
        let dir = TempDir::new().unwrap();
        for name in ["config.yaml", "config.toml", "config.json"] {
            let path = dir.path().join(name);
            sample().save(&path).unwrap();
            assert_eq!(Config::from_file(&path).unwrap(), sample(), "{}", name);
        }
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.yaml");
        std::fs::write(&path, "api:\n  base_url: http://localhost:8000/\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.api.base_url.as_deref(), Some("http://localhost:8000/"));
        assert!(config.api.validate_tls);
        assert_eq!(config.i18n.locale, "en");
        assert!(config.output.color);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = Config::from_file(Path::new("/nonexistent/studybuilder.yaml")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "api = [").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
    }

    #[test]
    fn test_unset_token_is_omitted() {
        let mut config = Config::default();
        config.api.token = Some("secret".to_string());
        let rendered = config.render(crate::cli::ConfigFormat::Yaml).unwrap();
        assert!(rendered.contains("token: secret"));

        config.api.token = None;
        let rendered = config.render(crate::cli::ConfigFormat::Yaml).unwrap();
        assert!(!rendered.contains("token"));
    }

    #[test]
    fn test_dotenv_values_reach_api_section() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "STUDYBUILDER_TOKEN=dotenv-secret\nSTUDYBUILDER_API_URL=https://dotenv.example.com/api/\nSTUDYBUILDER_LOCALE=\n",
        )
        .unwrap();

        let vars: std::collections::HashMap<String, String> = dotenv::from_path_iter(&path)
            .unwrap()
            .map(|item| item.unwrap())
            .collect();

        let mut config = sample();
        config.merge_vars(|name| vars.get(name).filter(|v| !v.trim().is_empty()).cloned());

        assert_eq!(config.api.token.as_deref(), Some("dotenv-secret"));
        assert_eq!(config.api.base_url.as_deref(), Some("https://dotenv.example.com/api/"));
        assert_eq!(config.i18n.locale, "de");
    }

    #[test]
    fn test_gateway_config() {
        let gateway = sample().gateway_config();
        assert_eq!(gateway.timeout_secs, Some(30));
        assert!(gateway.validate_tls);
        assert!(gateway.user_agent.starts_with("studybuilder/"));
    }
}
