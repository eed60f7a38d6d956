//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigInitArgs, ConfigShowArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::redaction;
use crate::output::OutputWriter;

/// Handle the config command
pub async fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
    }
}

/// Handle config init subcommand
fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    let path = match args.path {
        Some(path) => path,
        None => Config::user_config_path()
            .ok_or_else(|| Error::config("Unable to determine user config directory"))?,
    };

    if path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ))?;
        return Ok(());
    }

    Config::default().save(&path)?;
    output.success(&format!("✓ Created config at {}", path.display()))?;
    output.info("Set api.base_url, or export STUDYBUILDER_API_URL, before running other commands.")
}

/// Handle config show subcommand
///
/// The token is masked; everything else is printed as resolved.
fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let mut value = serde_json::to_value(config)?;
    redaction::redact_json_value(&mut value);
    let shown: Config = serde_json::from_value(value)?;

    let content = shown.render(args.format)?;
    output.write(&content)?;
    if !content.ends_with('\n') {
        output.writeln("")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ConfigFormat, OutputFormat};
    use tempfile::TempDir;

    fn quiet_output() -> OutputWriter {
        OutputWriter::with_writers(OutputFormat::Human, false, true, Box::new(std::io::sink()), Box::new(std::io::sink()))
    }

    #[tokio::test]
    async fn test_init_writes_defaults_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let mut output = quiet_output();

        let init = |force| ConfigArgs {
            action: ConfigAction::Init(ConfigInitArgs {
                path: Some(path.clone()),
                force,
            }),
        };

        handle_config(init(false), &Config::default(), &mut output).await.unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), Config::default());

        std::fs::write(&path, "api:\n  base_url: http://localhost:8000/\n").unwrap();
        handle_config(init(false), &Config::default(), &mut output).await.unwrap();
        assert!(Config::from_file(&path).unwrap().api.base_url.is_some());

        handle_config(init(true), &Config::default(), &mut output).await.unwrap();
        assert!(Config::from_file(&path).unwrap().api.base_url.is_none());
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_show_masks_token() {
        let mut config = Config::default();
        config.api.base_url = Some("https://studybuilder.example.com/api/".to_string());
        config.api.token = Some("very-secret-token".to_string());

        let captured = Captured::default();
        let mut output = OutputWriter::with_writers(
            OutputFormat::Human,
            false,
            false,
            Box::new(captured.clone()),
            Box::new(std::io::sink()),
        );

        let args = ConfigArgs {
            action: ConfigAction::Show(ConfigShowArgs {
                format: ConfigFormat::Json,
            }),
        };
        handle_config(args, &config, &mut output).await.unwrap();

        let shown: serde_json::Value = serde_json::from_slice(&captured.0.lock().unwrap()).unwrap();
        assert_eq!(shown["api"]["token"], "***");
        assert_eq!(shown["api"]["base_url"], "https://studybuilder.example.com/api/");
    }
}
