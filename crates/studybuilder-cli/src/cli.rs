//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;
use studybuilder_core::resources::{ExportFormat, OdmSource};

/// StudyBuilder CLI - browse libraries and manage study metadata
///
/// Talks to a StudyBuilder API deployment, normalizing every call the same
/// way the web client does and printing any notifications the calls raise.
#[derive(Parser, Debug)]
#[command(
    name = "studybuilder",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "STUDYBUILDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Base URL of the API, e.g. https://studybuilder.example.com/api/
    #[arg(long, global = true, env = "STUDYBUILDER_API_URL")]
    pub base_url: Option<String>,

    /// Bearer token sent with every call
    #[arg(long, global = true, env = "STUDYBUILDER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Study value version injected into study-scoped reads
    #[arg(long, global = true)]
    pub study_version: Option<String>,

    /// Locale used for error messages
    #[arg(long, global = true)]
    pub locale: Option<String>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read any API path
    Get(GetArgs),

    /// Work with the CRF library
    Crfs(CrfsArgs),

    /// Work with the data suppliers of a study
    Suppliers(SuppliersArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Path relative to the API base URL
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Query parameter as key=value (repeatable)
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Filters as a JSON object
    #[arg(long)]
    pub filters: Option<String>,

    /// Rows per page; -1 asks for every row
    #[arg(long, allow_hyphen_values = true)]
    pub page_size: Option<i64>,

    /// Follow pagination and print every row
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the crfs command
#[derive(Parser, Debug)]
pub struct CrfsArgs {
    #[command(subcommand)]
    pub action: CrfsAction,
}

/// CRF subcommands
#[derive(Subcommand, Debug)]
pub enum CrfsAction {
    /// List elements of one CRF kind
    List(CrfsListArgs),
    /// Approve a draft
    Approve(CrfsTargetArgs),
    /// Retire an element
    Inactivate(CrfsTargetArgs),
    /// Bring a retired element back
    Reactivate(CrfsTargetArgs),
    /// Open a new draft version
    NewVersion(CrfsTargetArgs),
    /// Delete a draft
    Delete(CrfsTargetArgs),
    /// Export elements as ODM XML or PDF
    Export(CrfsExportArgs),
}

/// Arguments for crfs list
#[derive(Parser, Debug)]
pub struct CrfsListArgs {
    /// Element kind
    #[arg(value_enum)]
    pub source: Source,

    /// Query parameter as key=value (repeatable)
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Filters as a JSON object
    #[arg(long)]
    pub filters: Option<String>,
}

/// Arguments naming one CRF element
#[derive(Parser, Debug)]
pub struct CrfsTargetArgs {
    /// Element kind
    #[arg(value_enum)]
    pub source: Source,

    /// Element uid
    pub uid: String,
}

/// Arguments for crfs export
#[derive(Parser, Debug)]
pub struct CrfsExportArgs {
    /// Uids of the exported elements
    #[arg(required = true, value_name = "UID")]
    pub target_uids: Vec<String>,

    /// Kind of exported element
    #[arg(long, default_value = "form")]
    pub target_type: String,

    /// Export flavour expected by the backend
    #[arg(long, default_value = "v1")]
    pub export_to: String,

    /// Stylesheet applied to the export
    #[arg(long)]
    pub stylesheet: Option<String>,

    /// Library version; latest when omitted
    #[arg(long, value_name = "VERSION")]
    pub library_version: Option<String>,

    /// Vendor namespace allowed in the export (repeatable)
    #[arg(long = "namespace")]
    pub allowed_namespaces: Vec<String>,

    /// Export format
    #[arg(long, value_enum, default_value = "xml")]
    pub format: Export,

    /// Write the export to a file instead of stdout
    #[arg(long = "out", value_name = "FILE")]
    pub out_file: Option<PathBuf>,
}

/// Arguments for the suppliers command
#[derive(Parser, Debug)]
pub struct SuppliersArgs {
    #[command(subcommand)]
    pub action: SuppliersAction,
}

/// Study data supplier subcommands
#[derive(Subcommand, Debug)]
pub enum SuppliersAction {
    /// List the data suppliers of a study
    List(SuppliersListArgs),
}

/// Arguments for suppliers list
#[derive(Parser, Debug)]
pub struct SuppliersListArgs {
    /// Study uid, or a study URL containing one
    #[arg(value_name = "STUDY_UID")]
    pub study_uid: String,

    /// Query parameter as key=value (repeatable)
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init(ConfigInitArgs),
    /// Print the effective configuration
    Show(ConfigShowArgs),
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Target file; defaults to the user config path
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// CRF element kinds accepted on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Source {
    StudyEvents,
    Forms,
    ItemGroups,
    Items,
    Conditions,
    VendorNamespaces,
    VendorAttributes,
    VendorElements,
}

/// Export formats accepted on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Export {
    Xml,
    Pdf,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl From<Source> for OdmSource {
    fn from(source: Source) -> Self {
        match source {
            Source::StudyEvents => OdmSource::StudyEvents,
            Source::Forms => OdmSource::Forms,
            Source::ItemGroups => OdmSource::ItemGroups,
            Source::Items => OdmSource::Items,
            Source::Conditions => OdmSource::Conditions,
            Source::VendorNamespaces => OdmSource::VendorNamespaces,
            Source::VendorAttributes => OdmSource::VendorAttributes,
            Source::VendorElements => OdmSource::VendorElements,
        }
    }
}

impl From<Export> for ExportFormat {
    fn from(format: Export) -> Self {
        match format {
            Export::Xml => ExportFormat::Xml,
            Export::Pdf => ExportFormat::Pdf,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

/// Parse a `key=value` pair
fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("sort_by={\"name\":true}").unwrap(),
            ("sort_by".to_string(), "{\"name\":true}".to_string())
        );
        assert_eq!(parse_key_value("q=").unwrap(), ("q".to_string(), String::new()));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_get_accepts_negative_page_size() {
        let cli = Cli::parse_from(["studybuilder", "get", "concepts/odms/forms", "--page-size", "-1"]);
        match cli.command {
            Commands::Get(args) => assert_eq!(args.page_size, Some(-1)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_crfs_target_parsing() {
        let cli = Cli::parse_from(["studybuilder", "crfs", "approve", "item-groups", "OdmItemGroup_000001"]);
        match cli.command {
            Commands::Crfs(CrfsArgs {
                action: CrfsAction::Approve(target),
            }) => {
                assert_eq!(OdmSource::from(target.source), OdmSource::ItemGroups);
                assert_eq!(target.uid, "OdmItemGroup_000001");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_crfs_export_parsing() {
        let cli = Cli::parse_from([
            "studybuilder",
            "crfs",
            "export",
            "OdmForm_000001",
            "--library-version",
            "1.0",
            "--namespace",
            "OdmVendorNamespace_000001",
            "--format",
            "pdf",
        ]);
        match cli.command {
            Commands::Crfs(CrfsArgs {
                action: CrfsAction::Export(export),
            }) => {
                assert_eq!(export.target_uids, vec!["OdmForm_000001".to_string()]);
                assert_eq!(export.library_version.as_deref(), Some("1.0"));
                assert_eq!(export.allowed_namespaces, vec!["OdmVendorNamespace_000001".to_string()]);
                assert_eq!(ExportFormat::from(export.format), ExportFormat::Pdf);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_command_tree_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_source_names_match_api_paths() {
        for source in Source::value_variants() {
            let name = source.to_possible_value().unwrap().get_name().to_string();
            assert_eq!(OdmSource::from(*source).as_str(), name);
        }
    }
}
