//! Output formatting and writing utilities
//!
//! Results go to stdout in the selected format. Notifications raised by
//! the gateway are rendered to stderr so they never mix with machine output.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use std::time::Duration;
use studybuilder_core::{Notification, NotificationKind};
use tracing::trace;

/// Keys shown as the identifying column of a listing row, in priority order
const LABEL_KEYS: [&str; 4] = ["name", "label", "sponsor_preferred_name", "code_submission_value"];

/// Trait for formatting output
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format an API payload, rendering listings as tables for humans
    fn format_payload(&self, value: &Value) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_payload(&self, value: &Value) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_payload_human(value)),
            _ => self.format(value),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
    err_writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a writer over stdout and stderr
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, progress: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: progress && !quiet && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
            err_writer: Box::new(io::stderr()),
        }
    }

    /// Create an output writer with custom sinks
    pub fn with_writers(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
        err_writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            show_progress: false,
            quiet,
            writer,
            err_writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write binary content untouched
    pub fn bytes(&mut self, content: &[u8]) -> Result<()> {
        self.writer.write_all(content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        self.emit(&formatted)
    }

    /// Write an API payload in the configured format
    pub fn payload(&mut self, value: &Value) -> Result<()> {
        let mut redacted = value.clone();
        redaction::redact_json_value(&mut redacted);
        trace!(payload = %redacted, "Writing payload");

        let formatted = self.format.format_payload(value)?;
        self.emit(&formatted)
    }

    fn emit(&mut self, formatted: &str) -> Result<()> {
        if formatted.ends_with('\n') {
            self.write(formatted)
        } else {
            self.writeln(formatted)
        }
    }

    /// Render queued notifications to the error stream
    ///
    /// Notifications are printed even in quiet mode; they carry the reason
    /// a command failed.
    pub fn notifications(&mut self, notifications: &[Notification]) -> Result<()> {
        for notification in notifications {
            let line = render_notification(notification, self.use_color);
            writeln!(self.err_writer, "{}", line)?;
        }
        self.err_writer.flush()?;
        Ok(())
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(default_spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        let rendered = render_table(headers, &rows, self.use_color);
        self.write(&rendered)
    }
}

/// Helper function to create a spinner style
pub fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// One notification as a single line
pub fn render_notification(notification: &Notification, use_color: bool) -> String {
    let tag = match notification.kind {
        NotificationKind::Success => "success",
        NotificationKind::Info => "info",
        NotificationKind::Warning => "warning",
        NotificationKind::Error => "error",
    };

    let mut line = if use_color {
        let tag = match notification.kind {
            NotificationKind::Success => tag.green().bold(),
            NotificationKind::Info => tag.blue().bold(),
            NotificationKind::Warning => tag.yellow().bold(),
            NotificationKind::Error => tag.red().bold(),
        };
        let message = match notification.kind {
            NotificationKind::Error => notification.message.red(),
            _ => notification.message.normal(),
        };
        format!("[{}] {}", tag, message)
    } else {
        format!("[{}] {}", tag, notification.message)
    };

    if let Some(correlation_id) = notification
        .error
        .as_ref()
        .and_then(|detail| detail.correlation_id.as_deref())
    {
        line.push_str(&format!(" (correlation id: {})", correlation_id));
    }
    line
}

/// Render a listing or a single object for a terminal
fn format_payload_human(value: &Value) -> String {
    match value {
        Value::Object(map) => match map.get("items") {
            Some(Value::Array(items)) => {
                let mut out = render_rows(items);
                let total = map.get("total").and_then(Value::as_u64).unwrap_or(0);
                if total > 0 {
                    out.push_str(&format!("{} of {} shown\n", items.len(), total));
                } else {
                    out.push_str(&format!("{} shown\n", items.len()));
                }
                out
            }
            _ => serde_json::to_string_pretty(value).unwrap_or_default(),
        },
        Value::Array(items) => render_rows(items),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn render_rows(items: &[Value]) -> String {
    if items.is_empty() {
        return "No results\n".to_string();
    }
    let rows: Vec<Vec<String>> = items.iter().map(row_cells).collect();
    render_table(&["UID", "NAME", "STATUS", "VERSION"], &rows, false)
}

/// Identifying cells of a listing row
fn row_cells(item: &Value) -> Vec<String> {
    let text = |v: Option<&Value>| match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let uid = item
        .as_object()
        .and_then(|map| {
            map.iter()
                .find(|(key, value)| (key.as_str() == "uid" || key.ends_with("_uid")) && value.is_string())
                .map(|(_, value)| value)
        });
    let label = LABEL_KEYS.iter().find_map(|key| item.get(*key).filter(|v| !v.is_null()));

    vec![
        text(uid),
        text(label),
        text(item.get("status")),
        text(item.get("version")),
    ]
}

fn render_table(headers: &[&str], rows: &[Vec<String>], use_color: bool) -> String {
    let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let join = |cells: Vec<String>| cells.join(" │ ").trim_end().to_string();

    let header_row = join(
        headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect(),
    );

    let mut out = String::new();
    if use_color {
        out.push_str(&header_row.bold().to_string());
    } else {
        out.push_str(&header_row);
    }
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─"),
    );
    out.push('\n');

    for row in rows {
        out.push_str(&join(
            row.iter()
                .enumerate()
                .map(|(i, cell)| match widths.get(i) {
                    Some(width) => format!("{:width$}", cell, width = width),
                    None => cell.clone(),
                })
                .collect(),
        ));
        out.push('\n');
    }
    out
}
