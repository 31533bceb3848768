//! Unified output rendering: chat text or JSON.
//!
//! Usage:
//! ```ignore
//! use cinfo_utils::output::{OutputFormat, render};
//!
//! let report = summary.balance_report().await;
//! render(format, &report)?;
//! ```

use anyhow::Result;

use cinfo_types::report::Report;

use crate::format::render_report;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Exactly the text the bot would send (default).
    Text,
    /// Compact JSON of the report lines (for piping to jq, scripts).
    Json,
    /// Pretty-printed JSON (for reading).
    JsonPretty,
}

/// Render a report to a string in the requested format.
pub fn to_string(format: OutputFormat, report: &Report) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => render_report(report),
        OutputFormat::Json => serde_json::to_string(report)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(report)?,
    })
}

/// Print a report to stdout in the requested format.
pub fn render(format: OutputFormat, report: &Report) -> Result<()> {
    println!("{}", to_string(format, report)?);
    Ok(())
}
