//! Output formatting for handler results.

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use wafguard::{AccessResponse, RecordOutcome};

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Short colored summary
    #[default]
    Pretty,
    /// The handler's JSON payload
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Render an access response.
pub fn access(format: OutputFormat, response: &AccessResponse) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(response)?,
        OutputFormat::Pretty => format!("{} {}", status(response.status_code), response.body),
    })
}

/// Render a retention outcome.
pub fn retention(format: OutputFormat, outcome: &RecordOutcome) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(outcome)?,
        OutputFormat::Pretty => match outcome {
            RecordOutcome::Recorded(entry) => format!(
                "{} {} ({} addresses) for {} min, expires at {}",
                "Recorded:".green().bold(),
                entry.ip_set_name.cyan(),
                entry.ip_address_list.len(),
                entry.retention_minutes,
                entry
                    .expires_at()
                    .map_or_else(|| entry.expiration_time.to_string(), |at| at.to_rfc3339())
            ),
            RecordOutcome::Skipped { message, .. } => {
                format!("{} {message}", "Skipped:".yellow().bold())
            }
        },
    })
}

fn status(code: u16) -> colored::ColoredString {
    let text = code.to_string();
    if code < 400 {
        text.green().bold()
    } else {
        text.red().bold()
    }
}
