//! Command implementations.

pub mod access;
pub mod config;
pub mod retention;

use anyhow::{Context as _, Result};
use serde::de::DeserializeOwned;
use tokio::io::AsyncReadExt;
use wafguard::GuardConfig;

use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Resolved handler configuration
    pub config: GuardConfig,

    /// Output format
    pub output_format: OutputFormat,
}

/// Read and decode a JSON event from a file, or from stdin when `source` is `-`.
pub async fn read_event<T: DeserializeOwned>(source: &str) -> Result<T> {
    let raw = if source == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("failed to read event from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("failed to read event file {source}"))?
    };

    serde_json::from_str(&raw).with_context(|| format!("malformed event in {source}"))
}
