//! `wafguard config` - show the resolved configuration.

use anyhow::Result;
use colored::Colorize;
use wafguard::retention::RetentionWindow;

use super::Context;
use crate::output::OutputFormat;

pub fn execute(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    if ctx.output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    let unset = || "(not set)".dimmed().to_string();

    println!("{}", "Resolved Configuration:".bold());
    println!();
    println!("  {} {}", "scope:".bold(), config.scope);
    println!(
        "  {} {}",
        "store_url:".bold(),
        config.store_url.clone().unwrap_or_else(unset)
    );
    match &config.admission_sets {
        Some(sets) => {
            println!("  {} {}", "v4 set:".bold(), sets.v4);
            println!("  {} {}", "v6 set:".bold(), sets.v6);
        }
        None => println!("  {} {}", "admission sets:".bold(), unset()),
    }

    let retention = &config.retention;
    println!(
        "  {} {}",
        "allow-list retention:".bold(),
        describe(RetentionWindow::from_configured(retention.allowed_minutes))
    );
    println!(
        "  {} {}",
        "deny-list retention:".bold(),
        describe(RetentionWindow::from_configured(retention.denied_minutes))
    );
    println!("  {} {}", "allow-list marker:".bold(), retention.allow_list_marker);
    println!(
        "  {} {}",
        "reaper role:".bold(),
        retention.reaper_role_name.clone().unwrap_or_else(unset)
    );
    println!(
        "  {} {}",
        "ledger table:".bold(),
        retention.table_name.clone().unwrap_or_else(unset)
    );
    println!("  {} {}", "usage reports:".bold(), config.telemetry.enabled);

    Ok(())
}

fn describe(window: RetentionWindow) -> String {
    match window {
        RetentionWindow::Disabled => "disabled".to_string(),
        RetentionWindow::Minutes(minutes) => format!("{minutes} min"),
    }
}
