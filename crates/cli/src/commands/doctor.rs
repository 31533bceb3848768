//! `cinfo doctor [--init]`: configuration and credential checks.

use std::path::Path;

use anyhow::Result;
use cinfo_core::workspace::{load_config, write_default_config};
use cinfo_core::Credentials;
use cinfo_types::report::Report;
use cinfo_utils::output::{render, OutputFormat};

pub fn run(config_path: &Path, init: bool, fmt: OutputFormat) -> Result<()> {
    let created = init && write_default_config(config_path)?;
    let report = build_report(config_path, &Credentials::from_env(), created);
    render(fmt, &report)
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "✓ set"
    } else {
        "✗ missing"
    }
}

pub fn build_report(config_path: &Path, creds: &Credentials, created: bool) -> Report {
    let mut report = Report::new("Doctor");

    report
        .section("Config")
        .entry("Path", config_path.display().to_string());

    let config = match load_config(config_path) {
        Ok(config) => {
            let state = match (created, config_path.exists()) {
                (true, _) => "✓ created with defaults",
                (false, true) => "✓ ok",
                (false, false) => "- not found, using defaults (run with --init)",
            };
            report.entry("Status", state);
            Some(config)
        }
        Err(e) => {
            report.entry("Status", format!("✗ {e:#}"));
            None
        }
    };

    report.section("Credentials");
    for (var, set) in creds.status() {
        report.entry(var, mark(set));
    }

    let Some(config) = config else {
        return report;
    };

    report.section("Chains");
    let mut any_chain = false;
    for chain in config.active_chains() {
        any_chain = true;
        let symbols: Vec<&str> = chain.tokens.iter().map(|t| t.symbol.as_str()).collect();
        let wallet = match (&chain.wallet_address, &creds.wallet_address) {
            (Some(addr), _) => addr.clone(),
            (None, Some(addr)) => format!("{addr} (from environment)"),
            (None, None) => "✗ missing".to_string(),
        };
        report.entry(
            chain.name.clone(),
            format!("{} via {}", symbols.join(", "), chain.explorer_url),
        );
        report.entry("  wallet", wallet);
    }
    if !any_chain {
        report.text("none configured");
    }

    let interval = config
        .server
        .broadcast_interval_secs
        .map(|s| format!("every {s}s"))
        .unwrap_or_else(|| "off (use cron + `cinfo broadcast`)".to_string());
    report
        .section("Bot")
        .entry("Bind", config.server.bind.clone())
        .entry("Rate pairs", config.coincheck.rate_pairs.join(", "))
        .entry(
            "Broadcast targets",
            config.line.broadcast_targets.len().to_string(),
        )
        .entry("Broadcast interval", interval)
        .entry(
            "Unknown commands",
            if config.server.reply_unrecognized {
                "reply"
            } else {
                "ignore"
            },
        );

    report
}
