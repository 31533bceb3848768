//! `cinfo balance|history|rate|ticker`: print one report.

use anyhow::{bail, Result};
use cinfo_common::constants::COINCHECK_PAIRS;
use cinfo_core::factory;
use cinfo_core::Credentials;
use cinfo_types::config::AppConfig;
use cinfo_utils::output::{render, OutputFormat};

pub enum ReportKind {
    Balance,
    History,
    Rate,
    Ticker(String),
}

pub async fn run(kind: ReportKind, config: &AppConfig, fmt: OutputFormat) -> Result<()> {
    if let ReportKind::Ticker(pair) = &kind {
        if !COINCHECK_PAIRS.contains(&pair.as_str()) {
            bail!("unknown pair {pair}, expected one of: {}", COINCHECK_PAIRS.join(", "));
        }
    }

    let summary = factory::build_summary(config, &Credentials::from_env())?;
    let report = match kind {
        ReportKind::Balance => summary.balance_report().await,
        ReportKind::History => summary.transaction_report().await,
        ReportKind::Rate => summary.rate_report().await,
        ReportKind::Ticker(pair) => summary.ticker_report(&pair).await,
    };
    render(fmt, &report)
}
