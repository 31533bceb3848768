mod commands;

use std::path::PathBuf;

use anyhow::Result;
use cinfo_common::constants::ENV_CONFIG_PATH;
use cinfo_utils::output::OutputFormat;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use commands::report::ReportKind;

#[derive(Parser)]
#[command(
    name = "cinfo",
    about = "Crypto Info: Coincheck and on-chain balances, trade history and JPY rates.\nPrints exactly what the LINE bot would send.",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file. Defaults to ~/.crypto-info/config.toml.
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG_PATH)]
    config: Option<PathBuf>,

    #[arg(long, short = 'o', global = true, default_value = "text")]
    output: CliOutputFormat,

    /// Log more (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Text,
    Json,
    JsonPretty,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> OutputFormat {
        match f {
            CliOutputFormat::Text => OutputFormat::Text,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Balances per provider with JPY subtotals and total.
    Balance,

    /// Executed Coincheck trades.
    History,

    /// JPY rates for the configured pairs and chain tokens.
    Rate,

    /// 24h high, low and volume for one Coincheck pair.
    Ticker {
        /// Pair such as btc_jpy.
        pair: String,
    },

    /// Push the balance and rate report to every broadcast target.
    Broadcast {
        /// Print the report instead of sending it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Check config file, credentials and chain setup.
    Doctor {
        /// Write a default config file if none exists.
        #[arg(long)]
        init: bool,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let fmt: OutputFormat = cli.output.into();
    let config_path = cinfo_core::workspace::resolve_config_path(cli.config.as_deref())?;

    let load = || cinfo_core::workspace::load_config(&config_path);

    match cli.command {
        Commands::Balance => commands::report::run(ReportKind::Balance, &load()?, fmt).await,
        Commands::History => commands::report::run(ReportKind::History, &load()?, fmt).await,
        Commands::Rate => commands::report::run(ReportKind::Rate, &load()?, fmt).await,
        Commands::Ticker { pair } => {
            commands::report::run(ReportKind::Ticker(pair), &load()?, fmt).await
        }
        Commands::Broadcast { dry_run } => commands::broadcast::run(&load()?, dry_run, fmt).await,
        Commands::Doctor { init } => commands::doctor::run(&config_path, init, fmt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ticker_with_global_flags() {
        let cli = Cli::try_parse_from(["cinfo", "ticker", "btc_jpy", "-o", "json", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.output, CliOutputFormat::Json));
        match cli.command {
            Commands::Ticker { pair } => assert_eq!(pair, "btc_jpy"),
            _ => panic!("expected ticker"),
        }
    }

    #[test]
    fn test_parse_broadcast_dry_run() {
        let cli = Cli::try_parse_from(["cinfo", "broadcast", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Commands::Broadcast { dry_run: true }));
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["cinfo", "trade"]).is_err());
    }
}
