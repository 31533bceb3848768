//! `cinfo broadcast [--dry-run]`: one scheduled report, for cron.

use anyhow::Result;
use cinfo_core::factory;
use cinfo_core::Credentials;
use cinfo_types::config::AppConfig;
use cinfo_utils::output::{render, OutputFormat};
use tracing::info;

pub async fn run(config: &AppConfig, dry_run: bool, fmt: OutputFormat) -> Result<()> {
    let creds = Credentials::from_env();

    if dry_run {
        let summary = factory::build_summary(config, &creds)?;
        return render(fmt, &summary.broadcast_report().await);
    }

    let dispatcher = factory::build_dispatcher(config, &creds)?;
    let targets = dispatcher.broadcast_targets().len();
    let delivered = dispatcher.broadcast().await;
    info!(delivered, targets, "broadcast command done");
    println!("delivered to {delivered}/{targets} targets");
    Ok(())
}
