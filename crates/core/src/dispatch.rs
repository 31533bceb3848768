//! Dispatcher: inbound text → command → report → messenger.
//!
//! Every report is bounded by one overall timeout. Delivery failures are
//! logged with the platform's per-field details; a failed reply gets one
//! generic fallback reply, a failed or timed-out broadcast is only logged.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use cinfo_common::error::CinfoError;
use cinfo_common::traits::Messenger;

use crate::command::{Command, GENERIC_ERROR_REPLY, HELP_TEXT, TEST_REPLY, UNRECOGNIZED_REPLY};
use crate::summary::SummaryBuilder;

const DEFAULT_REPORT_TIMEOUT: Duration = Duration::from_secs(25);

pub struct Dispatcher {
    summary: Arc<SummaryBuilder>,
    messenger: Arc<dyn Messenger>,
    broadcast_targets: Vec<String>,
    report_timeout: Duration,
    reply_unrecognized: bool,
}

impl Dispatcher {
    pub fn new(summary: Arc<SummaryBuilder>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            summary,
            messenger,
            broadcast_targets: Vec::new(),
            report_timeout: DEFAULT_REPORT_TIMEOUT,
            reply_unrecognized: false,
        }
    }

    pub fn with_broadcast_targets(mut self, targets: Vec<String>) -> Self {
        self.broadcast_targets = targets;
        self
    }

    pub fn with_report_timeout(mut self, timeout: Duration) -> Self {
        self.report_timeout = timeout;
        self
    }

    pub fn with_reply_unrecognized(mut self, reply: bool) -> Self {
        self.reply_unrecognized = reply;
        self
    }

    pub fn summary(&self) -> &Arc<SummaryBuilder> {
        &self.summary
    }

    pub fn broadcast_targets(&self) -> &[String] {
        &self.broadcast_targets
    }

    /// Reply text for a command, `None` when the bot stays silent.
    pub async fn respond(&self, command: &Command) -> Option<String> {
        let text = match command {
            Command::Balance => self.reply_text(self.summary.build_balance_summary()).await,
            Command::History => self.reply_text(self.summary.build_transaction_summary()).await,
            Command::Rate => self.reply_text(self.summary.build_rate_summary()).await,
            Command::Help => HELP_TEXT.to_string(),
            Command::Test => TEST_REPLY.to_string(),
            Command::Unrecognized(text) => {
                if !self.reply_unrecognized {
                    debug!(text = %text, "unrecognized command ignored");
                    return None;
                }
                UNRECOGNIZED_REPLY.to_string()
            }
        };
        Some(text)
    }

    /// Handle one inbound text message. Returns whether a reply went out.
    pub async fn handle_text(&self, reply_token: &str, text: &str) -> bool {
        let command = Command::parse(text);
        info!(command = command.name(), channel = self.messenger.channel(), "command received");

        let Some(reply) = self.respond(&command).await else {
            return false;
        };

        match self.messenger.reply(reply_token, &reply).await {
            Ok(()) => true,
            Err(e) => {
                log_delivery_error(&e);
                if let Err(e) = self.messenger.reply(reply_token, GENERIC_ERROR_REPLY).await {
                    warn!(error = %e, "fallback reply failed");
                }
                false
            }
        }
    }

    /// Push the combined balance and rate report to every target.
    /// Returns how many targets received it. Nothing is propagated.
    pub async fn broadcast(&self) -> usize {
        if self.broadcast_targets.is_empty() {
            info!("no broadcast targets configured, skipping");
            return 0;
        }

        let Some(text) = self.bounded(self.summary.build_broadcast()).await else {
            warn!(targets = self.broadcast_targets.len(), "broadcast skipped");
            return 0;
        };
        let mut delivered = 0;
        for target in &self.broadcast_targets {
            match self.messenger.push(target, &text).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(target = %target, "broadcast push failed");
                    log_delivery_error(&e);
                }
            }
        }

        info!(delivered, targets = self.broadcast_targets.len(), "broadcast finished");
        delivered
    }

    /// Report text, or the generic error text when the report times out.
    async fn reply_text<F>(&self, report: F) -> String
    where
        F: Future<Output = String>,
    {
        self.bounded(report)
            .await
            .unwrap_or_else(|| GENERIC_ERROR_REPLY.to_string())
    }

    async fn bounded<F>(&self, report: F) -> Option<String>
    where
        F: Future<Output = String>,
    {
        match tokio::time::timeout(self.report_timeout, report).await {
            Ok(text) => Some(text),
            Err(_) => {
                error!(timeout_ms = self.report_timeout.as_millis() as u64, "report timed out");
                None
            }
        }
    }
}

/// Log a messaging failure, one line per platform detail.
pub fn log_delivery_error(e: &CinfoError) {
    match e {
        CinfoError::Delivery {
            status,
            message,
            details,
        } => {
            error!(status, message = %message, "messaging API error");
            for detail in details {
                error!(detail = %detail, "messaging API error detail");
            }
        }
        other => error!(error = %other, "message delivery failed"),
    }
}
