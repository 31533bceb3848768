//! Summary builder: fans out to the providers, converts to JPY, renders.
//!
//! Every report is built with strictly sequential awaits: one upstream
//! call at a time, in the order the lines appear. Providers never fail
//! (see [`cinfo_common::traits`]), so neither does any report.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use cinfo_common::constants::FIAT;
use cinfo_common::traits::{BalanceProvider, ExchangeProvider};
use cinfo_common::types::{Rate, TransactionLogEntry};
use cinfo_types::report::Report;
use cinfo_utils::format::{
    format_amount, format_datetime_jst, format_jpy, format_pair, format_price, format_signed,
    format_timestamp_jst, render_report,
};

use crate::convert::to_fiat;

/// Decimals shown for unit prices.
const PRICE_DP: u32 = 2;

const UNAVAILABLE: &str = "unavailable";

pub struct SummaryBuilder {
    exchange: Arc<dyn ExchangeProvider>,
    chains: Vec<Arc<dyn BalanceProvider>>,
    rate_pairs: Vec<String>,
}

impl SummaryBuilder {
    pub fn new(
        exchange: Arc<dyn ExchangeProvider>,
        chains: Vec<Arc<dyn BalanceProvider>>,
        rate_pairs: Vec<String>,
    ) -> Self {
        info!(
            exchange = exchange.name(),
            chains = chains.len(),
            rate_pairs = rate_pairs.len(),
            "summary builder ready"
        );
        Self {
            exchange,
            chains,
            rate_pairs,
        }
    }

    // ── Balance ─────────────────────────────────────────────────────

    /// Exchange holdings, then every chain wallet, each with a JPY
    /// subtotal, then the grand total.
    pub async fn balance_report(&self) -> Report {
        let mut report = Report::new("Balance");
        let mut total = self.exchange_balance(&mut report).await;

        for chain in &self.chains {
            report.blank();
            let subtotal = self.chain_balance(chain.as_ref(), &mut report).await;
            total = add_or_skip(total, subtotal, "total");
        }

        report
            .blank()
            .text(format!("Total: {} JPY", format_jpy(total)));
        report
    }

    /// JPY as held, plus every non-zero asset converted at the exchange's
    /// own rate.
    async fn exchange_balance(&self, report: &mut Report) -> Decimal {
        let record = self.exchange.get_balance().await;
        let balance = record.payload;
        let mut subtotal = balance.get(FIAT);

        report
            .section(record.provider_name)
            .entry(FIAT.to_uppercase(), format_jpy(subtotal));

        for (asset, amount) in balance.iter() {
            if asset == FIAT || amount.is_zero() {
                continue;
            }
            let value = match self.exchange.rate_key(asset) {
                Some(key) => {
                    let fiat = to_fiat(self.exchange.as_ref(), &key, amount).await;
                    subtotal = add_or_skip(subtotal, fiat, asset);
                    format!("{} ({} JPY)", format_amount(amount), format_jpy(fiat))
                }
                None => {
                    debug!(asset, "no JPY pair, left out of subtotal");
                    format_amount(amount)
                }
            };
            report.entry(asset.to_uppercase(), value);
        }

        report.entry("Subtotal", format!("{} JPY", format_jpy(subtotal)));
        subtotal
    }

    /// Every registry token, zero balances included.
    async fn chain_balance(&self, chain: &dyn BalanceProvider, report: &mut Report) -> Decimal {
        let record = chain.get_balance().await;
        let balance = record.payload;
        let mut subtotal = Decimal::ZERO;

        report.section(record.provider_name);
        for asset in chain.assets() {
            let amount = balance.get(&asset);
            let fiat = match chain.rate_key(&asset) {
                Some(key) => to_fiat(chain, &key, amount).await,
                None => Decimal::ZERO,
            };
            subtotal = add_or_skip(subtotal, fiat, &asset);
            report.entry(
                asset,
                format!("{} ({} JPY)", format_amount(amount), format_jpy(fiat)),
            );
        }

        report.entry("Subtotal", format!("{} JPY", format_jpy(subtotal)));
        subtotal
    }

    // ── History ─────────────────────────────────────────────────────

    /// Executed trades in provider order, unpaginated.
    pub async fn transaction_report(&self) -> Report {
        let record = self.exchange.get_transaction_log().await;
        let mut report = Report::new("History");
        report.section(record.provider_name);

        if record.payload.is_empty() {
            report.text("No transactions");
            return report;
        }

        for (i, entry) in record.payload.iter().enumerate() {
            if i > 0 {
                report.blank();
            }
            push_transaction(&mut report, entry);
        }
        report
    }

    // ── Rate ────────────────────────────────────────────────────────

    /// Configured exchange pairs, then every chain token.
    pub async fn rate_report(&self) -> Report {
        let mut report = Report::new("Rate");

        report.section(self.exchange.name());
        for pair in &self.rate_pairs {
            let rate = self.exchange.get_rate(pair).await.payload;
            report.entry(format_pair(pair), price_value(&rate));
        }

        for chain in &self.chains {
            report.section(chain.name());
            for asset in chain.assets() {
                let rate = match chain.rate_key(&asset) {
                    Some(key) => chain.get_rate(&key).await.payload,
                    None => Rate::empty(asset.as_str()),
                };
                report.entry(asset, price_value(&rate));
            }
        }
        report
    }

    // ── Ticker ──────────────────────────────────────────────────────

    pub async fn ticker_report(&self, pair: &str) -> Report {
        let record = self.exchange.get_ticker(pair).await;
        let ticker = record.payload;
        let mut report = Report::new(format!("Ticker {}", format_pair(pair)));
        report.section(record.provider_name);

        if ticker.high.is_zero() && ticker.low.is_zero() && ticker.volume.is_zero() {
            report.text(UNAVAILABLE);
            return report;
        }

        report
            .entry("High", format!("{} JPY", format_price(ticker.high, PRICE_DP)))
            .entry("Low", format!("{} JPY", format_price(ticker.low, PRICE_DP)))
            .entry("Volume", format_amount(ticker.volume));
        if let Some(ts) = ticker.timestamp {
            report.entry("Updated", format_datetime_jst(ts));
        }
        report
    }

    // ── Rendered ────────────────────────────────────────────────────

    pub async fn build_balance_summary(&self) -> String {
        render_report(&self.balance_report().await)
    }

    pub async fn build_transaction_summary(&self) -> String {
        render_report(&self.transaction_report().await)
    }

    pub async fn build_rate_summary(&self) -> String {
        render_report(&self.rate_report().await)
    }

    pub async fn build_ticker_summary(&self, pair: &str) -> String {
        render_report(&self.ticker_report(pair).await)
    }

    /// Balance summary, a blank line, then the rate summary.
    pub async fn broadcast_report(&self) -> Report {
        let mut report = self.balance_report().await;
        report.append(self.rate_report().await);
        report
    }

    pub async fn build_broadcast(&self) -> String {
        render_report(&self.broadcast_report().await)
    }
}

fn price_value(rate: &Rate) -> String {
    if rate.is_available() {
        format!("{} JPY", format_price(rate.price, PRICE_DP))
    } else {
        UNAVAILABLE.to_string()
    }
}

/// `acc + value`, or `acc` unchanged when the sum overflows.
fn add_or_skip(acc: Decimal, value: Decimal, what: &str) -> Decimal {
    acc.checked_add(value).unwrap_or_else(|| {
        warn!(what, value = %value, "sum overflows, amount left out");
        acc
    })
}

/// ```text
///   2015/11/18 16:02 BTC/JPY buy
///   JPY: -1000
///   BTC: +0.1
///   Fee: 0.6 JPY
/// ```
fn push_transaction(report: &mut Report, entry: &TransactionLogEntry) {
    report.text(format!(
        "{} {} {}",
        format_timestamp_jst(&entry.date),
        format_pair(&entry.pair),
        entry.order_type
    ));
    report.entry(FIAT.to_uppercase(), format_signed(entry.fiat_delta()));

    if let Some(base) = entry.pair.split('_').next().filter(|b| !b.is_empty() && *b != FIAT) {
        let delta = entry.funds.get(base).copied().unwrap_or(Decimal::ZERO);
        report.entry(base.to_uppercase(), format_signed(delta));
    }

    let fee = format_amount(entry.fee);
    let fee = if entry.fee_currency.is_empty() {
        fee
    } else {
        format!("{fee} {}", entry.fee_currency.to_uppercase())
    };
    report.entry("Fee", fee);
}
