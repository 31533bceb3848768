//! Provider traits: every module implements one or more of these.
//!
//! This is the contract between core and modules. The summary builder
//! only ever calls through these traits, never on a concrete client.
//!
//! Provider methods return records, not `Result`s: a failed upstream call
//! is logged inside the module and surfaces as an empty-shaped record.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::CinfoResult;
use crate::types::*;

/// Something that holds assets and can price them in JPY.
/// Implemented by the exchange and by every chain wallet.
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Display name, e.g. `coincheck` or `optimism`.
    fn name(&self) -> &str;

    /// Assets this provider reports, in display order.
    fn assets(&self) -> Vec<String>;

    /// Key to pass to [`BalanceProvider::get_rate`] for an asset, or
    /// `None` when the asset is fiat or cannot be priced here.
    fn rate_key(&self, asset: &str) -> Option<String>;

    /// Current holdings. Every asset of [`BalanceProvider::assets`] is present.
    async fn get_balance(&self) -> ProviderRecord<Balance>;

    /// JPY price for a pair or token. Zero when unknown or unavailable.
    async fn get_rate(&self, key: &str) -> ProviderRecord<Rate>;
}

/// Exchange-only reads: executed trades and market tickers.
#[async_trait]
pub trait TradeHistory: Send + Sync {
    /// Executed trades in provider order (newest first for Coincheck).
    async fn get_transaction_log(&self) -> ProviderRecord<Vec<TransactionLogEntry>>;

    /// 24h high/low/volume for a pair.
    async fn get_ticker(&self, pair: &str) -> ProviderRecord<Ticker>;
}

/// A full exchange backend.
pub trait ExchangeProvider: BalanceProvider + TradeHistory {}

impl<T: BalanceProvider + TradeHistory> ExchangeProvider for T {}

/// Symbol → JPY price source for providers without native fiat prices.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Name of the price source, e.g. `coinmarketcap`.
    fn source_name(&self) -> &str;

    /// JPY price for a token symbol, `None` when unavailable.
    async fn get_rate(&self, symbol: &str) -> Option<Decimal>;
}

/// Outbound chat transport.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Channel identifier, e.g. `line`.
    fn channel(&self) -> &str;

    /// Answer an inbound message.
    async fn reply(&self, reply_token: &str, text: &str) -> CinfoResult<()>;

    /// Send an unsolicited message to a user or group.
    async fn push(&self, to: &str, text: &str) -> CinfoResult<()>;
}
