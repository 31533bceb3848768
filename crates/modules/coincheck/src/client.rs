//! Coincheck REST client: balance, rate, transaction log, ticker.
//!
//! Every request is signed (see [`crate::signing`]) and attempted once.
//! Transport errors, non-2xx answers, `"success": false` bodies and shape
//! mismatches are logged and degrade to the empty record for the call.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, info, warn};

use cinfo_common::constants::{
    COINCHECK_BASE_URL, COINCHECK_PAIRS, FIAT, HTTP_TIMEOUT_SECS, PROVIDER_COINCHECK,
};
use cinfo_common::error::{CinfoError, CinfoResult};
use cinfo_common::json::{decimal_field, decimal_value, string_field};
use cinfo_common::traits::{BalanceProvider, TradeHistory};
use cinfo_common::types::*;

use crate::signing::{self, NonceSource, HEADER_KEY, HEADER_NONCE, HEADER_SIGNATURE};

/// Balance keys that describe locked or lent funds rather than holdings.
const BOOKKEEPING_SUFFIXES: &[&str] = &["_reserved", "_lend_in_use", "_lent", "_debt", "_tsumitate"];

/// Authenticated Coincheck client.
pub struct CoincheckClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    nonces: NonceSource,
}

impl CoincheckClient {
    pub fn new(api_key: &str, api_secret: &str) -> CinfoResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| CinfoError::Config(format!("Failed to build HTTP client: {e}")))?;

        info!(provider = PROVIDER_COINCHECK, "Coincheck client initialized");

        Ok(Self {
            http,
            base_url: COINCHECK_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            nonces: NonceSource::new(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn is_supported_pair(pair: &str) -> bool {
        COINCHECK_PAIRS.contains(&pair)
    }

    fn ensure_supported(pair: &str) -> CinfoResult<()> {
        if Self::is_supported_pair(pair) {
            Ok(())
        } else {
            Err(CinfoError::UnknownPair(pair.to_string()))
        }
    }

    /// Fiat first, then the base asset of every supported pair.
    pub fn known_assets() -> Vec<String> {
        let suffix = format!("_{FIAT}");
        std::iter::once(FIAT.to_string())
            .chain(
                COINCHECK_PAIRS
                    .iter()
                    .filter_map(|p| p.strip_suffix(suffix.as_str()))
                    .map(str::to_string),
            )
            .collect()
    }

    /// Signed GET of `path` (may carry a query string). The signed URL is
    /// byte-for-byte the requested one.
    async fn signed_get(&self, path: &str) -> CinfoResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let nonce = self.nonces.next();
        let signature = signing::sign(&self.api_secret, &nonce, &url, "")?;

        let resp = self
            .http
            .get(&url)
            .header(HEADER_KEY, &self.api_key)
            .header(HEADER_NONCE, &nonce)
            .header(HEADER_SIGNATURE, signature)
            .send()
            .await
            .map_err(|e| CinfoError::Network(format!("Coincheck request failed: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| CinfoError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(CinfoError::Protocol {
                provider: PROVIDER_COINCHECK.into(),
                message: format!("HTTP {status}: {text}"),
            });
        }

        let parsed: Value = serde_json::from_str(&text)
            .map_err(|e| CinfoError::Parse(format!("Coincheck response: {e}")))?;

        if parsed.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(CinfoError::Protocol {
                provider: PROVIDER_COINCHECK.into(),
                message: string_field(&parsed, "error"),
            });
        }

        debug!(provider = PROVIDER_COINCHECK, path, body = %parsed, "response received");
        Ok(parsed)
    }

    /// Allow-list check first: an unknown pair never reaches the network.
    async fn fetch_rate(&self, pair: &str) -> CinfoResult<Rate> {
        Self::ensure_supported(pair)?;
        let body = self.signed_get(&format!("/api/rate/{pair}")).await?;
        parse_rate(&body, pair)
    }

    async fn fetch_ticker(&self, pair: &str) -> CinfoResult<Ticker> {
        Self::ensure_supported(pair)?;
        let body = self.signed_get(&format!("/api/ticker?pair={pair}")).await?;
        parse_ticker(&body, pair)
    }
}

// ── Response normalization ──────────────────────────────────────────

/// `{"success": true, "jpy": "0.84", "btc": "7.75", "jpy_reserved": "3000.0", ...}`
pub fn parse_balance(val: &Value) -> CinfoResult<Balance> {
    let obj = val
        .as_object()
        .ok_or_else(|| CinfoError::Parse("balance response is not an object".into()))?;

    let mut balance = Balance::zeroed(CoincheckClient::known_assets());
    for (key, raw) in obj {
        if key == "success" || BOOKKEEPING_SUFFIXES.iter().any(|s| key.ends_with(s)) {
            continue;
        }
        if let Some(amount) = decimal_value(raw) {
            balance.set(key.clone(), amount);
        }
    }
    Ok(balance)
}

/// `{"rate": "5000000.0"}`
pub fn parse_rate(val: &Value, pair: &str) -> CinfoResult<Rate> {
    decimal_field(val, "rate")
        .map(|price| Rate::new(pair, price))
        .ok_or_else(|| CinfoError::Parse(format!("rate response for {pair} has no rate")))
}

/// `{"success": true, "transactions": [{ "created_at", "funds", "pair", "fee_currency", "fee", "side", ... }]}`
///
/// Malformed entries are skipped; the rest keep the provider's order.
pub fn parse_transactions(val: &Value) -> CinfoResult<Vec<TransactionLogEntry>> {
    let items = val
        .get("transactions")
        .and_then(Value::as_array)
        .ok_or_else(|| CinfoError::Parse("transaction response has no transactions".into()))?;

    Ok(items
        .iter()
        .filter_map(|item| match parse_transaction(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(provider = PROVIDER_COINCHECK, error = %e, "skipping transaction");
                None
            }
        })
        .collect())
}

fn parse_transaction(item: &Value) -> CinfoResult<TransactionLogEntry> {
    let funds = item
        .get("funds")
        .and_then(Value::as_object)
        .map(|m| {
            m.iter()
                .filter_map(|(currency, v)| decimal_value(v).map(|d| (currency.clone(), d)))
                .collect()
        })
        .unwrap_or_default();

    let order_type = string_field(item, "side")
        .parse::<OrderType>()
        .map_err(CinfoError::Parse)?;

    Ok(TransactionLogEntry {
        date: string_field(item, "created_at"),
        funds,
        pair: string_field(item, "pair"),
        fee_currency: string_field(item, "fee_currency"),
        fee: decimal_field(item, "fee").unwrap_or(Decimal::ZERO),
        order_type,
    })
}

/// `{"last": 27390, "high": 31900, "low": 27330, "volume": "13522.4", "timestamp": 1423377841, ...}`
pub fn parse_ticker(val: &Value, pair: &str) -> CinfoResult<Ticker> {
    let field = |name: &str| {
        decimal_field(val, name).ok_or_else(|| CinfoError::Parse(format!("ticker for {pair} has no {name}")))
    };
    let timestamp = val
        .get("timestamp")
        .and_then(Value::as_i64)
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

    Ok(Ticker {
        pair: pair.to_string(),
        high: field("high")?,
        low: field("low")?,
        volume: field("volume")?,
        timestamp,
    })
}

// ── Provider traits ─────────────────────────────────────────────────

#[async_trait]
impl BalanceProvider for CoincheckClient {
    fn name(&self) -> &str {
        PROVIDER_COINCHECK
    }

    fn assets(&self) -> Vec<String> {
        Self::known_assets()
    }

    fn rate_key(&self, asset: &str) -> Option<String> {
        let pair = format!("{asset}_{FIAT}");
        Self::is_supported_pair(&pair).then_some(pair)
    }

    async fn get_balance(&self) -> ProviderRecord<Balance> {
        let result = self
            .signed_get("/api/accounts/balance")
            .await
            .and_then(|v| parse_balance(&v));

        let balance = match result {
            Ok(balance) => balance,
            Err(e) => {
                warn!(provider = PROVIDER_COINCHECK, error = %e, "balance fetch failed");
                Balance::zeroed(Self::known_assets())
            }
        };
        ProviderRecord::new(PROVIDER_COINCHECK, RecordKind::Balance, balance)
    }

    async fn get_rate(&self, pair: &str) -> ProviderRecord<Rate> {
        let rate = self.fetch_rate(pair).await.unwrap_or_else(|e| {
            warn!(provider = PROVIDER_COINCHECK, pair, error = %e, "rate fetch failed");
            Rate::empty(pair)
        });
        ProviderRecord::new(PROVIDER_COINCHECK, RecordKind::Rate, rate)
    }
}

#[async_trait]
impl TradeHistory for CoincheckClient {
    async fn get_transaction_log(&self) -> ProviderRecord<Vec<TransactionLogEntry>> {
        let result = self
            .signed_get("/api/exchange/orders/transactions")
            .await
            .and_then(|v| parse_transactions(&v));

        let entries = match result {
            Ok(entries) => entries,
            Err(e) => {
                warn!(provider = PROVIDER_COINCHECK, error = %e, "transaction log fetch failed");
                Vec::new()
            }
        };
        ProviderRecord::new(PROVIDER_COINCHECK, RecordKind::TransactionLog, entries)
    }

    async fn get_ticker(&self, pair: &str) -> ProviderRecord<Ticker> {
        let ticker = self.fetch_ticker(pair).await.unwrap_or_else(|e| {
            warn!(provider = PROVIDER_COINCHECK, pair, error = %e, "ticker fetch failed");
            Ticker::empty(pair)
        });
        ProviderRecord::new(PROVIDER_COINCHECK, RecordKind::Ticker, ticker)
    }
}
