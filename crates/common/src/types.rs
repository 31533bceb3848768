//! Normalized records shared across all provider modules.
//!
//! Every provider maps its raw JSON into these types. The summary builder
//! and the binaries consume only these, never provider-specific shapes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

/// Which logical query produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Balance,
    Rate,
    TransactionLog,
    Ticker,
}

/// Result of one provider call. Lives for a single report generation.
///
/// A failed call still yields a record: the payload is the empty shape
/// for its kind and `provider_name` is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord<T> {
    pub provider_name: String,
    pub kind: RecordKind,
    pub payload: T,
}

impl<T> ProviderRecord<T> {
    pub fn new(provider_name: impl Into<String>, kind: RecordKind, payload: T) -> Self {
        Self {
            provider_name: provider_name.into(),
            kind,
            payload,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  BALANCE
// ═══════════════════════════════════════════════════════════════════════

/// Asset symbol → amount held.
///
/// Lookups never fail: an absent symbol reads as zero, so formatting code
/// can ask for any asset regardless of what the provider returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    amounts: BTreeMap<String, Decimal>,
}

impl Balance {
    /// A balance holding zero of every given symbol.
    pub fn zeroed<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            amounts: symbols
                .into_iter()
                .map(|s| (s.into(), Decimal::ZERO))
                .collect(),
        }
    }

    pub fn get(&self, symbol: &str) -> Decimal {
        self.amounts.get(symbol).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn set(&mut self, symbol: impl Into<String>, amount: Decimal) {
        self.amounts.insert(symbol.into(), amount);
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.amounts.contains_key(symbol)
    }

    /// Fold another balance into this one; the other side wins on overlap.
    pub fn merge(&mut self, other: Balance) {
        self.amounts.extend(other.amounts);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.amounts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  RATE / TICKER
// ═══════════════════════════════════════════════════════════════════════

/// Fiat price of one pair (`btc_jpy`) or token (`WLD`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    /// Pair or token identifier the price belongs to.
    pub key: String,
    /// JPY per unit. Never negative; zero when unavailable.
    pub price: Decimal,
}

impl Rate {
    pub fn new(key: impl Into<String>, price: Decimal) -> Self {
        Self {
            key: key.into(),
            price: price.max(Decimal::ZERO),
        }
    }

    /// The zero-priced rate used when a fetch fails.
    pub fn empty(key: impl Into<String>) -> Self {
        Self::new(key, Decimal::ZERO)
    }

    pub fn is_available(&self) -> bool {
        !self.price.is_zero()
    }
}

/// OHLC-style 24h summary for one exchange pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub pair: String,
    pub high: Decimal,
    pub low: Decimal,
    pub volume: Decimal,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Ticker {
    pub fn empty(pair: impl Into<String>) -> Self {
        Self {
            pair: pair.into(),
            high: Decimal::ZERO,
            low: Decimal::ZERO,
            volume: Decimal::ZERO,
            timestamp: None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  TRANSACTION LOG
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Buy => write!(f, "buy"),
            OrderType::Sell => write!(f, "sell"),
        }
    }
}

impl std::str::FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(OrderType::Buy),
            "sell" => Ok(OrderType::Sell),
            other => Err(format!("unknown order side: {other}")),
        }
    }
}

/// One executed trade, kept in the order the provider returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLogEntry {
    /// Execution time as reported by the provider (RFC 3339).
    pub date: String,
    /// Currency → signed amount moved by this trade.
    pub funds: BTreeMap<String, Decimal>,
    pub pair: String,
    pub fee_currency: String,
    pub fee: Decimal,
    pub order_type: OrderType,
}

impl TransactionLogEntry {
    /// Signed JPY movement; zero when the trade moved no JPY.
    pub fn fiat_delta(&self) -> Decimal {
        self.funds
            .get(crate::constants::FIAT)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  TOKEN REGISTRY
// ═══════════════════════════════════════════════════════════════════════

/// Static description of an on-chain token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpec {
    pub symbol: String,
    pub contract_address: String,
    pub decimals: u32,
}

impl TokenSpec {
    pub fn new(symbol: &str, contract_address: &str, decimals: u32) -> Self {
        Self {
            symbol: symbol.to_string(),
            contract_address: contract_address.to_string(),
            decimals,
        }
    }

    /// Human-unit balance for a raw on-chain integer, `None` when the
    /// scaled amount does not fit a `Decimal`.
    pub fn scale(&self, raw: u128) -> Option<Decimal> {
        Decimal::from_u128(scale_balance(raw, self.decimals))
    }
}

/// `floor(raw / 10^decimals)`.
///
/// Integer-truncating on purpose: fractional token amounts are dropped.
/// A divisor that overflows `u128` means the balance is below one unit.
pub fn scale_balance(raw: u128, decimals: u32) -> u128 {
    match 10u128.checked_pow(decimals) {
        Some(divisor) => raw / divisor,
        None => 0,
    }
}
