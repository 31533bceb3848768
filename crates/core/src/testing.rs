//! In-memory providers and messenger for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use cinfo_common::error::{CinfoError, CinfoResult};
use cinfo_common::traits::{BalanceProvider, Messenger, TradeHistory};
use cinfo_common::types::*;

/// Exchange with `jpy`, `btc` and `eth`, priced through `{asset}_jpy`.
#[derive(Default)]
pub struct FakeExchange {
    balance: Balance,
    rates: HashMap<String, Decimal>,
    transactions: Vec<TransactionLogEntry>,
    delay: Option<Duration>,
    rate_calls: AtomicUsize,
}

impl FakeExchange {
    pub fn new() -> Self {
        Self {
            balance: Balance::zeroed(["jpy", "btc", "eth"]),
            ..Self::default()
        }
    }

    pub fn with_balance(mut self, asset: &str, amount: Decimal) -> Self {
        self.balance.set(asset, amount);
        self
    }

    pub fn with_rate(mut self, pair: &str, price: Decimal) -> Self {
        self.rates.insert(pair.to_string(), price);
        self
    }

    pub fn with_transaction(mut self, entry: TransactionLogEntry) -> Self {
        self.transactions.push(entry);
        self
    }

    /// Every balance call sleeps this long first.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn rate_calls(&self) -> usize {
        self.rate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BalanceProvider for FakeExchange {
    fn name(&self) -> &str {
        "coincheck"
    }

    fn assets(&self) -> Vec<String> {
        vec!["jpy".into(), "btc".into(), "eth".into()]
    }

    fn rate_key(&self, asset: &str) -> Option<String> {
        (asset != "jpy").then(|| format!("{asset}_jpy"))
    }

    async fn get_balance(&self) -> ProviderRecord<Balance> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        ProviderRecord::new("coincheck", RecordKind::Balance, self.balance.clone())
    }

    async fn get_rate(&self, key: &str) -> ProviderRecord<Rate> {
        self.rate_calls.fetch_add(1, Ordering::SeqCst);
        let price = self.rates.get(key).copied().unwrap_or(Decimal::ZERO);
        ProviderRecord::new("coincheck", RecordKind::Rate, Rate::new(key, price))
    }
}

#[async_trait]
impl TradeHistory for FakeExchange {
    async fn get_transaction_log(&self) -> ProviderRecord<Vec<TransactionLogEntry>> {
        ProviderRecord::new("coincheck", RecordKind::TransactionLog, self.transactions.clone())
    }

    async fn get_ticker(&self, pair: &str) -> ProviderRecord<Ticker> {
        let ticker = match self.rates.get(pair) {
            Some(price) => Ticker {
                pair: pair.to_string(),
                high: *price,
                low: *price,
                volume: Decimal::ONE,
                timestamp: None,
            },
            None => Ticker::empty(pair),
        };
        ProviderRecord::new("coincheck", RecordKind::Ticker, ticker)
    }
}

/// Chain wallet holding `WLD` and `OP`, priced by symbol.
#[derive(Default)]
pub struct FakeChain {
    balance: Balance,
    prices: HashMap<String, Decimal>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self {
            balance: Balance::zeroed(["WLD", "OP"]),
            prices: HashMap::new(),
        }
    }

    pub fn with_balance(mut self, symbol: &str, amount: Decimal) -> Self {
        self.balance.set(symbol, amount);
        self
    }

    pub fn with_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }
}

#[async_trait]
impl BalanceProvider for FakeChain {
    fn name(&self) -> &str {
        "optimism"
    }

    fn assets(&self) -> Vec<String> {
        vec!["WLD".into(), "OP".into()]
    }

    fn rate_key(&self, asset: &str) -> Option<String> {
        self.assets().contains(&asset.to_string()).then(|| asset.to_string())
    }

    async fn get_balance(&self) -> ProviderRecord<Balance> {
        ProviderRecord::new("optimism", RecordKind::Balance, self.balance.clone())
    }

    async fn get_rate(&self, key: &str) -> ProviderRecord<Rate> {
        let price = self.prices.get(key).copied().unwrap_or(Decimal::ZERO);
        ProviderRecord::new("optimism", RecordKind::Rate, Rate::new(key, price))
    }
}

/// What a [`FakeMessenger`] was asked to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Reply { token: String, text: String },
    Push { to: String, text: String },
}

/// Records every message. The first `failures` sends are rejected with a
/// delivery error.
#[derive(Default)]
pub struct FakeMessenger {
    sent: Mutex<Vec<Sent>>,
    failures: AtomicUsize,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failures: usize) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failures: AtomicUsize::new(failures),
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, message: Sent) -> CinfoResult<()> {
        self.sent.lock().unwrap().push(message);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(CinfoError::Delivery {
                status: 400,
                message: "The request body has 1 error(s)".into(),
                details: vec!["messages[0].text: May not be empty".into()],
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    fn channel(&self) -> &str {
        "fake"
    }

    async fn reply(&self, reply_token: &str, text: &str) -> CinfoResult<()> {
        self.record(Sent::Reply {
            token: reply_token.into(),
            text: text.into(),
        })
    }

    async fn push(&self, to: &str, text: &str) -> CinfoResult<()> {
        self.record(Sent::Push {
            to: to.into(),
            text: text.into(),
        })
    }
}

pub fn trade(pair: &str, side: OrderType, funds: &[(&str, Decimal)]) -> TransactionLogEntry {
    TransactionLogEntry {
        date: "2015-11-18T07:02:21.000Z".into(),
        funds: funds.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        pair: pair.into(),
        fee_currency: "JPY".into(),
        fee: Decimal::new(6, 1),
        order_type: side,
    }
}
