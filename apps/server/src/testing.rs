//! Offline state for route tests: an empty exchange and a recording messenger.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use cinfo_common::error::CinfoResult;
use cinfo_common::traits::{BalanceProvider, Messenger, TradeHistory};
use cinfo_common::types::*;
use cinfo_core::{Dispatcher, SummaryBuilder};

use crate::state::AppState;

pub const SECRET: &str = "test-channel-secret";

struct EmptyExchange;

#[async_trait]
impl BalanceProvider for EmptyExchange {
    fn name(&self) -> &str {
        "coincheck"
    }

    fn assets(&self) -> Vec<String> {
        vec!["jpy".into()]
    }

    fn rate_key(&self, _asset: &str) -> Option<String> {
        None
    }

    async fn get_balance(&self) -> ProviderRecord<Balance> {
        ProviderRecord::new("coincheck", RecordKind::Balance, Balance::zeroed(["jpy"]))
    }

    async fn get_rate(&self, key: &str) -> ProviderRecord<Rate> {
        ProviderRecord::new("coincheck", RecordKind::Rate, Rate::empty(key))
    }
}

#[async_trait]
impl TradeHistory for EmptyExchange {
    async fn get_transaction_log(&self) -> ProviderRecord<Vec<TransactionLogEntry>> {
        ProviderRecord::new("coincheck", RecordKind::TransactionLog, Vec::new())
    }

    async fn get_ticker(&self, pair: &str) -> ProviderRecord<Ticker> {
        ProviderRecord::new("coincheck", RecordKind::Ticker, Ticker::empty(pair))
    }
}

#[derive(Default)]
pub struct RecordingMessenger {
    replies: Mutex<Vec<(String, String)>>,
    pushes: Mutex<Vec<(String, String)>>,
}

impl RecordingMessenger {
    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }

    pub fn pushes(&self) -> Vec<(String, String)> {
        self.pushes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    fn channel(&self) -> &str {
        "recording"
    }

    async fn reply(&self, reply_token: &str, text: &str) -> CinfoResult<()> {
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.to_string(), text.to_string()));
        Ok(())
    }

    async fn push(&self, to: &str, text: &str) -> CinfoResult<()> {
        self.pushes
            .lock()
            .unwrap()
            .push((to.to_string(), text.to_string()));
        Ok(())
    }
}

pub fn test_dispatcher(targets: Vec<String>) -> (Arc<Dispatcher>, Arc<RecordingMessenger>) {
    let messenger = Arc::new(RecordingMessenger::default());
    let summary = Arc::new(SummaryBuilder::new(
        Arc::new(EmptyExchange),
        Vec::new(),
        vec!["btc_jpy".into()],
    ));
    let dispatcher = Dispatcher::new(summary, messenger.clone()).with_broadcast_targets(targets);
    (Arc::new(dispatcher), messenger)
}

pub fn test_state() -> (Arc<AppState>, Arc<RecordingMessenger>) {
    let (dispatcher, messenger) = test_dispatcher(Vec::new());
    let state = AppState {
        dispatcher,
        channel_secret: SECRET.to_string(),
    };
    (Arc::new(state), messenger)
}
