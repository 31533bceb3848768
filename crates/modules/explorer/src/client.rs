//! Explorer-backed chain provider.
//!
//! One wallet on one chain. Balances come from the explorer's
//! `account/tokenbalance` endpoint, one unauthenticated GET per token;
//! JPY prices come from the injected [`PriceOracle`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, info, warn};

use cinfo_common::constants::HTTP_TIMEOUT_SECS;
use cinfo_common::error::{CinfoError, CinfoResult};
use cinfo_common::json::string_field;
use cinfo_common::traits::{BalanceProvider, PriceOracle};
use cinfo_common::types::*;

/// Wallet balances for a fixed token registry on one chain.
pub struct ExplorerClient {
    http: reqwest::Client,
    /// Chain name, used as the provider name in reports.
    chain: String,
    base_url: String,
    wallet_address: String,
    api_key: Option<String>,
    tokens: Vec<TokenSpec>,
    oracle: Arc<dyn PriceOracle>,
}

impl ExplorerClient {
    pub fn new(
        chain: &str,
        base_url: &str,
        wallet_address: &str,
        tokens: Vec<TokenSpec>,
        oracle: Arc<dyn PriceOracle>,
    ) -> CinfoResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| CinfoError::Config(format!("Failed to build HTTP client: {e}")))?;

        info!(
            chain,
            tokens = tokens.len(),
            oracle = oracle.source_name(),
            "explorer client initialized"
        );

        Ok(Self {
            http,
            chain: chain.to_string(),
            base_url: base_url.to_string(),
            wallet_address: wallet_address.to_string(),
            api_key: None,
            tokens,
            oracle,
        })
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn token(&self, symbol: &str) -> Option<&TokenSpec> {
        self.tokens.iter().find(|t| t.symbol == symbol)
    }

    /// Balance of a single token. Issues exactly one request for a known
    /// token and none for an unknown one.
    pub async fn get_token_balance(&self, symbol: &str) -> ProviderRecord<Balance> {
        let balance = match self.fetch_token_balance(symbol).await {
            Ok(amount) => {
                let mut balance = Balance::default();
                balance.set(symbol, amount);
                balance
            }
            Err(e @ CinfoError::UnknownToken(_)) => {
                warn!(chain = %self.chain, error = %e, "no request sent");
                Balance::default()
            }
            Err(e) => {
                warn!(chain = %self.chain, symbol, error = %e, "token balance fetch failed");
                Balance::zeroed([symbol])
            }
        };
        ProviderRecord::new(self.chain.clone(), RecordKind::Balance, balance)
    }

    async fn fetch_token_balance(&self, symbol: &str) -> CinfoResult<Decimal> {
        let token = self
            .token(symbol)
            .ok_or_else(|| CinfoError::UnknownToken(symbol.to_string()))?;
        let raw = self.fetch_raw_balance(token).await?;
        token.scale(raw).ok_or_else(|| {
            CinfoError::Parse(format!("{symbol} balance {raw} exceeds the decimal range"))
        })
    }

    async fn fetch_raw_balance(&self, token: &TokenSpec) -> CinfoResult<u128> {
        let mut query: Vec<(&str, &str)> = vec![
            ("module", "account"),
            ("action", "tokenbalance"),
            ("contractaddress", token.contract_address.as_str()),
            ("address", self.wallet_address.as_str()),
            ("tag", "latest"),
        ];
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.as_str()));
        }

        let resp = self
            .http
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| CinfoError::Network(format!("explorer request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CinfoError::Protocol {
                provider: self.chain.clone(),
                message: format!("HTTP {status}"),
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| CinfoError::Parse(format!("explorer response: {e}")))?;

        debug!(chain = %self.chain, symbol = %token.symbol, body = %body, "token balance received");
        parse_token_balance(&body)
    }
}

/// `{"status": "1", "message": "OK", "result": "135499000000000000000"}`
pub fn parse_token_balance(val: &Value) -> CinfoResult<u128> {
    let status = string_field(val, "status");
    let result = string_field(val, "result");
    if status != "1" {
        return Err(CinfoError::Protocol {
            provider: "explorer".into(),
            message: format!("{}: {result}", string_field(val, "message")),
        });
    }
    result
        .trim()
        .parse::<u128>()
        .map_err(|e| CinfoError::Parse(format!("token balance {result:?}: {e}")))
}

#[async_trait]
impl BalanceProvider for ExplorerClient {
    fn name(&self) -> &str {
        &self.chain
    }

    fn assets(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.symbol.clone()).collect()
    }

    fn rate_key(&self, asset: &str) -> Option<String> {
        self.token(asset).map(|t| t.symbol.clone())
    }

    /// One fresh request per registry token, in registry order.
    async fn get_balance(&self) -> ProviderRecord<Balance> {
        let mut balance = Balance::zeroed(self.assets());
        for token in &self.tokens {
            let record = self.get_token_balance(&token.symbol).await;
            balance.merge(record.payload);
        }
        ProviderRecord::new(self.chain.clone(), RecordKind::Balance, balance)
    }

    async fn get_rate(&self, symbol: &str) -> ProviderRecord<Rate> {
        let rate = match self.token(symbol) {
            None => {
                warn!(chain = %self.chain, symbol, "unknown token, no rate request sent");
                Rate::empty(symbol)
            }
            Some(_) => match self.oracle.get_rate(symbol).await {
                Some(price) => Rate::new(symbol, price),
                None => {
                    warn!(chain = %self.chain, symbol, oracle = self.oracle.source_name(), "rate unavailable");
                    Rate::new(symbol, Decimal::ZERO)
                }
            },
        };
        ProviderRecord::new(self.chain.clone(), RecordKind::Rate, rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use axum::http::Uri;
    use axum::{Json, Router};
    use tokio::net::TcpListener;

    const UNREACHABLE: &str = "http://127.0.0.1:1/api";

    const WALLET: &str = "0x0000000000000000000000000000000000000001";

    struct FixedOracle {
        price: Option<Decimal>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceOracle for FixedOracle {
        fn source_name(&self) -> &str {
            "fixed"
        }

        async fn get_rate(&self, _symbol: &str) -> Option<Decimal> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.price
        }
    }

    fn registry() -> Vec<TokenSpec> {
        vec![
            TokenSpec::new("WLD", "0xdC6fF44d5d932Cbd77B52E5612Ba0529DC6226F1", 18),
            TokenSpec::new("OP", "0x4200000000000000000000000000000000000042", 18),
        ]
    }

    fn client_at(
        base_url: &str,
        tokens: Vec<TokenSpec>,
        price: Option<Decimal>,
    ) -> (ExplorerClient, Arc<FixedOracle>) {
        let oracle = Arc::new(FixedOracle {
            price,
            calls: AtomicUsize::new(0),
        });
        let client = ExplorerClient::new("optimism", base_url, WALLET, tokens, oracle.clone()).unwrap();
        (client, oracle)
    }

    fn client_with(price: Option<Decimal>) -> (ExplorerClient, Arc<FixedOracle>) {
        client_at(UNREACHABLE, registry(), price)
    }

    /// Local explorer answering every request with `body`. Returns its
    /// `/api` URL and the request URIs it received.
    async fn serve(body: Value) -> (String, Arc<Mutex<Vec<String>>>) {
        let requests: Arc<Mutex<Vec<String>>> = Arc::default();
        let log = requests.clone();
        let app = Router::new().fallback(move |uri: Uri| {
            let log = log.clone();
            let body = body.clone();
            async move {
                log.lock().unwrap().push(uri.to_string());
                Json(body)
            }
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api", listener.local_addr().unwrap());
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (url, requests)
    }

    #[test]
    fn test_parse_token_balance() {
        let body = json!({"status": "1", "message": "OK", "result": "135499000000000000000"});
        assert_eq!(parse_token_balance(&body).unwrap(), 135_499_000_000_000_000_000);
    }

    #[test]
    fn test_parse_token_balance_zero() {
        let body = json!({"status": "1", "message": "OK", "result": "0"});
        assert_eq!(parse_token_balance(&body).unwrap(), 0);
    }

    #[test]
    fn test_parse_token_balance_error_status() {
        let body = json!({"status": "0", "message": "NOTOK", "result": "Invalid API Key"});
        assert!(parse_token_balance(&body).is_err());
    }

    #[test]
    fn test_parse_token_balance_garbage() {
        let body = json!({"status": "1", "message": "OK", "result": "12abc"});
        assert!(parse_token_balance(&body).is_err());
    }

    #[test]
    fn test_assets_follow_registry_order() {
        let (client, _) = client_with(None);
        assert_eq!(client.assets(), vec!["WLD", "OP"]);
        assert_eq!(client.rate_key("WLD").as_deref(), Some("WLD"));
        assert_eq!(client.rate_key("ETH"), None);
        assert_eq!(client.name(), "optimism");
    }

    #[tokio::test]
    async fn test_rate_delegates_to_oracle() {
        let (client, oracle) = client_with(Some(dec!(312.5)));
        let record = client.get_rate("WLD").await;
        assert_eq!(record.provider_name, "optimism");
        assert_eq!(record.payload.price, dec!(312.5));
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_token_rate_skips_oracle() {
        let (client, oracle) = client_with(Some(dec!(1)));
        let record = client.get_rate("DOGE").await;
        assert!(record.payload.price.is_zero());
        assert_eq!(record.payload.key, "DOGE");
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oracle_none_is_zero_rate() {
        let (client, _) = client_with(None);
        let record = client.get_rate("OP").await;
        assert_eq!(record.payload, Rate::empty("OP"));
    }

    #[tokio::test]
    async fn test_unknown_token_balance_sends_no_request() {
        let (url, requests) = serve(json!({"status": "1", "message": "OK", "result": "1"})).await;
        let (client, _) = client_at(&url, registry(), None);

        let record = client.get_token_balance("DOGE").await;
        assert!(record.payload.is_empty());
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_balance_one_request_per_token() {
        let (url, requests) = serve(json!({
            "status": "1",
            "message": "OK",
            "result": "135499000000000000000"
        }))
        .await;
        let (client, _) = client_at(&url, registry(), None);

        let record = client.get_balance().await;
        assert_eq!(record.payload.get("WLD"), dec!(135));
        assert_eq!(record.payload.get("OP"), dec!(135));

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].contains("action=tokenbalance"));
        assert!(requests[0].contains("contractaddress=0xdC6fF44d5d932Cbd77B52E5612Ba0529DC6226F1"));
        assert!(requests[0].contains(&format!("address={WALLET}")));
        assert!(requests[1].contains("contractaddress=0x4200000000000000000000000000000000000042"));
        assert!(!requests[0].contains("apikey"));
    }

    #[tokio::test]
    async fn test_unrepresentable_balance_reads_zero() {
        let body = json!({"status": "1", "message": "OK", "result": u128::MAX.to_string()});
        let (url, _) = serve(body).await;
        let usdc = TokenSpec::new("USDC", "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85", 6);
        let (client, _) = client_at(&url, vec![usdc], None);

        let record = client.get_token_balance("USDC").await;
        assert!(record.payload.contains("USDC"));
        assert!(record.payload.get("USDC").is_zero());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_every_token_at_zero() {
        let (client, _) = client_with(None);
        let record = client.get_balance().await;
        assert_eq!(record.provider_name, "optimism");
        assert!(record.payload.contains("WLD"));
        assert!(record.payload.contains("OP"));
        assert!(record.payload.get("WLD").is_zero());
    }
}
