//! CoinMarketCap Pro API client.
//!
//! Only `/v2/cryptocurrency/quotes/latest` is used, converted to JPY.
//! Auth is the `X-CMC_PRO_API_KEY` header.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, info, warn};

use cinfo_common::constants::{COINMARKETCAP_BASE_URL, HTTP_TIMEOUT_SECS, PROVIDER_COINMARKETCAP};
use cinfo_common::error::{CinfoError, CinfoResult};
use cinfo_common::json::decimal_value;
use cinfo_common::traits::PriceOracle;

const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";
const QUOTES_PATH: &str = "/v2/cryptocurrency/quotes/latest";
const CONVERT: &str = "JPY";

#[derive(Clone)]
pub struct CoinMarketCapClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CoinMarketCapClient {
    pub fn new(api_key: &str) -> CinfoResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| CinfoError::Config(format!("Failed to build HTTP client: {e}")))?;

        info!(provider = PROVIDER_COINMARKETCAP, "CoinMarketCap client initialized");

        Ok(Self {
            http,
            base_url: COINMARKETCAP_BASE_URL.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn fetch_quote(&self, symbol: &str) -> CinfoResult<Decimal> {
        let url = format!("{}{}", self.base_url, QUOTES_PATH);
        let resp = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("symbol", symbol), ("convert", CONVERT)])
            .send()
            .await
            .map_err(|e| CinfoError::Network(format!("CoinMarketCap request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(CinfoError::Protocol {
                provider: PROVIDER_COINMARKETCAP.into(),
                message: format!("HTTP {status}: {text}"),
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| CinfoError::Parse(format!("CoinMarketCap response: {e}")))?;

        debug!(provider = PROVIDER_COINMARKETCAP, symbol, "quote received");
        parse_quote(&body, symbol)
            .ok_or_else(|| CinfoError::Parse(format!("no JPY quote for {symbol}")))
    }
}

/// `data[SYMBOL][0].quote.JPY.price`. The v2 endpoint returns a list per
/// symbol since tickers are not unique; the first entry is the ranked one.
pub fn parse_quote(val: &Value, symbol: &str) -> Option<Decimal> {
    val.pointer(&format!("/data/{symbol}/0/quote/{CONVERT}/price"))
        .and_then(decimal_value)
}

#[async_trait]
impl PriceOracle for CoinMarketCapClient {
    fn source_name(&self) -> &str {
        PROVIDER_COINMARKETCAP
    }

    async fn get_rate(&self, symbol: &str) -> Option<Decimal> {
        match self.fetch_quote(symbol).await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!(provider = PROVIDER_COINMARKETCAP, symbol, error = %e, "quote fetch failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_quote() {
        let body = json!({
            "status": {"error_code": 0},
            "data": {
                "WLD": [{
                    "id": 13502,
                    "symbol": "WLD",
                    "quote": {"JPY": {"price": 312.25, "volume_24h": 1.0}}
                }]
            }
        });
        assert_eq!(parse_quote(&body, "WLD"), Some(dec!(312.25)));
    }

    #[test]
    fn test_parse_quote_takes_first_listing() {
        let body = json!({
            "data": {
                "OP": [
                    {"quote": {"JPY": {"price": 250}}},
                    {"quote": {"JPY": {"price": 0.001}}}
                ]
            }
        });
        assert_eq!(parse_quote(&body, "OP"), Some(dec!(250)));
    }

    #[test]
    fn test_parse_quote_missing_symbol() {
        let body = json!({"data": {}});
        assert_eq!(parse_quote(&body, "WLD"), None);
    }

    #[test]
    fn test_parse_quote_null_price() {
        let body = json!({"data": {"WLD": [{"quote": {"JPY": {"price": null}}}]}});
        assert_eq!(parse_quote(&body, "WLD"), None);
    }

    #[tokio::test]
    async fn test_unreachable_is_none() {
        let client = CoinMarketCapClient::new("key")
            .unwrap()
            .with_base_url("http://127.0.0.1:1");
        assert_eq!(client.get_rate("WLD").await, None);
        assert_eq!(client.source_name(), "coinmarketcap");
    }
}
