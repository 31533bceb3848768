//! Universal constants for Crypto Info.

/// Common reporting unit. Every balance is converted into this currency.
pub const FIAT: &str = "jpy";

/// Provider identifiers.
pub const PROVIDER_COINCHECK: &str = "coincheck";
pub const PROVIDER_COINMARKETCAP: &str = "coinmarketcap";
pub const CHANNEL_LINE: &str = "line";

/// Default API endpoints.
pub const COINCHECK_BASE_URL: &str = "https://coincheck.com";
pub const COINMARKETCAP_BASE_URL: &str = "https://pro-api.coinmarketcap.com";
pub const OPTIMISM_EXPLORER_URL: &str = "https://api-optimistic.etherscan.io/api";
pub const LINE_API_BASE: &str = "https://api.line.me";

/// Trading pairs Coincheck serves rates and tickers for.
/// Requests for anything else are answered locally with an empty record.
pub const COINCHECK_PAIRS: &[&str] = &[
    "btc_jpy",
    "eth_jpy",
    "etc_jpy",
    "lsk_jpy",
    "mona_jpy",
    "plt_jpy",
    "fnct_jpy",
    "dai_jpy",
    "wbtc_jpy",
];

/// Per-request timeout for every upstream HTTP client, in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 15;

/// Environment variables holding credentials.
pub const ENV_LINE_ACCESS_TOKEN: &str = "LINE_CHANNEL_ACCESS_TOKEN";
pub const ENV_LINE_CHANNEL_SECRET: &str = "LINE_CHANNEL_SECRET";
pub const ENV_COINCHECK_API_KEY: &str = "COINCHECK_API_KEY";
pub const ENV_COINCHECK_API_SECRET: &str = "COINCHECK_API_SECRET";
pub const ENV_COINMARKETCAP_API_KEY: &str = "COINMARKETCAP_API_KEY";
pub const ENV_EXPLORER_API_KEY: &str = "EXPLORER_API_KEY";
pub const ENV_WALLET_ADDRESS: &str = "WALLET_ADDRESS";
pub const ENV_CONFIG_PATH: &str = "CINFO_CONFIG";
