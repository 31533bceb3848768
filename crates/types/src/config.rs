use serde::{Deserialize, Serialize};

use cinfo_common::constants::*;
use cinfo_common::types::TokenSpec;

// ═══════════════════════════════════════════════════════════════════════
//  APP CONFIG: stored at ~/.crypto-info/config.toml
// ═══════════════════════════════════════════════════════════════════════

/// Top-level configuration. Every section has defaults, so an empty or
/// missing file is a valid configuration.
///
/// ```toml
/// [server]
/// bind = "0.0.0.0:3001"
/// report_timeout_secs = 25
/// reply_unrecognized = false
/// broadcast_interval_secs = 86400
///
/// [line]
/// broadcast_targets = ["C0123456789abcdef"]
///
/// [coincheck]
/// rate_pairs = ["btc_jpy", "eth_jpy"]
///
/// [[chains]]
/// name = "optimism"
/// explorer_url = "https://api-optimistic.etherscan.io/api"
/// wallet_address = "0x..."
///
/// [[chains.tokens]]
/// symbol = "WLD"
/// contract_address = "0xdC6fF44d5d932Cbd77B52E5612Ba0529DC6226F1"
/// decimals = 18
/// ```
///
/// Credentials never live here; they come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub line: LineConfig,
    #[serde(default)]
    pub coincheck: CoincheckConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    /// Chain wallets to report. An empty list disables on-chain balances.
    #[serde(default = "default_chains")]
    pub chains: Vec<ChainConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the webhook server listens on.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Upper bound for building one report, in seconds.
    #[serde(default = "default_report_timeout")]
    pub report_timeout_secs: u64,
    /// Answer unknown commands with a "command not found" message instead
    /// of staying silent.
    #[serde(default)]
    pub reply_unrecognized: bool,
    /// Period of the built-in broadcast task. Absent = disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineConfig {
    #[serde(default = "default_line_api")]
    pub api_base: String,
    /// User, group or room IDs receiving scheduled reports.
    #[serde(default)]
    pub broadcast_targets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoincheckConfig {
    #[serde(default = "default_coincheck_url")]
    pub base_url: String,
    /// Pairs listed in the rate report.
    #[serde(default = "default_rate_pairs")]
    pub rate_pairs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_oracle_url")]
    pub base_url: String,
}

/// One wallet on one EVM chain, read through an Etherscan-compatible API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub name: String,
    pub explorer_url: String,
    /// Falls back to `WALLET_ADDRESS` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    pub tokens: Vec<TokenSpec>,
}

fn default_bind() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_report_timeout() -> u64 {
    25
}

fn default_line_api() -> String {
    LINE_API_BASE.to_string()
}

fn default_coincheck_url() -> String {
    COINCHECK_BASE_URL.to_string()
}

fn default_rate_pairs() -> Vec<String> {
    vec!["btc_jpy".to_string(), "eth_jpy".to_string()]
}

fn default_oracle_url() -> String {
    COINMARKETCAP_BASE_URL.to_string()
}

fn default_chains() -> Vec<ChainConfig> {
    vec![ChainConfig {
        name: "optimism".to_string(),
        explorer_url: OPTIMISM_EXPLORER_URL.to_string(),
        wallet_address: None,
        tokens: vec![
            TokenSpec::new("WLD", "0xdC6fF44d5d932Cbd77B52E5612Ba0529DC6226F1", 18),
            TokenSpec::new("OP", "0x4200000000000000000000000000000000000042", 18),
        ],
    }]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            report_timeout_secs: default_report_timeout(),
            reply_unrecognized: false,
            broadcast_interval_secs: None,
        }
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            api_base: default_line_api(),
            broadcast_targets: Vec::new(),
        }
    }
}

impl Default for CoincheckConfig {
    fn default() -> Self {
        Self {
            base_url: default_coincheck_url(),
            rate_pairs: default_rate_pairs(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_oracle_url(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            line: LineConfig::default(),
            coincheck: CoincheckConfig::default(),
            oracle: OracleConfig::default(),
            chains: default_chains(),
        }
    }
}

impl AppConfig {
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Chain configs that name at least one token.
    pub fn active_chains(&self) -> impl Iterator<Item = &ChainConfig> {
        self.chains.iter().filter(|c| !c.tokens.is_empty())
    }
}
