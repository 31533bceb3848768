//! Client factory: builds every provider once from config + credentials.
//!
//! The binaries call these at startup and share the results through
//! `Arc`s; nothing here is a global.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use cinfo_common::constants::*;
use cinfo_common::error::{CinfoError, CinfoResult};
use cinfo_common::traits::{BalanceProvider, ExchangeProvider, Messenger, PriceOracle};
use cinfo_mod_coincheck::CoincheckClient;
use cinfo_mod_coinmarketcap::CoinMarketCapClient;
use cinfo_mod_explorer::ExplorerClient;
use cinfo_mod_line::LineClient;
use cinfo_types::config::AppConfig;

use crate::dispatch::Dispatcher;
use crate::summary::SummaryBuilder;
use crate::workspace::Credentials;

fn require<'a>(value: &'a Option<String>, var: &str) -> CinfoResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| CinfoError::Config(format!("{var} is not set")))
}

pub fn build_exchange(config: &AppConfig, creds: &Credentials) -> CinfoResult<Arc<dyn ExchangeProvider>> {
    let key = require(&creds.coincheck_api_key, ENV_COINCHECK_API_KEY)?;
    let secret = require(&creds.coincheck_api_secret, ENV_COINCHECK_API_SECRET)?;
    let client = CoincheckClient::new(key, secret)?.with_base_url(&config.coincheck.base_url);
    Ok(Arc::new(client))
}

pub fn build_oracle(config: &AppConfig, creds: &Credentials) -> CinfoResult<Arc<dyn PriceOracle>> {
    let key = require(&creds.coinmarketcap_api_key, ENV_COINMARKETCAP_API_KEY)?;
    let client = CoinMarketCapClient::new(key)?.with_base_url(&config.oracle.base_url);
    Ok(Arc::new(client))
}

/// One explorer client per configured chain with tokens. The oracle is
/// only required when at least one chain is active.
pub fn build_chains(config: &AppConfig, creds: &Credentials) -> CinfoResult<Vec<Arc<dyn BalanceProvider>>> {
    let active: Vec<_> = config.active_chains().collect();
    if active.is_empty() {
        info!("no chain wallets configured");
        return Ok(Vec::new());
    }

    let oracle = build_oracle(config, creds)?;
    active
        .into_iter()
        .map(|chain| -> CinfoResult<Arc<dyn BalanceProvider>> {
            let wallet = chain
                .wallet_address
                .as_deref()
                .or(creds.wallet_address.as_deref())
                .ok_or_else(|| {
                    CinfoError::Config(format!(
                        "chain {} has no wallet_address and {ENV_WALLET_ADDRESS} is not set",
                        chain.name
                    ))
                })?;
            let client = ExplorerClient::new(
                &chain.name,
                &chain.explorer_url,
                wallet,
                chain.tokens.clone(),
                oracle.clone(),
            )?
            .with_api_key(creds.explorer_api_key.clone());
            Ok(Arc::new(client))
        })
        .collect()
}

pub fn build_summary(config: &AppConfig, creds: &Credentials) -> CinfoResult<SummaryBuilder> {
    let exchange = build_exchange(config, creds)?;
    let chains = build_chains(config, creds)?;
    Ok(SummaryBuilder::new(
        exchange,
        chains,
        config.coincheck.rate_pairs.clone(),
    ))
}

pub fn build_messenger(config: &AppConfig, creds: &Credentials) -> CinfoResult<Arc<dyn Messenger>> {
    let token = require(&creds.line_access_token, ENV_LINE_ACCESS_TOKEN)?;
    let client = LineClient::new(token)?.with_base_url(&config.line.api_base);
    Ok(Arc::new(client))
}

pub fn build_dispatcher(config: &AppConfig, creds: &Credentials) -> CinfoResult<Dispatcher> {
    let summary = Arc::new(build_summary(config, creds)?);
    let messenger = build_messenger(config, creds)?;
    Ok(Dispatcher::new(summary, messenger)
        .with_broadcast_targets(config.line.broadcast_targets.clone())
        .with_report_timeout(Duration::from_secs(config.server.report_timeout_secs))
        .with_reply_unrecognized(config.server.reply_unrecognized))
}

/// The channel secret the webhook server verifies signatures with.
pub fn channel_secret(creds: &Credentials) -> CinfoResult<String> {
    require(&creds.line_channel_secret, ENV_LINE_CHANNEL_SECRET).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_creds() -> Credentials {
        Credentials {
            line_access_token: Some("line-token".into()),
            line_channel_secret: Some("line-secret".into()),
            coincheck_api_key: Some("ck".into()),
            coincheck_api_secret: Some("cs".into()),
            coinmarketcap_api_key: Some("cmc".into()),
            explorer_api_key: None,
            wallet_address: Some("0x0000000000000000000000000000000000000001".into()),
        }
    }

    fn config_error(result: CinfoResult<impl Sized>) -> String {
        match result {
            Err(CinfoError::Config(msg)) => msg,
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected a config error"),
        }
    }

    #[test]
    fn test_full_credentials_build_dispatcher() {
        let dispatcher = build_dispatcher(&AppConfig::default(), &full_creds()).unwrap();
        assert!(dispatcher.broadcast_targets().is_empty());
    }

    #[test]
    fn test_missing_coincheck_key_names_variable() {
        let creds = Credentials {
            coincheck_api_key: None,
            ..full_creds()
        };
        let msg = config_error(build_summary(&AppConfig::default(), &creds));
        assert!(msg.contains(ENV_COINCHECK_API_KEY));
    }

    #[test]
    fn test_missing_line_token_names_variable() {
        let creds = Credentials {
            line_access_token: None,
            ..full_creds()
        };
        let msg = config_error(build_messenger(&AppConfig::default(), &creds));
        assert!(msg.contains(ENV_LINE_ACCESS_TOKEN));
    }

    #[test]
    fn test_missing_wallet_names_variable() {
        let creds = Credentials {
            wallet_address: None,
            ..full_creds()
        };
        let msg = config_error(build_chains(&AppConfig::default(), &creds));
        assert!(msg.contains(ENV_WALLET_ADDRESS));
        assert!(msg.contains("optimism"));
    }

    #[test]
    fn test_no_chains_needs_no_oracle() {
        let config = AppConfig::from_toml_str("chains = []").unwrap();
        let creds = Credentials {
            coinmarketcap_api_key: None,
            wallet_address: None,
            ..full_creds()
        };
        assert!(build_chains(&config, &creds).unwrap().is_empty());
        assert!(build_summary(&config, &creds).is_ok());
    }

    #[test]
    fn test_chain_names_from_config() {
        let chains = build_chains(&AppConfig::default(), &full_creds()).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].name(), "optimism");
        assert_eq!(chains[0].assets(), vec!["WLD", "OP"]);
    }

    #[test]
    fn test_channel_secret_required() {
        let creds = Credentials {
            line_channel_secret: None,
            ..full_creds()
        };
        let msg = config_error(channel_secret(&creds));
        assert!(msg.contains(ENV_LINE_CHANNEL_SECRET));
    }
}
