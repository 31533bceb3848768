use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cinfo_common::constants::*;
use cinfo_types::config::AppConfig;
use tracing::info;

/// Dotfolder name under `$HOME`.
const DOTFOLDER: &str = ".crypto-info";

/// Resolve the root path: `$HOME/.crypto-info/`.
pub fn root_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(DOTFOLDER))
}

/// `$HOME/.crypto-info/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(root_dir()?.join("config.toml"))
}

/// Config path precedence: explicit flag, then `CINFO_CONFIG`, then the
/// dotfolder default.
pub fn resolve_config_path(flag: Option<&Path>) -> Result<PathBuf> {
    let env = std::env::var(ENV_CONFIG_PATH).ok().filter(|v| !v.is_empty());
    match (flag, env) {
        (Some(path), _) => Ok(path.to_path_buf()),
        (None, Some(env)) => Ok(PathBuf::from(env)),
        (None, None) => default_config_path(),
    }
}

/// Load the config at `path`. A missing file yields the defaults; a file
/// that exists but does not parse is an error.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        info!(path = %path.display(), "no config file, using defaults");
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = AppConfig::from_toml_str(&raw)
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    info!(path = %path.display(), chains = config.chains.len(), "config loaded");
    Ok(config)
}

/// Write the default config to `path` unless a file is already there.
/// Returns whether a file was written.
pub fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let toml_str = AppConfig::default()
        .to_toml_string()
        .context("Failed to serialize default config")?;
    fs::write(path, toml_str).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "created default config");
    Ok(true)
}

// ═══════════════════════════════════════════════════════════════════════
//  CREDENTIALS: environment only, never on disk
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub line_access_token: Option<String>,
    pub line_channel_secret: Option<String>,
    pub coincheck_api_key: Option<String>,
    pub coincheck_api_secret: Option<String>,
    pub coinmarketcap_api_key: Option<String>,
    pub explorer_api_key: Option<String>,
    pub wallet_address: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any name → value lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            line_access_token: get(ENV_LINE_ACCESS_TOKEN),
            line_channel_secret: get(ENV_LINE_CHANNEL_SECRET),
            coincheck_api_key: get(ENV_COINCHECK_API_KEY),
            coincheck_api_secret: get(ENV_COINCHECK_API_SECRET),
            coinmarketcap_api_key: get(ENV_COINMARKETCAP_API_KEY),
            explorer_api_key: get(ENV_EXPLORER_API_KEY),
            wallet_address: get(ENV_WALLET_ADDRESS),
        }
    }

    /// `(variable, is_set)` for every credential, optional ones included.
    pub fn status(&self) -> Vec<(&'static str, bool)> {
        vec![
            (ENV_LINE_ACCESS_TOKEN, self.line_access_token.is_some()),
            (ENV_LINE_CHANNEL_SECRET, self.line_channel_secret.is_some()),
            (ENV_COINCHECK_API_KEY, self.coincheck_api_key.is_some()),
            (ENV_COINCHECK_API_SECRET, self.coincheck_api_secret.is_some()),
            (ENV_COINMARKETCAP_API_KEY, self.coinmarketcap_api_key.is_some()),
            (ENV_EXPLORER_API_KEY, self.explorer_api_key.is_some()),
            (ENV_WALLET_ADDRESS, self.wallet_address.is_some()),
        ]
    }
}
