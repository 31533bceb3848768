//! Shared application state for the webhook server.

use std::sync::Arc;

use cinfo_core::{factory, Credentials, Dispatcher};
use cinfo_types::config::AppConfig;

/// Shared across all request handlers and the broadcast task.
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// Verifies `x-line-signature` on every webhook.
    pub channel_secret: String,
}

impl AppState {
    pub fn from_config(config: &AppConfig, creds: &Credentials) -> anyhow::Result<Self> {
        Ok(Self {
            dispatcher: Arc::new(factory::build_dispatcher(config, creds)?),
            channel_secret: factory::channel_secret(creds)?,
        })
    }
}
