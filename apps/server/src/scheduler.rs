//! Built-in broadcast trigger.
//!
//! Runs the dispatcher's broadcast every `broadcast_interval_secs`. The
//! first run happens one full period after startup, not immediately.

use std::sync::Arc;
use std::time::Duration;

use cinfo_core::Dispatcher;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

pub fn spawn_broadcast(dispatcher: Arc<Dispatcher>, period: Duration) -> Option<JoinHandle<()>> {
    if period.is_zero() {
        warn!("broadcast_interval_secs is 0, scheduled broadcast disabled");
        return None;
    }

    info!(period_secs = period.as_secs(), "scheduled broadcast enabled");
    Some(tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let delivered = dispatcher.broadcast().await;
            info!(delivered, "scheduled broadcast sent");
        }
    }))
}
