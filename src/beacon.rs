// ABOUTME: Periodic healthcheck pinger - the agent's heartbeat to the control plane.
// ABOUTME: Log-and-continue on failure; a blip here must never affect the other activities.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use crate::api::ApiClient;
use crate::config::Config;

/// POSTs the healthcheck endpoint every `API_PING_INTERVAL`, forever.
pub struct Beacon {
    api: ApiClient,
    config: Arc<Config>,
}

impl Beacon {
    pub fn new(api: ApiClient, config: Arc<Config>) -> Self {
        Self { api, config }
    }

    pub async fn run(&self) -> ! {
        let mut ticker = time::interval(self.ping_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.api.healthcheck(&self.config.compute_node_id).await {
                tracing::warn!(error = %e, "beacon healthcheck failed");
            }
        }
    }

    fn ping_interval(&self) -> Duration {
        self.config.ping_interval
    }
}
