// ABOUTME: Round-trip latency sampler against the control-plane healthcheck endpoint.
// ABOUTME: Shares the Beacon's tick cadence and the REPORT_USAGE gate (see DESIGN.md).

use std::sync::Arc;
use std::time::Instant;

use tokio::time::{self, MissedTickBehavior};

use crate::api::ApiClient;
use crate::config::Config;

/// Times a healthcheck round trip every `API_PING_INTERVAL` and reports the
/// measured milliseconds.
pub struct LatencyReporter {
    api: ApiClient,
    config: Arc<Config>,
}

impl LatencyReporter {
    pub fn new(api: ApiClient, config: Arc<Config>) -> Self {
        Self { api, config }
    }

    pub async fn run(&self) -> ! {
        let mut ticker = time::interval(self.config.ping_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let start = Instant::now();
            match self.api.healthcheck(&self.config.compute_node_id).await {
                Ok(()) => {
                    let latency_ms = start.elapsed().as_millis() as u64;
                    if let Err(e) = self
                        .api
                        .report_latency(&self.config.compute_node_id, latency_ms)
                        .await
                    {
                        tracing::warn!(error = %e, "latency report failed");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "latency probe failed"),
            }
        }
    }
}
