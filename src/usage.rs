// ABOUTME: CPU/memory/disk usage sampler - only runs when REPORT_USAGE is set.
// ABOUTME: CPU is smoothed over a rolling window since sysinfo's reading is noisy sample-to-sample.

use std::collections::VecDeque;
use std::sync::Arc;

use sysinfo::{Disks, System};
use tokio::time::{self, MissedTickBehavior};

use crate::api::ApiClient;
use crate::config::Config;

/// Samples system resource usage every `API_PING_INTERVAL` and reports the
/// averaged snapshot. A single CPU reading is noisy - `sysinfo` computes CPU
/// usage as a delta between refreshes - so this keeps a rolling window of
/// `CPU_PERCENT_SAMPLES` readings and reports their mean.
pub struct UsageReporter {
    api: ApiClient,
    config: Arc<Config>,
    system: System,
    cpu_samples: VecDeque<f32>,
}

impl UsageReporter {
    pub fn new(api: ApiClient, config: Arc<Config>) -> Self {
        let window = config.cpu_percent_samples.max(1);
        Self {
            api,
            config,
            system: System::new_all(),
            cpu_samples: VecDeque::with_capacity(window),
        }
    }

    pub async fn run(&mut self) -> ! {
        let mut ticker = time::interval(self.config.ping_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let (cpu_percent, memory_percent, disk_percent) = self.sample();
            if let Err(e) = self
                .api
                .report_usage(&self.config.compute_node_id, cpu_percent, memory_percent, disk_percent)
                .await
            {
                tracing::warn!(error = %e, "usage report failed");
            }
        }
    }

    fn sample(&mut self) -> (f32, f32, f32) {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let window = self.config.cpu_percent_samples.max(1);
        self.cpu_samples.push_back(self.system.global_cpu_usage());
        while self.cpu_samples.len() > window {
            self.cpu_samples.pop_front();
        }
        let cpu_percent = self.cpu_samples.iter().sum::<f32>() / self.cpu_samples.len() as f32;

        let memory_percent = if self.system.total_memory() == 0 {
            0.0
        } else {
            self.system.used_memory() as f32 / self.system.total_memory() as f32 * 100.0
        };

        let disk_percent = disk_usage_percent();

        (cpu_percent, memory_percent, disk_percent)
    }
}

fn disk_usage_percent() -> f32 {
    let disks = Disks::new_with_refreshed_list();
    let (total, available): (u64, u64) = disks
        .list()
        .iter()
        .fold((0, 0), |(total, available), disk| {
            (total + disk.total_space(), available + disk.available_space())
        });
    if total == 0 {
        return 0.0;
    }
    (total - available) as f32 / total as f32 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_window_averages_and_evicts() {
        let mut samples: VecDeque<f32> = VecDeque::new();
        let window = 3;
        for v in [10.0, 20.0, 30.0, 40.0] {
            samples.push_back(v);
            while samples.len() > window {
                samples.pop_front();
            }
        }
        assert_eq!(samples.len(), 3);
        let avg = samples.iter().sum::<f32>() / samples.len() as f32;
        assert!((avg - 30.0).abs() < f32::EPSILON);
    }
}
