// ABOUTME: Fixed translation tables - capacity to memory limit, restart policy, healthcheck, log config.
// ABOUTME: These are deliberately not operator-configurable; every container gets the same shape.

use crate::model::{Capacity, RestartPolicy};
use crate::runtime::{HealthcheckConfig, LogConfig, RestartPolicyConfig};
use std::time::Duration;

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * MIB;

/// Capacity tier to memory limit, in bytes.
pub fn memory_limit_bytes(capacity: Capacity) -> u64 {
    match capacity {
        Capacity::Small => 500 * MIB,
        Capacity::Medium => 3 * GIB,
        Capacity::Large => 7 * GIB,
        Capacity::VeryLarge => 16 * GIB,
    }
}

/// Translate the control plane's restart policy vocabulary into the runtime's.
/// A missing policy means no restart policy is applied at all.
pub fn restart_policy_config(policy: Option<RestartPolicy>) -> RestartPolicyConfig {
    match policy {
        Some(RestartPolicy::Always) => RestartPolicyConfig::Always,
        Some(RestartPolicy::OnFailure) => RestartPolicyConfig::OnFailure { max_retries: None },
        Some(RestartPolicy::Never) | None => RestartPolicyConfig::No,
    }
}

/// Every workload container gets the same healthcheck: the runner writes a
/// `healthy_*` marker file under `/tmp` once it's ready to serve.
pub fn healthcheck_config() -> HealthcheckConfig {
    HealthcheckConfig {
        test: vec![
            "CMD-SHELL".to_string(),
            "ls /tmp/ | grep -q healthy_".to_string(),
        ],
        interval: Duration::from_secs(5),
        timeout: Duration::from_secs(5),
        retries: 3,
        start_period: Duration::from_secs(60),
    }
}

/// Every workload container logs through the same bounded json-file driver -
/// unbounded container logs have taken down more than one host's disk.
pub fn log_config() -> LogConfig {
    let mut options = std::collections::HashMap::new();
    options.insert("max-size".to_string(), "10m".to_string());
    options.insert("max-file".to_string(), "3".to_string());
    LogConfig {
        driver: "json-file".to_string(),
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_table_matches_fixed_values() {
        assert_eq!(memory_limit_bytes(Capacity::Small), 500 * MIB);
        assert_eq!(memory_limit_bytes(Capacity::Medium), 3 * GIB);
        assert_eq!(memory_limit_bytes(Capacity::Large), 7 * GIB);
        assert_eq!(memory_limit_bytes(Capacity::VeryLarge), 16 * GIB);
    }

    #[test]
    fn missing_restart_policy_means_no_restart() {
        assert!(matches!(
            restart_policy_config(None),
            RestartPolicyConfig::No
        ));
    }
}
