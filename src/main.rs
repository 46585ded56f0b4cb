// ABOUTME: Entry point for the compute agent daemon.
// ABOUTME: Loads configuration, connects to the local runtime, and runs the orchestrator until signaled.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use compute_agent::api::ApiClient;
use compute_agent::config::Config;
use compute_agent::orchestrator::Orchestrator;
use compute_agent::runtime::{detect_local, BollardRuntime};

/// Per-host reconciliation agent. Configuration is read from the
/// environment, optionally overridden by a YAML file; this flag only
/// overrides the YAML file's own location.
#[derive(Debug, Parser)]
#[command(name = "compute-agent", version)]
struct Args {
    /// Path to the YAML configuration override (defaults to
    /// `$HOME/.splight/agent_config`).
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> compute_agent::error::Result<()> {
    let yaml_path = args.config.or_else(Config::yaml_override_path);
    let config = Config::load_from(yaml_path.as_deref())?.into_shared();

    let runtime_info = detect_local()?;
    tracing::info!(runtime = %runtime_info.runtime_type, socket = %runtime_info.socket_path, "detected container runtime");
    let runtime = Arc::new(BollardRuntime::connect(&runtime_info)?);

    let api = ApiClient::new(
        config.platform_api_host.clone(),
        &config.access_id,
        &config.secret_key,
    );

    Orchestrator::new(runtime, api, config).run().await?;
    Ok(())
}
