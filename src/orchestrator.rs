// ABOUTME: Startup/signal/drain lifecycle - spawns the daemon activities and owns shutdown.
// ABOUTME: The only module that knows about signals; everything below it just runs until told to stop.

use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::beacon::Beacon;
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::engine::{Engine, EngineError};
use crate::exporter::Exporter;
use crate::latency::LatencyReporter;
use crate::runtime::ComputeRuntime;
use crate::usage::UsageReporter;

const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Owns the daemon's lifecycle: report version, spawn the long-lived
/// activities, run the Dispatcher on this task, and drain on signal.
pub struct Orchestrator<R: ComputeRuntime> {
    runtime: Arc<R>,
    api: ApiClient,
    config: Arc<Config>,
}

impl<R: ComputeRuntime + 'static> Orchestrator<R> {
    pub fn new(runtime: Arc<R>, api: ApiClient, config: Arc<Config>) -> Self {
        Self { runtime, api, config }
    }

    pub async fn run(self) -> Result<(), EngineError> {
        if let Err(e) = self
            .api
            .update_version(&self.config.compute_node_id, AGENT_VERSION)
            .await
        {
            tracing::warn!(error = %e, "failed to report agent version at startup");
        }

        let engine = Arc::new(Engine::new(self.runtime.clone(), self.api.clone(), self.config.clone()).await?);
        let dispatcher = Arc::new(Dispatcher::new(engine.clone(), self.api.clone(), self.config.clone()));

        let mut exporter = Exporter::new(
            self.runtime.clone(),
            self.api.clone(),
            self.config.compute_node_id.clone(),
        );
        let exporter_task = tokio::spawn(async move { exporter.run().await });

        let beacon = Beacon::new(self.api.clone(), self.config.clone());
        let beacon_task = tokio::spawn(async move { beacon.run().await });

        let usage_task = self.config.report_usage.then(|| {
            let mut reporter = UsageReporter::new(self.api.clone(), self.config.clone());
            tokio::spawn(async move { reporter.run().await })
        });

        let latency_task = self.config.report_usage.then(|| {
            let reporter = LatencyReporter::new(self.api.clone(), self.config.clone());
            tokio::spawn(async move { reporter.run().await })
        });

        let dispatch_cancel = CancellationToken::new();
        let dispatcher_for_loop = dispatcher.clone();
        let dispatch_cancel_for_loop = dispatch_cancel.clone();
        let dispatch_task =
            tokio::spawn(async move { dispatcher_for_loop.run(dispatch_cancel_for_loop).await });

        wait_for_termination_signal().await;
        tracing::info!("shutdown signal received, draining workloads");

        // Ask the dispatcher to stop at its next tick boundary rather than
        // aborting it mid-flight: `Engine::run`/`restart` issue multiple
        // sequential runtime calls with no rollback, and an abort landing
        // between them would leave a container half-applied.
        dispatch_cancel.cancel();
        if let Err(e) = dispatch_task.await {
            tracing::warn!(error = %e, "dispatcher task panicked during shutdown");
        }

        let stopped = engine.stop_all().await?;
        dispatcher.wait_for_instances_to_stop(stopped).await;

        beacon_task.abort();
        exporter_task.abort();
        if let Some(task) = usage_task {
            task.abort();
        }
        if let Some(task) = latency_task {
            task.abort();
        }

        tracing::info!("drain complete, exiting");
        Ok(())
    }
}

/// Waits for either SIGTERM or SIGINT. Unix-only, matching the daemon's
/// deployment target (a local container host).
async fn wait_for_termination_signal() {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
}
