// ABOUTME: Stateless REST client for the control plane - auth header, JSON bodies, per-verb methods.
// ABOUTME: Used from every long-lived task; holds no mutable state beyond the reqwest connection pool.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::dto::{
    ComponentRecord, DownloadUrlResponse, LatencyBody, ServerRecord, UpdateStatusBody,
    UpdateVersionBody, UsageBody,
};
use super::error::ApiError;
use crate::model::{ComputeNode, DeploymentStatus, Instance};

const API_VERSION: &str = "v2";

/// REST client for the control plane described in the external-interfaces
/// section: JSON bodies, `Authorization: Splight <access_id> <secret_key>`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    auth_header: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, access_id: &str, secret_key: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            auth_header: format!("Splight {access_id} {secret_key}"),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}{}",
            self.base_url.trim_end_matches('/'),
            API_VERSION,
            path
        )
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .http
            .get(self.url(path))
            .header("Authorization", &self.auth_header)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url(path))
            .header("Authorization", &self.auth_header)
            .json(body)
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        if response.status().is_success() {
            return Ok(());
        }
        Self::status_error(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        if !response.status().is_success() {
            return Err(Self::status_error(response).await.unwrap_err());
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn status_error(response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    pub async fn components(&self, node_id: &str) -> Result<Vec<ComponentRecord>, ApiError> {
        self.get(&format!(
            "/engine/compute/nodes/all/{node_id}/components/"
        ))
        .await
    }

    pub async fn servers(&self, node_id: &str) -> Result<Vec<ServerRecord>, ApiError> {
        self.get(&format!("/engine/compute/nodes/all/{node_id}/servers/"))
            .await
    }

    /// Fetch the full desired set for this node: components and servers,
    /// converted into the workload model the Dispatcher and Engine share.
    pub async fn compute_node(&self, node_id: &str, node_name: &str) -> Result<ComputeNode, ApiError> {
        let components = self
            .components(node_id)
            .await?
            .into_iter()
            .map(Instance::from)
            .collect();
        let servers = self
            .servers(node_id)
            .await?
            .into_iter()
            .map(Instance::from)
            .collect();
        Ok(ComputeNode::new(
            node_id.to_string(),
            node_name.to_string(),
            components,
            servers,
        ))
    }

    pub async fn healthcheck(&self, node_id: &str) -> Result<(), ApiError> {
        self.post(
            &format!("/engine/compute/nodes/all/{node_id}/healthcheck/"),
            &serde_json::json!({}),
        )
        .await
    }

    pub async fn update_version(&self, node_id: &str, agent_version: &str) -> Result<(), ApiError> {
        self.post(
            &format!("/engine/compute/nodes/all/{node_id}/update-version/"),
            &UpdateVersionBody { agent_version },
        )
        .await
    }

    pub async fn report_usage(
        &self,
        node_id: &str,
        cpu_percent: f32,
        memory_percent: f32,
        disk_percent: f32,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/engine/compute/nodes/all/{node_id}/usage/"),
            &UsageBody {
                cpu_percent,
                memory_percent,
                disk_percent,
            },
        )
        .await
    }

    pub async fn report_latency(&self, node_id: &str, latency_ms: u64) -> Result<(), ApiError> {
        self.post(
            &format!("/engine/compute/nodes/all/{node_id}/latency/"),
            &LatencyBody { latency: latency_ms },
        )
        .await
    }

    pub async fn update_component_status(
        &self,
        id: &str,
        status: DeploymentStatus,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/engine/component/components/{id}/update-status/"),
            &UpdateStatusBody {
                deployment_status: status,
            },
        )
        .await
    }

    pub async fn update_server_status(
        &self,
        id: &str,
        status: DeploymentStatus,
    ) -> Result<(), ApiError> {
        self.post(
            &format!("/engine/server/servers/{id}/update-status/"),
            &UpdateStatusBody {
                deployment_status: status,
            },
        )
        .await
    }

    /// Publish a status transition for whichever kind of instance this is.
    pub async fn update_status(
        &self,
        instance: &Instance,
        status: DeploymentStatus,
    ) -> Result<(), ApiError> {
        match instance {
            Instance::Component(_) => self.update_component_status(instance.id(), status).await,
            Instance::Server(_) => self.update_server_status(instance.id(), status).await,
        }
    }

    /// Download a pre-signed tarball URL straight to disk. Unlike every other
    /// verb here, this never carries the control-plane auth header - the URL
    /// is already signed by the hub.
    pub async fn download_tarball(
        &self,
        url: &str,
        dest: &std::path::Path,
    ) -> Result<(), ApiError> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Self::status_error(response).await;
        }
        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| ApiError::Decode(format!("failed to write tarball to {}: {e}", dest.display())))?;
        Ok(())
    }

    pub async fn component_download_url(&self, hub_id: &str) -> Result<String, ApiError> {
        let response: DownloadUrlResponse = self
            .get(&format!(
                "/hub/component/versions/{hub_id}/download_url/?type=image"
            ))
            .await?;
        Ok(response.url)
    }

    pub async fn server_download_url(&self, hub_id: &str) -> Result<String, ApiError> {
        let response: DownloadUrlResponse = self
            .get(&format!(
                "/hub/server/versions/{hub_id}/download_url/?type=image"
            ))
            .await?;
        Ok(response.url)
    }

    /// Resolve the download URL for whichever kind of hub artifact this is.
    pub async fn download_url(&self, artifact: &crate::model::HubArtifact) -> Result<String, ApiError> {
        match artifact {
            crate::model::HubArtifact::Component(_) => self.component_download_url(artifact.id()).await,
            crate::model::HubArtifact::Server(_) => self.server_download_url(artifact.id()).await,
        }
    }
}
