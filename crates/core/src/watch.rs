use std::{future::Future, time::Duration};

use thiserror::Error;
use tokio::time::Instant;

use crate::{
    models::{Deployment, DeploymentId, DeploymentQuery, DeploymentStatus, RepoRef, resolve_url},
    pace::{Pacer, SleepPacer},
};

/// Lists deployments matching a repository, environment and commit.
pub trait DeploymentLister {
    fn list_deployments(
        &self,
        query: &DeploymentQuery,
    ) -> impl Future<Output = anyhow::Result<Vec<Deployment>>> + Send;
}

/// Fetches the status history of a single deployment, in API order.
pub trait StatusFetcher {
    fn list_statuses(
        &self,
        repo: &RepoRef,
        id: DeploymentId,
    ) -> impl Future<Output = anyhow::Result<Vec<DeploymentStatus>>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRequest {
    pub repo: RepoRef,
    pub sha: String,
    pub environment: String,
    pub interval: Duration,
    pub timeout: Duration,
}

impl WatchRequest {
    pub fn query(&self) -> DeploymentQuery {
        DeploymentQuery {
            repo: self.repo.clone(),
            environment: self.environment.clone(),
            sha: self.sha.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchResult {
    pub deployment: Deployment,
    pub status: DeploymentStatus,
    pub url: Option<String>,
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Timing out after {} seconds ({:.3} elapsed)", .timeout.as_secs(), .elapsed.as_secs_f64())]
    Timeout { timeout: Duration, elapsed: Duration },
    #[error("Failed to list deployments")]
    ListDeployments(#[source] anyhow::Error),
    #[error("Failed to fetch statuses for deployment {id}")]
    ListStatuses {
        id: DeploymentId,
        #[source]
        source: anyhow::Error,
    },
}

pub struct Watcher<L, F, P = SleepPacer> {
    lister: L,
    fetcher: F,
    pacer: P,
}

impl<L, F> Watcher<L, F>
where
    L: DeploymentLister,
    F: StatusFetcher,
{
    pub fn new(lister: L, fetcher: F) -> Self { Self::with_pacer(lister, fetcher, SleepPacer) }
}

impl<L, F, P> Watcher<L, F, P>
where
    L: DeploymentLister,
    F: StatusFetcher,
    P: Pacer,
{
    pub fn with_pacer(lister: L, fetcher: F, pacer: P) -> Self { Self { lister, fetcher, pacer } }

    /// Poll until a deployment for the requested environment and commit reports `success`.
    ///
    /// Each round lists the matching deployments and checks their statuses in order,
    /// pacing after every deployment without a success. The deadline is only checked
    /// once a round is complete.
    pub async fn watch(&self, request: &WatchRequest) -> Result<WatchResult, WatchError> {
        let start = Instant::now();
        let query = request.query();
        tracing::info!(
            "Deployment params: owner={} repo={} environment={} sha={}",
            query.repo.owner,
            query.repo.name,
            query.environment,
            query.sha
        );

        let mut retry_count = 0u64;
        loop {
            let deployments =
                self.lister.list_deployments(&query).await.map_err(WatchError::ListDeployments)?;
            tracing::info!("Found {} deployments...", deployments.len());

            for deployment in deployments {
                tracing::info!("Getting statuses for deployment {}...", deployment.id);
                let statuses = self
                    .fetcher
                    .list_statuses(&request.repo, deployment.id)
                    .await
                    .map_err(|source| WatchError::ListStatuses { id: deployment.id, source })?;
                retry_count += 1;
                tracing::info!("Found {} statuses", statuses.len());

                if let Some(status) = statuses.iter().find(|s| s.state.is_success()) {
                    tracing::info!(
                        "Success! Deployment {} status {} (target_url: {})",
                        deployment.id,
                        status.id,
                        status.target_url.as_deref().unwrap_or_default()
                    );
                    let url = resolve_url(&deployment, status);
                    let status = status.clone();
                    return Ok(WatchResult { deployment, status, url });
                }

                let states = statuses.iter().map(|s| s.state.as_str()).collect::<Vec<_>>();
                tracing::info!(
                    "No statuses with state \"success\": {:?} (retry: {})",
                    states,
                    retry_count
                );
                self.pacer.sleep_interval(request.interval).await;
            }

            let elapsed = start.elapsed();
            if elapsed >= request.timeout {
                tracing::warn!(
                    "No successful deployment to {} after {:.3}s",
                    request.environment,
                    elapsed.as_secs_f64()
                );
                return Err(WatchError::Timeout { timeout: request.timeout, elapsed });
            }
        }
    }
}
