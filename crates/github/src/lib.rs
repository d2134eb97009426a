pub mod context;

use anyhow::{Context, Result};
use deploy_wait_core::{
    DeploymentLister, StatusFetcher,
    config::GitHubConfig,
    models::{Deployment, DeploymentId, DeploymentQuery, DeploymentStatus, RepoRef},
};
use octocrab::Octocrab;
use url::Url;

pub use crate::context::ActionContext;

#[derive(Clone)]
pub struct GitHub {
    pub client: Octocrab,
}

impl GitHub {
    /// Create a REST client. `config.api_url` takes precedence over `api_url`.
    /// An empty or missing token yields an unauthenticated client.
    pub fn new(config: &GitHubConfig, api_url: &Url) -> Result<Self> {
        let api_url = config.api_url.as_ref().unwrap_or(api_url);
        let mut builder = Octocrab::builder()
            .base_uri(api_url.as_str())
            .with_context(|| format!("Invalid GitHub API URL {api_url}"))?;
        match config.token.as_deref().filter(|token| !token.is_empty()) {
            Some(token) => builder = builder.personal_token(token.to_string()),
            None => tracing::warn!("No GitHub token provided, requests will be unauthenticated"),
        }
        let client = builder.build().context("Failed to create GitHub client")?;
        tracing::debug!("Using GitHub API at {}", api_url);
        Ok(Self { client })
    }
}

impl DeploymentLister for GitHub {
    async fn list_deployments(&self, query: &DeploymentQuery) -> Result<Vec<Deployment>> {
        let route = format!("/repos/{}/{}/deployments", query.repo.owner, query.repo.name);
        self.client.get(&route, Some(query)).await.with_context(|| format!("GET {route}"))
    }
}

impl StatusFetcher for GitHub {
    async fn list_statuses(&self, repo: &RepoRef, id: DeploymentId) -> Result<Vec<DeploymentStatus>> {
        let route = format!("/repos/{}/{}/deployments/{}/statuses", repo.owner, repo.name, id);
        self.client.get(&route, None::<&()>).await.with_context(|| format!("GET {route}"))
    }
}
