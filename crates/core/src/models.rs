use std::{fmt, str::FromStr};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self { owner: owner.into(), name: name.into() }
    }
}

impl FromStr for RepoRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(owner, name))
            }
            _ => bail!("Invalid repository '{s}', expected 'owner/name'"),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentId(pub u64);

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub login: String,
}

/// A deployment as returned by `GET /repos/{owner}/{repo}/deployments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: DeploymentId,
    #[serde(default)]
    pub sha: String,
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form JSON. GitHub returns either an object or a string here.
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub creator: Option<Actor>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

impl Deployment {
    /// The `web_url` carried in an object payload, if it is a non-empty string.
    pub fn web_url(&self) -> Option<&str> {
        self.payload.as_object()?.get("web_url")?.as_str().filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DeploymentState {
    Error,
    Failure,
    Inactive,
    InProgress,
    Queued,
    #[default]
    Pending,
    Success,
    Other(String),
}

impl DeploymentState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Error => "error",
            Self::Failure => "failure",
            Self::Inactive => "inactive",
            Self::InProgress => "in_progress",
            Self::Queued => "queued",
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Other(s) => s,
        }
    }

    pub fn is_success(&self) -> bool { matches!(self, Self::Success) }
}

impl From<String> for DeploymentState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "error" => Self::Error,
            "failure" => Self::Failure,
            "inactive" => Self::Inactive,
            "in_progress" => Self::InProgress,
            "queued" => Self::Queued,
            "pending" => Self::Pending,
            "success" => Self::Success,
            _ => Self::Other(value),
        }
    }
}

impl From<DeploymentState> for String {
    fn from(value: DeploymentState) -> Self {
        match value {
            DeploymentState::Other(s) => s,
            state => state.as_str().to_string(),
        }
    }
}

impl Serialize for DeploymentState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeploymentState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// A status update as returned by `GET /repos/{owner}/{repo}/deployments/{id}/statuses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    #[serde(default)]
    pub id: u64,
    pub state: DeploymentState,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub environment_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// Filter for listing deployments. All fields must match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentQuery {
    #[serde(skip)]
    pub repo: RepoRef,
    pub environment: String,
    pub sha: String,
}

/// Resolve the URL reported for a successful deployment.
///
/// The deployment payload's `web_url` takes precedence over the status `target_url`.
pub fn resolve_url(deployment: &Deployment, status: &DeploymentStatus) -> Option<String> {
    match deployment.web_url() {
        Some(url) => Some(url.to_string()),
        None => status.target_url.clone(),
    }
}
