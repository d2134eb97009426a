use anyhow::{Context, Result, anyhow};
use deploy_wait_core::{config::DEFAULT_API_URL, models::RepoRef};
use url::Url;

/// Repository, commit and API endpoint of the running GitHub Actions job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionContext {
    pub repo: RepoRef,
    pub sha: String,
    pub api_url: Url,
}

impl ActionContext {
    /// Build the context from `GITHUB_REPOSITORY`, `GITHUB_SHA` and `GITHUB_API_URL`.
    ///
    /// `repo` and `sha` override the environment when provided.
    pub fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        repo: Option<&str>,
        sha: Option<&str>,
    ) -> Result<Self> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let repo = match repo {
            Some(repo) => repo.to_string(),
            None => lookup("GITHUB_REPOSITORY")
                .ok_or_else(|| anyhow!("GITHUB_REPOSITORY is not set, pass --repository"))?,
        };
        let repo = repo.parse::<RepoRef>()?;
        let sha = match sha {
            Some(sha) => sha.to_string(),
            None => lookup("GITHUB_SHA").ok_or_else(|| anyhow!("GITHUB_SHA is not set, pass --sha"))?,
        };
        let api_url = lookup("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url =
            Url::parse(&api_url).with_context(|| format!("Invalid GITHUB_API_URL '{api_url}'"))?;
        Ok(Self { repo, sha, api_url })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<String, String>>();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_actions_env() {
        let context = ActionContext::resolve(env(&[
            ("GITHUB_REPOSITORY", "octocat/hello-world"),
            ("GITHUB_SHA", "abc123"),
        ]), None, None)
        .unwrap();
        assert_eq!(context.repo, RepoRef::new("octocat", "hello-world"));
        assert_eq!(context.sha, "abc123");
        assert_eq!(context.api_url.as_str(), "https://api.github.com/");
    }

    #[test]
    fn test_enterprise_api_url() {
        let context = ActionContext::resolve(env(&[
            ("GITHUB_REPOSITORY", "octocat/hello-world"),
            ("GITHUB_SHA", "abc123"),
            ("GITHUB_API_URL", "https://ghe.example.com/api/v3"),
        ]), None, None)
        .unwrap();
        assert_eq!(context.api_url.as_str(), "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_overrides() {
        let context = ActionContext::resolve(
            env(&[("GITHUB_REPOSITORY", "octocat/hello-world"), ("GITHUB_SHA", "abc123")]),
            Some("foo/bar"),
            Some("def456"),
        )
        .unwrap();
        assert_eq!(context.repo, RepoRef::new("foo", "bar"));
        assert_eq!(context.sha, "def456");
    }

    #[test]
    fn test_missing_or_invalid() {
        assert!(ActionContext::resolve(env(&[("GITHUB_SHA", "abc123")]), None, None).is_err());
        assert!(ActionContext::resolve(env(&[("GITHUB_REPOSITORY", "a/b")]), None, None).is_err());
        assert!(
            ActionContext::resolve(env(&[("GITHUB_REPOSITORY", "a/b"), ("GITHUB_SHA", "")]), None, None)
                .is_err()
        );
        assert!(
            ActionContext::resolve(env(&[
                ("GITHUB_REPOSITORY", "hello-world"),
                ("GITHUB_SHA", "abc123")
            ]), None, None)
            .is_err()
        );
        assert!(
            ActionContext::resolve(env(&[
                ("GITHUB_REPOSITORY", "a/b"),
                ("GITHUB_SHA", "abc123"),
                ("GITHUB_API_URL", "not a url"),
            ]), None, None)
            .is_err()
        );
    }
}
