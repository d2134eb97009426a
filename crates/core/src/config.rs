use std::{fs::File, io::BufReader, path::Path, time::Duration};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::pace::parse_interval;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub token: Option<String>,
    pub api_url: Option<Url>,
}

/// Raw watch settings. Numeric values are kept as strings and resolved leniently.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    pub environment: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub timeout: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub interval: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let file = BufReader::new(
            File::open(path)
                .with_context(|| format!("Failed to open config file {}", path.display()))?,
        );
        serde_yaml::from_reader(file)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Layer `other` on top of `self`. Set, non-empty values in `other` win.
    pub fn overlay(self, other: Config) -> Config {
        Config {
            github: GitHubConfig {
                token: pick(self.github.token, other.github.token),
                api_url: other.github.api_url.or(self.github.api_url),
            },
            watch: WatchConfig {
                environment: pick(self.watch.environment, other.watch.environment),
                timeout: pick(self.watch.timeout, other.watch.timeout),
                interval: pick(self.watch.interval, other.watch.interval),
            },
        }
    }
}

impl WatchConfig {
    pub fn environment(&self) -> Result<&str> {
        self.environment
            .as_deref()
            .filter(|env| !env.is_empty())
            .ok_or_else(|| anyhow!("Input required and not supplied: environment"))
    }

    pub fn timeout(&self) -> Duration { parse_timeout(self.timeout.as_deref()) }

    pub fn interval(&self) -> Duration { parse_interval(self.interval.as_deref()) }
}

fn pick(base: Option<String>, over: Option<String>) -> Option<String> {
    over.filter(|v| !v.is_empty()).or(base)
}

/// Resolve the overall timeout from its raw setting.
///
/// Leading whitespace is skipped and the leading run of digits is taken as whole seconds.
/// Anything else, including zero, falls back to [`DEFAULT_TIMEOUT`].
pub fn parse_timeout(value: Option<&str>) -> Duration {
    let Some(value) = value.map(str::trim_start) else {
        return DEFAULT_TIMEOUT;
    };
    let end = value.find(|c: char| !c.is_ascii_digit()).unwrap_or(value.len());
    match value[..end].parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => DEFAULT_TIMEOUT,
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where D: Deserializer<'de> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        String(String),
        Int(i64),
        Float(f64),
    }
    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::String(s) => s,
        Raw::Int(v) => v.to_string(),
        Raw::Float(v) => v.to_string(),
    }))
}
