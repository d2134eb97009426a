//! GitHub Actions step protocol: `INPUT_*` variables in, `GITHUB_OUTPUT` and
//! workflow commands out.

use std::{
    fs::OpenOptions,
    io::{self, Write},
};

use anyhow::{Context, Result};
use deploy_wait_core::config::{Config, GitHubConfig, WatchConfig};

/// Read an action input the way the runner exposes it.
pub fn input(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    let key = format!("INPUT_{}", name.replace(' ', "_").to_uppercase());
    lookup(&key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

/// Collect the action inputs into a config layer.
pub fn inputs(lookup: impl Fn(&str) -> Option<String>) -> Config {
    Config {
        github: GitHubConfig { token: input(&lookup, "github-token"), api_url: None },
        watch: WatchConfig {
            environment: input(&lookup, "environment"),
            timeout: input(&lookup, "timeout"),
            interval: input(&lookup, "interval"),
        },
    }
}

/// Set step outputs, appending to `GITHUB_OUTPUT` when available.
pub fn set_outputs(
    lookup: impl Fn(&str) -> Option<String>,
    outputs: &[(&str, &str)],
) -> Result<()> {
    match lookup("GITHUB_OUTPUT").filter(|path| !path.is_empty()) {
        Some(path) => {
            let mut file = OpenOptions::new()
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open GITHUB_OUTPUT file {path}"))?;
            for &(name, value) in outputs {
                write_file_command(&mut file, name, value)
                    .with_context(|| format!("Failed to write output '{name}'"))?;
            }
        }
        None => {
            let mut stdout = io::stdout().lock();
            for &(name, value) in outputs {
                writeln!(
                    stdout,
                    "::set-output name={}::{}",
                    escape_property(name),
                    escape_data(value)
                )?;
            }
        }
    }
    Ok(())
}

/// Report the failure reason to the runner.
pub fn set_failed(message: &str) { println!("::error::{}", escape_data(message)) }

fn write_file_command(w: &mut impl Write, name: &str, value: &str) -> io::Result<()> {
    let delimiter = loop {
        let delimiter = format!("ghadelimiter_{:032x}", rand::random::<u128>());
        if !name.contains(&delimiter) && !value.contains(&delimiter) {
            break delimiter;
        }
    };
    write!(w, "{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

fn escape_data(s: &str) -> String { s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A") }

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
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
    fn test_inputs() {
        let config = inputs(env(&[
            ("INPUT_GITHUB-TOKEN", "secret"),
            ("INPUT_ENVIRONMENT", " production \n"),
            ("INPUT_TIMEOUT", ""),
            ("INPUT_INTERVAL", "5"),
        ]));
        assert_eq!(config.github.token.as_deref(), Some("secret"));
        assert_eq!(config.watch.environment.as_deref(), Some("production"));
        assert_eq!(config.watch.timeout, None);
        assert_eq!(config.watch.interval.as_deref(), Some("5"));
    }

    #[test]
    fn test_file_command() {
        let mut out = Vec::new();
        write_file_command(&mut out, "url", "https://example.com\nsecond line").unwrap();
        let out = String::from_utf8(out).unwrap();
        let (header, rest) = out.split_once('\n').unwrap();
        let delimiter = header.strip_prefix("url<<").unwrap();
        assert!(delimiter.starts_with("ghadelimiter_"));
        assert_eq!(rest, format!("https://example.com\nsecond line\n{delimiter}\n"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_data("50%\r\ndone"), "50%25%0D%0Adone");
        assert_eq!(escape_property("a:b,c%"), "a%3Ab%2Cc%25");
    }

    #[test]
    fn test_set_outputs_appends_to_file() {
        let path = std::env::temp_dir().join(format!("deploy-wait-output-{}", std::process::id()));
        std::fs::write(&path, "existing=1\n").unwrap();
        let path_str = path.to_string_lossy().into_owned();
        set_outputs(env(&[("GITHUB_OUTPUT", path_str.as_str())]), &[("id", "42"), ("url", "")]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let lines = contents.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "existing=1");
        assert!(lines[1].starts_with("id<<ghadelimiter_"));
        assert_eq!(lines[2], "42");
        assert_eq!(lines[3], lines[1].trim_start_matches("id<<"));
        assert!(lines[4].starts_with("url<<ghadelimiter_"));
        assert_eq!(lines[5], "");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_set_outputs_missing_file() {
        let path = std::env::temp_dir().join("deploy-wait-output-missing/does-not-exist");
        let path_str = path.to_string_lossy().into_owned();
        assert!(set_outputs(env(&[("GITHUB_OUTPUT", path_str.as_str())]), &[("id", "1")]).is_err());
    }
}
