mod action;
mod util;

use std::path::PathBuf;

use anyhow::{Context, Result};
use argp::FromArgs;
use deploy_wait_core::{
    WatchRequest, Watcher,
    config::{Config, GitHubConfig, WatchConfig},
    models::DeploymentId,
};
use deploy_wait_github::{ActionContext, GitHub};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::util::{output_format, path};

#[derive(FromArgs, PartialEq, Debug)]
/// Wait for a deployment of the current commit to an environment to succeed.
struct Args {
    #[argp(option, short = 'c', from_str_fn(path))]
    /// YAML config file
    config: Option<PathBuf>,
    #[argp(option, short = 'e')]
    /// environment to wait for
    environment: Option<String>,
    #[argp(option, short = 't')]
    /// overall timeout in seconds (default 30)
    timeout: Option<String>,
    #[argp(option, short = 'i')]
    /// delay between status checks in seconds (default 1)
    interval: Option<String>,
    #[argp(option)]
    /// repository as owner/name (default $GITHUB_REPOSITORY)
    repository: Option<String>,
    #[argp(option)]
    /// commit SHA (default $GITHUB_SHA)
    sha: Option<String>,
    #[argp(option, from_str_fn(output_format))]
    /// output format: actions or json (default actions)
    format: Option<OutputFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Actions,
    Json,
}

struct Outputs {
    id: DeploymentId,
    url: String,
}

#[tokio::main]
async fn main() {
    let env_filter = EnvFilter::builder()
        // Default to info level
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_filter(env_filter))
        .init();

    let args: Args = argp::parse_args_or_exit(argp::DEFAULT);
    let format = args.format.unwrap_or_default();
    if let Err(e) = run(&args).await.and_then(|outputs| emit(format, &outputs)) {
        tracing::error!("{:?}", e);
        if format == OutputFormat::Actions {
            action::set_failed(&format!("{e:#}"));
        }
        std::process::exit(1);
    }
}

fn env(key: &str) -> Option<String> { std::env::var(key).ok() }

async fn run(args: &Args) -> Result<Outputs> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let config = config.overlay(action::inputs(env)).overlay(Config {
        github: GitHubConfig::default(),
        watch: WatchConfig {
            environment: args.environment.clone(),
            timeout: args.timeout.clone(),
            interval: args.interval.clone(),
        },
    });
    let environment = config.watch.environment()?.to_string();
    let context = ActionContext::resolve(env, args.repository.as_deref(), args.sha.as_deref())
        .context("Failed to determine repository and commit")?;

    let request = WatchRequest {
        repo: context.repo,
        sha: context.sha,
        environment,
        interval: config.watch.interval(),
        timeout: config.watch.timeout(),
    };
    tracing::info!(
        "Waiting up to {}s for a deployment of {} to {} (interval {}ms)",
        request.timeout.as_secs(),
        request.repo,
        request.environment,
        request.interval.as_millis()
    );

    let github = GitHub::new(&config.github, &context.api_url)?;
    let watcher = Watcher::new(github.clone(), github);
    let result = watcher.watch(&request).await?;
    tracing::info!(
        "Deployment {} to {} succeeded: {}",
        result.deployment.id,
        result.deployment.environment,
        result.url.as_deref().unwrap_or("(no url)")
    );
    Ok(Outputs { id: result.deployment.id, url: result.url.unwrap_or_default() })
}

fn emit(format: OutputFormat, outputs: &Outputs) -> Result<()> {
    match format {
        OutputFormat::Actions => {
            let id = outputs.id.to_string();
            action::set_outputs(env, &[("id", id.as_str()), ("url", outputs.url.as_str())])
        }
        OutputFormat::Json => {
            let value = serde_json::json!({ "id": outputs.id, "url": outputs.url });
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
    }
}
