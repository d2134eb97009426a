//! Deployment model, configuration and the polling loop that waits for a
//! deployment to an environment to succeed.

pub mod config;
pub mod models;
pub mod pace;
pub mod watch;

pub use watch::{DeploymentLister, StatusFetcher, WatchError, WatchRequest, WatchResult, Watcher};
