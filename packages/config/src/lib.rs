// ABOUTME: Configuration and environment variable management for the Sudo SDK
// ABOUTME: Loads runtime settings from the environment with validated defaults

pub mod constants;
pub mod logging;

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

/// Default container image used when none is configured
const DEFAULT_CONTAINER_IMAGE: &str = "python:3.12-slim";

/// Default Docker network mode for task containers
const DEFAULT_CONTAINER_NETWORK: &str = "bridge";

/// Default per-task execution timeout in seconds
const DEFAULT_TASK_TIMEOUT_SECS: u64 = 3600;

/// Default bound on concurrent environment acquisitions
const DEFAULT_MAX_CONCURRENT_ACQUIRES: usize = 8;

/// Default timeout for ledger sink requests in seconds
const DEFAULT_LEDGER_TIMEOUT_SECS: u64 = 10;

/// Runtime environment the SDK is operating in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Testing,
}

impl Environment {
    fn from_env() -> Self {
        match std::env::var(constants::SUDO_ENVIRONMENT)
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "production" => Environment::Production,
            "testing" => Environment::Testing,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Centralized SDK configuration
///
/// Every field has a usable default so `from_env` never fails; a missing or
/// malformed policy file is still surfaced at startup when the policy engine
/// loads it.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    /// Path to the JSON policy document
    pub policy_file: PathBuf,
    /// Container image tasks run in
    pub container_image: String,
    /// Docker network mode for task containers
    pub container_network: String,
    /// Upper bound on a single task execution
    pub task_timeout: Duration,
    /// Maximum number of in-flight environment acquisitions
    pub max_concurrent_acquires: usize,
    /// Ledger endpoint for completion events; None disables the sink
    pub ledger_url: Option<String>,
    /// Timeout applied to ledger sink requests
    pub ledger_timeout: Duration,
}

impl Config {
    /// Build a configuration from the process environment
    pub fn from_env() -> Self {
        let task_timeout_secs = std::env::var(constants::SUDO_TASK_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_TASK_TIMEOUT_SECS);

        let max_concurrent_acquires = std::env::var(constants::SUDO_MAX_CONCURRENT_ACQUIRES)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&v| (1..=256).contains(&v))
            .unwrap_or(DEFAULT_MAX_CONCURRENT_ACQUIRES);

        let ledger_timeout_secs = std::env::var(constants::SUDO_LEDGER_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_LEDGER_TIMEOUT_SECS);

        let config = Self {
            environment: Environment::from_env(),
            policy_file: std::env::var(constants::SUDO_POLICY_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("policies.json")),
            container_image: std::env::var(constants::SUDO_CONTAINER_IMAGE)
                .unwrap_or_else(|_| DEFAULT_CONTAINER_IMAGE.to_string()),
            container_network: std::env::var(constants::SUDO_CONTAINER_NETWORK)
                .unwrap_or_else(|_| DEFAULT_CONTAINER_NETWORK.to_string()),
            task_timeout: Duration::from_secs(task_timeout_secs),
            max_concurrent_acquires,
            ledger_url: std::env::var(constants::SUDO_LEDGER_URL)
                .ok()
                .filter(|v| !v.is_empty()),
            ledger_timeout: Duration::from_secs(ledger_timeout_secs),
        };

        debug!(
            image = %config.container_image,
            network = %config.container_network,
            timeout_secs = task_timeout_secs,
            "Loaded SDK configuration from environment"
        );

        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            policy_file: PathBuf::from("policies.json"),
            container_image: DEFAULT_CONTAINER_IMAGE.to_string(),
            container_network: DEFAULT_CONTAINER_NETWORK.to_string(),
            task_timeout: Duration::from_secs(DEFAULT_TASK_TIMEOUT_SECS),
            max_concurrent_acquires: DEFAULT_MAX_CONCURRENT_ACQUIRES,
            ledger_url: None,
            ledger_timeout: Duration::from_secs(DEFAULT_LEDGER_TIMEOUT_SECS),
        }
    }
}
