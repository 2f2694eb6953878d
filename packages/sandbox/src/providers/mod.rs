// ABOUTME: Provider trait and implementations for sandbox execution backends
// ABOUTME: Defines the capability interface for isolated environment lifecycle management

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

pub mod docker;

pub use docker::DockerProvider;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Container error: {0}")]
    ContainerError(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

type Result<T> = std::result::Result<T, ProviderError>;

/// Container configuration for creating isolated environments
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    pub image: String,
    pub name: String,
    pub network_mode: String,
    pub env_vars: HashMap<String, String>,
    /// Process keeping the environment alive until teardown
    pub command: Option<Vec<String>>,
    pub working_dir: Option<String>,
    pub labels: HashMap<String, String>,
}

/// Execution result from running a command in an environment
#[derive(Debug)]
pub struct ExecResult {
    pub exit_code: i64,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Capability interface over a container runtime.
///
/// The core consumes exactly three lifecycle operations plus an availability
/// probe; any compliant backend (a container engine, a sandboxed process
/// runner, a remote executor) may implement it. Implementations must
/// tolerate concurrent use from independent runs.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Check if the provider is available and configured correctly
    async fn is_available(&self) -> Result<bool>;

    /// Create and start a fresh isolated environment, returning its id
    async fn create_container(&self, config: &ContainerConfig) -> Result<String>;

    /// Execute a command in a running environment
    async fn exec_command(
        &self,
        container_id: &str,
        command: Vec<String>,
        env_vars: Option<HashMap<String, String>>,
    ) -> Result<ExecResult>;

    /// Tear down an environment
    async fn remove_container(&self, container_id: &str, force: bool) -> Result<()>;
}
