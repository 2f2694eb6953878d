// ABOUTME: Core type definitions for sandbox execution
// ABOUTME: Run requests, opaque execution handles, lifecycle states, and results

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Request to run a single task in a fresh isolated environment
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Container image to use (e.g. "python:3.12-slim")
    pub image: String,
    /// Docker network mode (e.g. "bridge", "none", "host")
    pub network_mode: String,
    /// Command executed inside the environment
    pub command: Vec<String>,
    /// Environment variables set for the command
    pub env_vars: HashMap<String, String>,
    /// Extra labels applied to the environment for tracking
    pub labels: HashMap<String, String>,
}

impl RunRequest {
    pub fn new(image: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            image: image.into(),
            network_mode: "bridge".to_string(),
            command,
            env_vars: HashMap::new(),
            labels: HashMap::new(),
        }
    }

    pub fn with_network_mode(mut self, mode: impl Into<String>) -> Self {
        self.network_mode = mode.into();
        self
    }
}

/// Opaque reference to a live isolated environment.
///
/// Owned exclusively by the runner from acquire to release; only the
/// generated execution id leaks out, via `ExecutionResult`.
#[derive(Debug)]
pub(crate) struct ExecutionHandle {
    pub(crate) execution_id: String,
    pub(crate) container_id: String,
}

/// Lifecycle states of a single run.
///
/// `Released` is terminal and is reached exactly once on every path where
/// acquisition succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionState {
    Created,
    Acquiring,
    Running,
    Succeeded,
    Failed,
    TimedOut,
    Released,
}

/// Result of a task that ran to completion.
///
/// A non-zero `exit_code` means the task ran and failed; it is still a
/// result, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Correlation id for the environment the task ran in
    pub execution_id: String,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// Exit status of the command
    pub exit_code: i64,
    /// Wall-clock execution duration
    pub duration: Duration,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
