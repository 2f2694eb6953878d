// ABOUTME: Sandbox runner driving the acquire, execute, release lifecycle
// ABOUTME: Guarantees teardown of every acquired environment, including on timeout

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Result, SandboxError};
use crate::providers::{ContainerConfig, Provider};
use crate::types::{ExecutionHandle, ExecutionResult, ExecutionState, RunRequest};

/// Process keeping the environment alive between acquire and release
const KEEPALIVE_COMMAND: &[&str] = &["sleep", "infinity"];

/// Runs single-shot tasks in fresh isolated environments.
///
/// Each `run` call owns an independent environment for its full lifetime:
/// `Created -> Acquiring -> Running -> (Succeeded|Failed|TimedOut) -> Released`.
/// Once acquisition has succeeded, no path skips `Released`. Concurrent runs
/// share only the provider; acquisition is gated by a semaphore so load
/// queues instead of failing.
pub struct SandboxRunner {
    provider: Arc<dyn Provider>,
    acquire_gate: Semaphore,
    teardown_failures: AtomicU64,
}

impl SandboxRunner {
    pub fn new(provider: Arc<dyn Provider>, max_concurrent_acquires: usize) -> Self {
        Self {
            provider,
            acquire_gate: Semaphore::new(max_concurrent_acquires.max(1)),
            teardown_failures: AtomicU64::new(0),
        }
    }

    /// Run one task to completion, bounded by `timeout`.
    ///
    /// A non-zero exit status is returned as an `Ok(ExecutionResult)`; errors
    /// mean the task could not run (no environment, transport failure) or ran
    /// past its deadline.
    pub async fn run(&self, request: RunRequest, timeout: Duration) -> Result<ExecutionResult> {
        let execution_id = Uuid::new_v4().to_string();
        self.trace_state(&execution_id, ExecutionState::Created);

        // Acquire: queue behind the gate rather than reject under load
        self.trace_state(&execution_id, ExecutionState::Acquiring);
        let permit = self
            .acquire_gate
            .acquire()
            .await
            .map_err(|_| SandboxError::Internal("acquire gate closed".to_string()))?;

        let config = self.container_config(&execution_id, &request);
        let container_id = self
            .provider
            .create_container(&config)
            .await
            .map_err(SandboxError::Acquisition)?;
        drop(permit);

        let handle = ExecutionHandle {
            execution_id,
            container_id,
        };

        // Execute, with release guaranteed on every path below
        self.trace_state(&handle.execution_id, ExecutionState::Running);
        let env_vars = if request.env_vars.is_empty() {
            None
        } else {
            Some(request.env_vars.clone())
        };

        let started = Instant::now();
        let outcome = tokio::time::timeout(
            timeout,
            self.provider
                .exec_command(&handle.container_id, request.command.clone(), env_vars),
        )
        .await;

        match outcome {
            Err(_) => {
                warn!(
                    execution_id = %handle.execution_id,
                    timeout_secs = timeout.as_secs(),
                    "Execution deadline exceeded, terminating environment"
                );
                self.trace_state(&handle.execution_id, ExecutionState::TimedOut);
                self.release(&handle).await;
                Err(SandboxError::Timeout {
                    seconds: timeout.as_secs(),
                })
            }
            Ok(Err(e)) => {
                self.trace_state(&handle.execution_id, ExecutionState::Failed);
                self.release(&handle).await;
                Err(SandboxError::Execution(e))
            }
            Ok(Ok(exec)) => {
                let duration = started.elapsed();
                let state = if exec.exit_code == 0 {
                    ExecutionState::Succeeded
                } else {
                    ExecutionState::Failed
                };
                self.trace_state(&handle.execution_id, state);

                let result = ExecutionResult {
                    execution_id: handle.execution_id.clone(),
                    stdout: String::from_utf8_lossy(&exec.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&exec.stderr).to_string(),
                    exit_code: exec.exit_code,
                    duration,
                };

                self.release(&handle).await;
                Ok(result)
            }
        }
    }

    /// Number of environments whose teardown failed since construction.
    ///
    /// Silent loss of an environment is a defect; failures are logged and
    /// counted here, never raised over the primary result.
    pub fn teardown_failures(&self) -> u64 {
        self.teardown_failures.load(Ordering::Relaxed)
    }

    async fn release(&self, handle: &ExecutionHandle) {
        if let Err(e) = self
            .provider
            .remove_container(&handle.container_id, true)
            .await
        {
            self.teardown_failures.fetch_add(1, Ordering::Relaxed);
            warn!(
                execution_id = %handle.execution_id,
                error = %e,
                "Failed to tear down environment"
            );
        }
        self.trace_state(&handle.execution_id, ExecutionState::Released);
    }

    fn container_config(&self, execution_id: &str, request: &RunRequest) -> ContainerConfig {
        ContainerConfig {
            image: request.image.clone(),
            name: format!("sudo-{}", execution_id),
            network_mode: request.network_mode.clone(),
            // Task env vars are injected at exec time, not into the keepalive process
            env_vars: HashMap::new(),
            command: Some(KEEPALIVE_COMMAND.iter().map(|s| s.to_string()).collect()),
            working_dir: None,
            labels: request.labels.clone(),
        }
    }

    fn trace_state(&self, execution_id: &str, state: ExecutionState) {
        debug!(execution_id = %execution_id, state = ?state, "Execution state transition");
    }
}
