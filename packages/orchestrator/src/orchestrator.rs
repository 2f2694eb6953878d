// ABOUTME: Task orchestrator sequencing policy gate, sandbox lifecycle, and event emission
// ABOUTME: Owns failure policy; a denied task never reaches the container runtime

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use sudo_config::Config;
use sudo_events::{EventSink, LedgerSink, NoopSink, TaskEvent};
use sudo_policy::{PolicyEngine, Task};
use sudo_sandbox::{ExecutionResult, Provider, RunRequest, SandboxRunner};

use crate::error::OrchestratorError;

/// Per-task settings applied when the caller does not override them
#[derive(Debug, Clone)]
pub struct TaskDefaults {
    /// Container image tasks run in
    pub image: String,
    /// Docker network mode for task containers
    pub network_mode: String,
    /// Upper bound on a single task execution
    pub timeout: Duration,
}

impl TaskDefaults {
    pub fn from_config(config: &Config) -> Self {
        Self {
            image: config.container_image.clone(),
            network_mode: config.container_network.clone(),
            timeout: config.task_timeout,
        }
    }
}

/// Single public entry point for policy-gated task execution.
///
/// Sequences gate -> lifecycle -> result. Each `execute` call is an
/// independent pipeline; the orchestrator holds no per-task state, so one
/// instance serves concurrent callers.
pub struct Orchestrator {
    policy: Arc<PolicyEngine>,
    runner: Arc<SandboxRunner>,
    sink: Arc<dyn EventSink>,
    defaults: TaskDefaults,
}

impl Orchestrator {
    pub fn new(
        policy: Arc<PolicyEngine>,
        runner: Arc<SandboxRunner>,
        sink: Arc<dyn EventSink>,
        defaults: TaskDefaults,
    ) -> Self {
        Self {
            policy,
            runner,
            sink,
            defaults,
        }
    }

    /// Assemble an orchestrator from configuration and an injected runtime
    /// provider. Fails fast if the policy source is missing or malformed.
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn Provider>,
    ) -> Result<Self, OrchestratorError> {
        let policy = PolicyEngine::from_file(&config.policy_file).map_err(|e| {
            OrchestratorError::Configuration {
                source: Box::new(e),
            }
        })?;

        let runner = SandboxRunner::new(provider, config.max_concurrent_acquires);

        let sink: Arc<dyn EventSink> = match &config.ledger_url {
            Some(url) => Arc::new(
                LedgerSink::new(url.clone(), config.ledger_timeout).map_err(|e| {
                    OrchestratorError::Configuration {
                        source: Box::new(e),
                    }
                })?,
            ),
            None => Arc::new(NoopSink),
        };

        Ok(Self::new(
            Arc::new(policy),
            Arc::new(runner),
            sink,
            TaskDefaults::from_config(config),
        ))
    }

    /// Execute a task under the configured timeout
    pub async fn execute(&self, task: Task) -> Result<ExecutionResult, OrchestratorError> {
        self.execute_with_timeout(task, self.defaults.timeout).await
    }

    /// Execute a task, bounding the run phase by `timeout`.
    ///
    /// Flow: evaluate policy; on deny fail immediately without touching the
    /// runtime; on allow delegate to the sandbox runner; emit a completion
    /// event off the critical path.
    pub async fn execute_with_timeout(
        &self,
        task: Task,
        timeout: Duration,
    ) -> Result<ExecutionResult, OrchestratorError> {
        info!(task = %task.name, requester = %task.requester, "Executing task");

        let decision =
            self.policy
                .evaluate(&task)
                .map_err(|e| OrchestratorError::Internal {
                    source: Box::new(e),
                })?;

        if !decision.allowed {
            let reason = decision
                .reason
                .unwrap_or_else(|| "denied by policy".to_string());
            warn!(task = %task.name, reason = %reason, "Task denied by policy");
            self.notify(TaskEvent::violation(&task.name, &task.requester, &reason));
            return Err(OrchestratorError::PolicyViolation { reason });
        }

        let request = self.run_request(&task);
        let result = self.runner.run(request, timeout).await?;

        self.notify(TaskEvent::completed(
            &task.name,
            &task.requester,
            result.exit_code,
            result.duration.as_millis() as u64,
        ));

        info!(
            task = %task.name,
            execution_id = %result.execution_id,
            exit_code = result.exit_code,
            "Task completed"
        );
        Ok(result)
    }

    /// Emit an event without blocking or failing the current call
    fn notify(&self, event: TaskEvent) {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            if let Err(e) = sink.emit(&event).await {
                warn!(error = %e, "Failed to emit task event");
            }
        });
    }

    fn run_request(&self, task: &Task) -> RunRequest {
        // A string "command" parameter runs verbatim; otherwise the task's
        // parameter map itself becomes the output of the run.
        let script = match task.parameters.get("command").and_then(Value::as_str) {
            Some(command) => command.to_string(),
            None => {
                let payload =
                    serde_json::to_string(&task.parameters).unwrap_or_else(|_| "{}".to_string());
                format!("printf '%s' {}", shell_quote(&payload))
            }
        };

        let mut labels = HashMap::new();
        labels.insert("sudo.task".to_string(), task.name.clone());
        labels.insert("sudo.requester".to_string(), task.requester.clone());

        RunRequest {
            image: self.defaults.image.clone(),
            network_mode: self.defaults.network_mode.clone(),
            command: vec!["/bin/sh".to_string(), "-c".to_string(), script],
            env_vars: HashMap::new(),
            labels,
        }
    }
}

/// Single-quote a string for /bin/sh
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote_plain() {
        assert_eq!(shell_quote("abc"), "'abc'");
    }

    #[test]
    fn test_shell_quote_embedded_quote() {
        assert_eq!(shell_quote("a'b"), r#"'a'\''b'"#);
    }

    #[test]
    fn test_task_defaults_from_config() {
        let config = Config::default();
        let defaults = TaskDefaults::from_config(&config);
        assert_eq!(defaults.image, config.container_image);
        assert_eq!(defaults.network_mode, "bridge");
        assert_eq!(defaults.timeout, config.task_timeout);
    }
}
