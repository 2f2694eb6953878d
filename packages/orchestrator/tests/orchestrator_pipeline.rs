// ABOUTME: Integration tests for the complete gate -> lifecycle -> result pipeline
// ABOUTME: Uses a counting stub provider and recording sink to verify runtime interactions

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sudo_orchestrator::{
    ContainerConfig, EventSink, ExecResult, Orchestrator, OrchestratorError, PolicyEngine,
    Provider, ProviderError, SandboxRunner, SinkError, Task, TaskDefaults, TaskEvent,
};

/// Policy fixture: create_file may not touch /etc/passwd
const POLICY_DOC: &str = r#"{
    "create_file": {
        "restricted_parameters": ["path"],
        "restricted_values": {"path": ["/etc/passwd"]}
    }
}"#;

/// Stub runtime provider counting every lifecycle call
struct CountingProvider {
    calls: Mutex<Vec<&'static str>>,
    creates: AtomicUsize,
    execs: AtomicUsize,
    removes: AtomicUsize,
    fail_create: bool,
    exec_delay: Duration,
    exit_code: i64,
}

impl CountingProvider {
    fn healthy() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            creates: AtomicUsize::new(0),
            execs: AtomicUsize::new(0),
            removes: AtomicUsize::new(0),
            fail_create: false,
            exec_delay: Duration::ZERO,
            exit_code: 0,
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for CountingProvider {
    async fn is_available(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }

    async fn create_container(&self, _config: &ContainerConfig) -> Result<String, ProviderError> {
        if self.fail_create {
            return Err(ProviderError::ConnectionError(
                "daemon unreachable".to_string(),
            ));
        }
        let n = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.lock().unwrap().push("create");
        Ok(format!("h{}", n))
    }

    async fn exec_command(
        &self,
        _container_id: &str,
        _command: Vec<String>,
        _env_vars: Option<HashMap<String, String>>,
    ) -> Result<ExecResult, ProviderError> {
        self.execs.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push("exec");
        if !self.exec_delay.is_zero() {
            tokio::time::sleep(self.exec_delay).await;
        }
        Ok(ExecResult {
            exit_code: self.exit_code,
            stdout: b"ok".to_vec(),
            stderr: Vec::new(),
        })
    }

    async fn remove_container(
        &self,
        _container_id: &str,
        _force: bool,
    ) -> Result<(), ProviderError> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push("remove");
        Ok(())
    }
}

/// Sink forwarding events into a channel for assertions
struct ChannelSink {
    tx: tokio::sync::mpsc::UnboundedSender<TaskEvent>,
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn emit(&self, event: &TaskEvent) -> Result<(), SinkError> {
        self.tx
            .send(event.clone())
            .map_err(|e| SinkError::Network(e.to_string()))
    }
}

/// Sink that always fails
struct FailingSink;

#[async_trait]
impl EventSink for FailingSink {
    async fn emit(&self, _event: &TaskEvent) -> Result<(), SinkError> {
        Err(SinkError::Network("sink down".to_string()))
    }
}

fn defaults() -> TaskDefaults {
    TaskDefaults {
        image: "alpine:latest".to_string(),
        network_mode: "none".to_string(),
        timeout: Duration::from_secs(5),
    }
}

fn orchestrator(provider: Arc<CountingProvider>, sink: Arc<dyn EventSink>) -> Orchestrator {
    let policy = PolicyEngine::from_json(POLICY_DOC).expect("policy fixture must load");
    let runner = SandboxRunner::new(provider, 4);
    Orchestrator::new(Arc::new(policy), Arc::new(runner), sink, defaults())
}

async fn next_event(rx: &mut tokio::sync::mpsc::UnboundedReceiver<TaskEvent>) -> TaskEvent {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("event should arrive")
        .expect("event channel should stay open")
}

/// Unknown actions are denied fail-closed and never reach the runtime
#[tokio::test]
async fn test_unknown_action_creates_no_environment() {
    let provider = Arc::new(CountingProvider::healthy());
    let orchestrator = orchestrator(provider.clone(), Arc::new(sudo_orchestrator::NoopSink));

    let task = Task::new("drop_database", "agent-1");
    let err = orchestrator.execute(task).await.unwrap_err();

    match err {
        OrchestratorError::PolicyViolation { reason } => {
            assert_eq!(reason, "unknown action");
        }
        other => panic!("expected PolicyViolation, got {:?}", other),
    }
    assert_eq!(provider.creates.load(Ordering::SeqCst), 0);
    assert_eq!(provider.execs.load(Ordering::SeqCst), 0);
    assert_eq!(provider.removes.load(Ordering::SeqCst), 0);
}

/// Restricted parameter values are denied and emit a violation event
#[tokio::test]
async fn test_restricted_path_denied_before_execution() {
    let provider = Arc::new(CountingProvider::healthy());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let orchestrator = orchestrator(provider.clone(), Arc::new(ChannelSink { tx }));

    let task = Task::new("create_file", "agent-1").with_parameter("path", "/etc/passwd");
    let err = orchestrator.execute(task).await.unwrap_err();

    match err {
        OrchestratorError::PolicyViolation { reason } => {
            assert!(reason.contains("path"), "reason should cite parameter: {}", reason);
            assert!(
                reason.contains("/etc/passwd"),
                "reason should cite value: {}",
                reason
            );
        }
        other => panic!("expected PolicyViolation, got {:?}", other),
    }
    assert!(provider.calls().is_empty());

    match next_event(&mut rx).await {
        TaskEvent::PolicyViolation { task, reason, .. } => {
            assert_eq!(task, "create_file");
            assert!(reason.contains("/etc/passwd"));
        }
        other => panic!("expected PolicyViolation event, got {:?}", other),
    }
}

/// An allowed task triggers exactly one create -> exec -> remove sequence
#[tokio::test]
async fn test_allowed_task_runs_full_lifecycle() {
    let provider = Arc::new(CountingProvider::healthy());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let orchestrator = orchestrator(provider.clone(), Arc::new(ChannelSink { tx }));

    let task = Task::new("create_file", "agent-1").with_parameter("path", "/tmp/out.txt");
    let result = orchestrator.execute(task).await.expect("task should run");

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout, "ok");
    assert_eq!(provider.calls(), vec!["create", "exec", "remove"]);

    match next_event(&mut rx).await {
        TaskEvent::TaskCompleted {
            task,
            requester,
            exit_code,
            ..
        } => {
            assert_eq!(task, "create_file");
            assert_eq!(requester, "agent-1");
            assert_eq!(exit_code, 0);
        }
        other => panic!("expected TaskCompleted event, got {:?}", other),
    }
}

/// A run exceeding its deadline still releases its environment exactly once
#[tokio::test]
async fn test_timeout_terminates_and_releases() {
    let provider = Arc::new(CountingProvider {
        exec_delay: Duration::from_secs(30),
        ..CountingProvider::healthy()
    });
    let orchestrator = orchestrator(provider.clone(), Arc::new(sudo_orchestrator::NoopSink));

    let task = Task::new("create_file", "agent-1").with_parameter("path", "/tmp/out.txt");
    let err = orchestrator
        .execute_with_timeout(task, Duration::from_millis(100))
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestratorError::ExecutionTimeout { .. }));
    assert_eq!(provider.removes.load(Ordering::SeqCst), 1);
}

/// A daemon-unreachable create aborts the call; exec and remove never happen
#[tokio::test]
async fn test_acquisition_failure_aborts_immediately() {
    let provider = Arc::new(CountingProvider {
        fail_create: true,
        ..CountingProvider::healthy()
    });
    let orchestrator = orchestrator(provider.clone(), Arc::new(sudo_orchestrator::NoopSink));

    let task = Task::new("create_file", "agent-1").with_parameter("path", "/tmp/out.txt");
    let err = orchestrator.execute(task).await.unwrap_err();

    assert!(matches!(
        err,
        OrchestratorError::EnvironmentAcquisition { .. }
    ));
    assert_eq!(provider.execs.load(Ordering::SeqCst), 0);
    assert_eq!(provider.removes.load(Ordering::SeqCst), 0);
}

/// Repeated executions of one task are fully independent
#[tokio::test]
async fn test_repeat_executions_use_fresh_environments() {
    let provider = Arc::new(CountingProvider::healthy());
    let orchestrator = orchestrator(provider.clone(), Arc::new(sudo_orchestrator::NoopSink));

    let task = Task::new("create_file", "agent-1").with_parameter("path", "/tmp/out.txt");
    let first = orchestrator.execute(task.clone()).await.unwrap();
    let second = orchestrator.execute(task).await.unwrap();

    assert_ne!(first.execution_id, second.execution_id);
    assert_eq!(provider.creates.load(Ordering::SeqCst), 2);
    assert_eq!(provider.removes.load(Ordering::SeqCst), 2);
}

/// A task that ran and exited non-zero is a result, not an error
#[tokio::test]
async fn test_nonzero_exit_is_returned_as_result() {
    let provider = Arc::new(CountingProvider {
        exit_code: 2,
        ..CountingProvider::healthy()
    });
    let orchestrator = orchestrator(provider.clone(), Arc::new(sudo_orchestrator::NoopSink));

    let task = Task::new("create_file", "agent-1").with_parameter("path", "/tmp/out.txt");
    let result = orchestrator.execute(task).await.expect("run should complete");

    assert_eq!(result.exit_code, 2);
    assert!(!result.success());
    assert_eq!(provider.removes.load(Ordering::SeqCst), 1);
}

/// Sink failures never alter the task's result
#[tokio::test]
async fn test_failing_sink_does_not_alter_result() {
    let provider = Arc::new(CountingProvider::healthy());
    let orchestrator = orchestrator(provider.clone(), Arc::new(FailingSink));

    let task = Task::new("create_file", "agent-1").with_parameter("path", "/tmp/out.txt");
    let result = orchestrator.execute(task).await.expect("task should run");

    assert_eq!(result.exit_code, 0);
}
