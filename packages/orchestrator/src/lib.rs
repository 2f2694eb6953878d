// ABOUTME: Public SDK surface for policy-gated task execution
// ABOUTME: Re-exports the orchestrator and the collaborator types it composes

pub mod error;
pub mod orchestrator;

pub use error::OrchestratorError;
pub use orchestrator::{Orchestrator, TaskDefaults};

// Re-export the SDK surface so embedders depend on one crate
pub use sudo_config::Config;
pub use sudo_events::{EventSink, LedgerSink, NoopSink, SinkError, TaskEvent};
pub use sudo_policy::{Decision, PolicyEngine, PolicySet, Task};
pub use sudo_sandbox::{
    ContainerConfig, DockerProvider, ExecResult, ExecutionResult, Provider, ProviderError,
    RunRequest, SandboxRunner,
};
