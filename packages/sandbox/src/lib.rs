// ABOUTME: Container lifecycle management for the Sudo SDK
// ABOUTME: Acquire, execute, and release isolated environments with guaranteed teardown

pub mod error;
pub mod providers;
pub mod runner;
pub mod types;

pub use error::SandboxError;
pub use providers::{ContainerConfig, DockerProvider, ExecResult, Provider, ProviderError};
pub use runner::SandboxRunner;
pub use types::{ExecutionResult, ExecutionState, RunRequest};
