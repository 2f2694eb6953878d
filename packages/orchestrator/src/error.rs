// ABOUTME: External-facing error taxonomy for task execution
// ABOUTME: Callers receive exactly one typed error or one ExecutionResult, never both

use thiserror::Error;

use sudo_sandbox::SandboxError;

/// Errors surfaced to SDK callers.
///
/// Internal phase detail stays behind these variants; the underlying cause
/// is preserved as the error source for diagnostics. A task that ran to
/// completion with a non-zero status is not an error; it returns an
/// `ExecutionResult` carrying the status.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// The policy gate denied the task; no environment was created
    #[error("Task denied by policy: {reason}")]
    PolicyViolation { reason: String },

    /// No isolated environment could be obtained
    #[error("Failed to acquire execution environment: {source}")]
    EnvironmentAcquisition {
        #[source]
        source: SandboxError,
    },

    /// The task ran past its deadline and was terminated
    #[error("Execution timed out after {seconds} seconds")]
    ExecutionTimeout { seconds: u64 },

    /// Startup configuration is unusable (e.g. policy source malformed or missing)
    #[error("Configuration error: {source}")]
    Configuration {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Unexpected internal fault, wrapped with its original cause
    #[error("Internal error: {source}")]
    Internal {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<SandboxError> for OrchestratorError {
    fn from(err: SandboxError) -> Self {
        match err {
            SandboxError::Acquisition(_) => {
                OrchestratorError::EnvironmentAcquisition { source: err }
            }
            SandboxError::Timeout { seconds } => OrchestratorError::ExecutionTimeout { seconds },
            other => OrchestratorError::Internal {
                source: Box::new(other),
            },
        }
    }
}
