// ABOUTME: Error types for sandbox lifecycle execution
// ABOUTME: Distinguishes could-not-run faults from ran-and-failed results

use thiserror::Error;

use crate::providers::ProviderError;

/// Errors produced by the sandbox runner.
///
/// A non-zero exit status is not represented here: a task that ran to
/// completion returns an `ExecutionResult` carrying its status instead.
#[derive(Error, Debug)]
pub enum SandboxError {
    /// No isolated environment could be obtained
    #[error("Failed to acquire execution environment: {0}")]
    Acquisition(#[source] ProviderError),

    /// The environment existed but the command could not be run in it
    #[error("Failed to execute task in environment: {0}")]
    Execution(#[source] ProviderError),

    /// Execution exceeded its deadline and the environment was terminated
    #[error("Execution timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Unexpected internal fault
    #[error("Internal sandbox error: {0}")]
    Internal(String),
}

/// Type alias for Results that return SandboxError
pub type Result<T> = std::result::Result<T, SandboxError>;
