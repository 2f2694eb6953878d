// ABOUTME: Error types for policy loading and evaluation
// ABOUTME: Startup failures are fatal; evaluation faults never degrade into a silent allow

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading or evaluating policies
#[derive(Error, Debug)]
pub enum PolicyError {
    /// Policy file could not be read
    #[error("Failed to read policy file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Policy document is not valid JSON or has an unexpected shape
    #[error("Failed to parse policy document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A rule is internally inconsistent
    #[error("Invalid rule for action '{action}': {reason}")]
    InvalidRule { action: String, reason: String },

    /// Internal fault during evaluation
    #[error("Policy evaluation failed: {0}")]
    Evaluation(String),
}

/// Type alias for Results that return PolicyError
pub type Result<T> = std::result::Result<T, PolicyError>;
