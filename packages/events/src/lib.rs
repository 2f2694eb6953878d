// ABOUTME: Event sink abstraction for task outcome notifications
// ABOUTME: Sinks are optional, fire-and-forget, and never on the execution critical path

pub mod ledger;
pub mod types;

pub use ledger::LedgerSink;
pub use types::TaskEvent;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Errors from emitting an event to a sink
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Sink rejected event: {0}")]
    Rejected(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Type alias for Results that return SinkError
pub type Result<T> = std::result::Result<T, SinkError>;

/// Receives task outcome notifications.
///
/// Callers treat emission as fire-and-forget: a failing sink is logged but
/// never alters the outcome of the task that produced the event. The core
/// must function with `NoopSink`.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: &TaskEvent) -> Result<()>;
}

/// Sink that discards every event
#[derive(Debug, Default)]
pub struct NoopSink;

#[async_trait]
impl EventSink for NoopSink {
    async fn emit(&self, event: &TaskEvent) -> Result<()> {
        debug!(event = ?event, "Discarding event (no sink configured)");
        Ok(())
    }
}
