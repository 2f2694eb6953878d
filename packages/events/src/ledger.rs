// ABOUTME: HTTP sink posting task events to an external ledger endpoint
// ABOUTME: A narrow logging interface; no transaction signing or chain semantics

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::types::TaskEvent;
use crate::{EventSink, Result, SinkError};

/// Posts each event as a JSON document to a configured endpoint.
///
/// Requests are bounded by the client timeout so a slow ledger can never
/// stall an emitting caller for long.
pub struct LedgerSink {
    http_client: Client,
    endpoint: String,
}

impl LedgerSink {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl EventSink for LedgerSink {
    async fn emit(&self, event: &TaskEvent) -> Result<()> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(event)
            .send()
            .await
            .map_err(|e| SinkError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(endpoint = %self.endpoint, "Event accepted by ledger");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(SinkError::Rejected(body))
        }
    }
}
