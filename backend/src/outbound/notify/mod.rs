//! Swap notification adapters.
//!
//! The lifecycle service treats notification delivery as best-effort, so
//! both adapters here own transport details only: the tracing notifier
//! records the event in the structured log, and the webhook notifier POSTs a
//! small JSON payload to a configured endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::info;

use crate::domain::ports::{SwapNotifier, SwapNotifierError};
use crate::domain::swap::SwapRequest;

const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Notifier that records swap requests in the structured log.
///
/// The default channel when no webhook endpoint is configured; it keeps the
/// notification path observable without external infrastructure.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSwapNotifier;

#[async_trait]
impl SwapNotifier for TracingSwapNotifier {
    async fn swap_requested(&self, swap: &SwapRequest) -> Result<(), SwapNotifierError> {
        info!(
            swap_id = %swap.id(),
            requester_id = %swap.requester_id(),
            recipient_id = %swap.recipient_id(),
            offered_skill = swap.offered_skill().name(),
            requested_skill = swap.requested_skill().name(),
            "swap request created"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwapRequestedPayload<'a> {
    event: &'static str,
    swap_id: String,
    requester_id: String,
    recipient_id: String,
    offered_skill: &'a str,
    requested_skill: &'a str,
}

/// Notifier that POSTs swap events to a configured webhook endpoint.
pub struct WebhookSwapNotifier {
    client: Client,
    endpoint: Url,
}

impl WebhookSwapNotifier {
    /// Build an adapter with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, DEFAULT_WEBHOOK_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl SwapNotifier for WebhookSwapNotifier {
    async fn swap_requested(&self, swap: &SwapRequest) -> Result<(), SwapNotifierError> {
        let payload = SwapRequestedPayload {
            event: "swap.requested",
            swap_id: swap.id().to_string(),
            requester_id: swap.requester_id().to_string(),
            recipient_id: swap.recipient_id().to_string(),
            offered_skill: swap.offered_skill().name(),
            requested_skill: swap.requested_skill().name(),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|err| SwapNotifierError::delivery(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SwapNotifierError::delivery(format!(
                "webhook answered {status}"
            )));
        }
        Ok(())
    }
}
