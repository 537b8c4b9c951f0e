//! Report webhook delivery
//!
//! Posts the weekly report array as a JSON body. The receiving script may
//! answer 200 with `{"status": "error", "message": ...}`; that is surfaced as
//! a rejected delivery rather than an error.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::domain::PlayerReport;
use crate::error::{Result, StatsError};

/// How a delivery attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Accepted,
    /// The endpoint answered but reported a script-side error
    Rejected { message: String },
}

/// Destination for the finished report
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn deliver(&self, reports: &[PlayerReport]) -> Result<DeliveryOutcome>;
}

/// Webhook notification client
#[derive(Clone)]
pub struct WebhookSink {
    client: Client,
    webhook_url: String,
}

impl WebhookSink {
    /// Create a new webhook sink with explicit URL
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StatsError::Internal(format!("failed to build webhook client: {}", e)))?;
        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.webhook_url
    }
}

#[async_trait]
impl ReportSink for WebhookSink {
    async fn deliver(&self, reports: &[PlayerReport]) -> Result<DeliveryOutcome> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(reports)
            .send()
            .await
            .map_err(|e| {
                error!("Webhook request failed: {}", e);
                StatsError::Delivery(e.to_string())
            })?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Could not read webhook reply body ({}): {}", status, e);
                String::new()
            }
        };
        if !status.is_success() {
            error!("Webhook delivery failed: {} - {}", status, body);
            return Err(StatsError::Delivery(format!("HTTP {}: {}", status, body)));
        }

        debug!("Webhook delivery accepted ({} report(s))", reports.len());
        Ok(interpret_reply(&body))
    }
}

/// Non-JSON replies (redirect pages, plain "ok") count as accepted
fn interpret_reply(body: &str) -> DeliveryOutcome {
    let Ok(reply) = serde_json::from_str::<Value>(body) else {
        return DeliveryOutcome::Accepted;
    };
    if reply["status"].as_str() == Some("error") {
        let message = reply["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| reply["message"].to_string());
        return DeliveryOutcome::Rejected { message };
    }
    DeliveryOutcome::Accepted
}
