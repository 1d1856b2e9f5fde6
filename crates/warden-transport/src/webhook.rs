//! HTTP webhook channel.

use async_trait::async_trait;
use tracing::debug;

use warden_protocols::Envelope;

use crate::channel::TransportChannel;
use crate::error::TransportError;

/// Posts each envelope as JSON to a backend ingestion URL.
pub struct WebhookChannel {
    url: String,
    client: reqwest::Client,
}

impl WebhookChannel {
    /// Create a new webhook channel.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TransportChannel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.url)
            .json(envelope)
            .send()
            .await
            .map_err(|e| TransportError::Delivery(format!("Webhook request failed: {}", e)))?;

        if response.status().is_success() {
            debug!("Webhook envelope delivered");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(TransportError::Delivery(format!(
                "Webhook returned {}: {}",
                status, body
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_channel_new() {
        let channel = WebhookChannel::new("http://127.0.0.1:9999/ingest");
        assert_eq!(channel.name(), "webhook");
    }
}
