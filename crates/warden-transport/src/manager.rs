//! Transport manager: queue + worker over the configured channels.

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use warden_protocols::{Envelope, Transport};

use crate::channel::TransportChannel;

/// Bounded depth of the outgoing queue. Envelopes past this are dropped;
/// delivery is best-effort and must never hold up a fault handler.
const QUEUE_CAPACITY: usize = 256;

enum Item {
    Envelope(Envelope),
    Flush(oneshot::Sender<()>),
}

/// Fans envelopes out to every configured channel.
///
/// `send` enqueues without blocking; a background worker drains the queue in
/// order and delivers to each channel, logging (never surfacing) failures.
pub struct TransportManager {
    queue: mpsc::Sender<Item>,
    names: Vec<String>,
}

impl TransportManager {
    /// Create a manager and spawn its delivery worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(channels: Vec<Box<dyn TransportChannel>>) -> Self {
        let (queue, mut rx) = mpsc::channel(QUEUE_CAPACITY);
        let names = channels.iter().map(|c| c.name().to_string()).collect();

        tokio::spawn(async move {
            while let Some(item) = rx.recv().await {
                match item {
                    Item::Envelope(envelope) => {
                        for channel in &channels {
                            if let Err(e) = channel.deliver(&envelope).await {
                                warn!(
                                    "Failed to deliver {} via {}: {}",
                                    envelope.event_type,
                                    channel.name(),
                                    e
                                );
                            }
                        }
                    }
                    Item::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
        });

        Self { queue, names }
    }

    /// Names of the configured channels.
    pub fn channel_names(&self) -> Vec<&str> {
        self.names.iter().map(|s| s.as_str()).collect()
    }

    /// Wait until every envelope queued before this call has been delivered.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.queue.send(Item::Flush(ack)).await.is_ok() {
            let _ = done.await;
        }
    }
}

impl Transport for TransportManager {
    fn send(&self, envelope: Envelope) {
        if let Err(e) = self.queue.try_send(Item::Envelope(envelope)) {
            debug!("Transport queue rejected envelope: {}", e);
        }
    }
}
