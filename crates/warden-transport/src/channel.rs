//! Channel trait and in-process channel implementations.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;

use warden_protocols::Envelope;

use crate::error::TransportError;

/// A single delivery target for envelopes.
#[async_trait]
pub trait TransportChannel: Send + Sync {
    /// Channel name.
    fn name(&self) -> &str;

    /// Deliver one envelope.
    async fn deliver(&self, envelope: &Envelope) -> Result<(), TransportError>;
}

/// Log channel (writes to tracing).
pub struct LogChannel;

#[async_trait]
impl TransportChannel for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<(), TransportError> {
        info!("[{}] {}", envelope.event_type, envelope.data);
        Ok(())
    }
}

/// In-memory capture channel for tests.
#[derive(Clone, Default)]
pub struct MemoryChannel {
    envelopes: Arc<Mutex<Vec<Envelope>>>,
}

impl MemoryChannel {
    /// Create an empty capture channel. Clones share the same buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Envelopes captured so far, in delivery order.
    pub fn envelopes(&self) -> Vec<Envelope> {
        self.envelopes.lock().expect("memory channel poisoned").clone()
    }
}

#[async_trait]
impl TransportChannel for MemoryChannel {
    fn name(&self) -> &str {
        "memory"
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<(), TransportError> {
        self.envelopes
            .lock()
            .expect("memory channel poisoned")
            .push(envelope.clone());
        Ok(())
    }
}
