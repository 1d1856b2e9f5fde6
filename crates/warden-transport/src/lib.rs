//! # Warden Transport
//!
//! Delivery layer between the monitoring core and the backend. Envelopes are
//! queued by [`TransportManager::send`] (fire-and-forget, never blocks the
//! fault path) and drained by a background worker into every configured
//! channel.

mod channel;
mod error;
mod manager;
mod stream;
mod webhook;

pub use channel::{LogChannel, MemoryChannel, TransportChannel};
pub use error::TransportError;
pub use manager::TransportManager;
pub use stream::StreamChannel;
pub use webhook::WebhookChannel;
