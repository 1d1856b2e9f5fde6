//! # Warden Protocols
//!
//! Shared contracts between the Warden agent and its monitoring features:
//!
//! - The transport envelope and the fire-and-forget [`Transport`] contract
//! - The [`ErrorLike`] union over the fault shapes the capture paths accept
//! - The [`Feature`] lifecycle trait implemented by features and delegates
//! - [`jsonize`], the never-failing serialization helper

pub mod envelope;
pub mod error;
pub mod errorlike;
pub mod feature;
pub mod json;
pub mod transport;

pub use envelope::Envelope;
pub use error::FeatureError;
pub use errorlike::{CapturedError, ErrorLike};
pub use feature::Feature;
pub use json::jsonize;
pub use transport::Transport;
