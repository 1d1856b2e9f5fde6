//! Tests for the transport manager and channels.

use super::*;
use crate::channel::{LogChannel, MemoryChannel};

#[tokio::test]
async fn test_manager_delivers_in_order() {
    let capture = MemoryChannel::new();
    let manager = TransportManager::new(vec![Box::new(capture.clone())]);

    manager.send(Envelope::new("a", serde_json::json!(1)));
    manager.send(Envelope::new("b", serde_json::json!(2)));
    manager.send(Envelope::new("c", serde_json::json!(3)));
    manager.flush().await;

    let kinds: Vec<String> = capture
        .envelopes()
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(kinds, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_manager_fans_out_to_all_channels() {
    let first = MemoryChannel::new();
    let second = MemoryChannel::new();
    let manager = TransportManager::new(vec![
        Box::new(first.clone()),
        Box::new(LogChannel),
        Box::new(second.clone()),
    ]);

    manager.send(Envelope::exception(serde_json::json!({"message": "boom"})));
    manager.flush().await;

    assert_eq!(first.envelopes().len(), 1);
    assert_eq!(second.envelopes().len(), 1);
}

#[tokio::test]
async fn test_channel_names() {
    let manager = TransportManager::new(vec![Box::new(LogChannel), Box::new(MemoryChannel::new())]);
    assert_eq!(manager.channel_names(), vec!["log", "memory"]);
}

#[tokio::test]
async fn test_flush_with_empty_queue() {
    let manager = TransportManager::new(vec![Box::new(LogChannel)]);
    manager.flush().await;
}
