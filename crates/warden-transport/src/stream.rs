//! JSON-lines stream channel.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use warden_protocols::Envelope;

use crate::channel::TransportChannel;
use crate::error::TransportError;

/// Writes each envelope as one JSON line to an async writer.
///
/// This is the agent's IPC surface: the supervising process reads envelopes
/// off the agent's stdout (or any other pipe handed in).
pub struct StreamChannel<W> {
    writer: Mutex<W>,
}

impl StreamChannel<tokio::io::Stdout> {
    /// Stream channel over the process stdout.
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> StreamChannel<W> {
    /// Stream channel over an arbitrary writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

#[async_trait]
impl<W: AsyncWrite + Send + Unpin> TransportChannel for StreamChannel<W> {
    fn name(&self) -> &str {
        "stream"
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<(), TransportError> {
        let mut line =
            serde_json::to_vec(envelope).map_err(|e| TransportError::Serialize(e.to_string()))?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&line)
            .await
            .map_err(|e| TransportError::Delivery(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| TransportError::Delivery(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncBufReadExt;

    #[tokio::test]
    async fn test_stream_channel_writes_json_lines() {
        let (writer, reader) = tokio::io::duplex(1024);
        let channel = StreamChannel::new(writer);

        channel
            .deliver(&Envelope::exception(serde_json::json!({"message": "boom"})))
            .await
            .unwrap();

        let mut lines = tokio::io::BufReader::new(reader).lines();
        let line = lines.next_line().await.unwrap().unwrap();
        let parsed: Envelope = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed.event_type, "process:exception");
        assert_eq!(parsed.data["message"], "boom");
    }

    #[tokio::test]
    async fn test_stream_channel_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("envelopes.jsonl");
        let file = tokio::fs::File::create(&path).await.unwrap();
        let channel = StreamChannel::new(file);

        channel
            .deliver(&Envelope::new("a", serde_json::json!(1)))
            .await
            .unwrap();
        channel
            .deliver(&Envelope::new("b", serde_json::json!(2)))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
