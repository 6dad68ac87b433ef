//! TcpTransmitter - line-delimited JSON over a fresh TCP connection

use bytes::{BufMut, BytesMut};
use contracts::{Batch, DeliveryError, Transmitter};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, instrument};

/// Sends every event of a batch as one JSON line
///
/// A new connection is opened per batch and closed once the batch is
/// written.
#[derive(Debug, Clone)]
pub struct TcpTransmitter {
    name: String,
    endpoint: String,
}

impl TcpTransmitter {
    /// Create a transmitter for `endpoint` (`host:port`)
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Encode the whole batch before touching the network
    fn encode(batch: &Batch) -> Result<BytesMut, DeliveryError> {
        let mut buf = BytesMut::with_capacity(batch.len() * 512);
        for event in batch {
            let line =
                serde_json::to_vec(event).map_err(|e| DeliveryError::Serialize(e.to_string()))?;
            buf.put_slice(&line);
            buf.put_u8(b'\n');
        }
        Ok(buf)
    }
}

impl Transmitter for TcpTransmitter {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "tcp_transmit",
        skip(self, batch),
        fields(sink = %self.name, endpoint = %self.endpoint, entries = batch.len())
    )]
    async fn transmit(&self, batch: &Batch) -> Result<(), DeliveryError> {
        let payload = Self::encode(batch)?;

        let mut stream = TcpStream::connect(&self.endpoint)
            .await
            .map_err(|e| DeliveryError::connect(&self.endpoint, e))?;

        stream
            .write_all(&payload)
            .await
            .map_err(|e| DeliveryError::write(&self.endpoint, e))?;
        stream
            .flush()
            .await
            .map_err(|e| DeliveryError::write(&self.endpoint, e))?;
        stream
            .shutdown()
            .await
            .map_err(|e| DeliveryError::write(&self.endpoint, e))?;

        debug!(bytes = payload.len(), "Batch written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Event;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn batch(names: &[&str]) -> Batch {
        Batch::new(
            names
                .iter()
                .map(|name| {
                    let mut event = Event::default();
                    event.metadata.name = name.to_string();
                    event.reason = "Pulled".to_string();
                    event
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_writes_one_line_per_event() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let reader = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = String::new();
            stream.read_to_string(&mut received).await.unwrap();
            received
        });

        let transmitter = TcpTransmitter::new("tcp", addr.to_string());
        transmitter.transmit(&batch(&["a", "b", "c"])).await.unwrap();

        let received = reader.await.unwrap();
        let lines: Vec<_> = received.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(received.ends_with('\n'));

        let decoded: Event = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(decoded.metadata.name, "b");
        assert_eq!(decoded.reason, "Pulled");
    }

    #[tokio::test]
    async fn test_connect_failure() {
        // Bind then drop to get a port nobody listens on
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let transmitter = TcpTransmitter::new("tcp", addr.to_string());
        let err = transmitter.transmit(&batch(&["a"])).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Connect { .. }));
    }
}
