//! Transmitter implementations
//!
//! Contains ElasticsearchTransmitter, HttpTransmitter, and TcpTransmitter.

mod elasticsearch;
mod http;
mod tcp;

use std::time::Duration;

use contracts::{Batch, ContractError, DeliveryError, Transmitter};

pub use self::elasticsearch::ElasticsearchTransmitter;
pub use self::http::HttpTransmitter;
pub use self::tcp::TcpTransmitter;

/// Per-request timeout for the HTTP based transmitters
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by one transmitter's requests
pub(crate) fn http_client(sink_name: &str) -> Result<reqwest::Client, ContractError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ContractError::sink_setup(sink_name, format!("failed to build HTTP client: {e}")))
}

/// The configured transmitter, selected by sink kind
#[derive(Debug)]
pub enum SinkTransmitter {
    Elasticsearch(ElasticsearchTransmitter),
    Http(HttpTransmitter),
    Tcp(TcpTransmitter),
}

impl Transmitter for SinkTransmitter {
    fn name(&self) -> &str {
        match self {
            Self::Elasticsearch(t) => t.name(),
            Self::Http(t) => t.name(),
            Self::Tcp(t) => t.name(),
        }
    }

    async fn transmit(&self, batch: &Batch) -> Result<(), DeliveryError> {
        match self {
            Self::Elasticsearch(t) => t.transmit(batch).await,
            Self::Http(t) => t.transmit(batch).await,
            Self::Tcp(t) => t.transmit(batch).await,
        }
    }
}

impl From<ElasticsearchTransmitter> for SinkTransmitter {
    fn from(t: ElasticsearchTransmitter) -> Self {
        Self::Elasticsearch(t)
    }
}

impl From<HttpTransmitter> for SinkTransmitter {
    fn from(t: HttpTransmitter) -> Self {
        Self::Http(t)
    }
}

impl From<TcpTransmitter> for SinkTransmitter {
    fn from(t: TcpTransmitter) -> Self {
        Self::Tcp(t)
    }
}

/// Minimal one-shot HTTP responder for transmitter tests
#[cfg(test)]
pub(crate) mod testing {
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// One request as seen by the responder
    #[derive(Debug)]
    pub struct CapturedRequest {
        pub request_line: String,
        pub headers: Vec<(String, String)>,
        pub body: Vec<u8>,
    }

    impl CapturedRequest {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        pub fn body_str(&self) -> &str {
            std::str::from_utf8(&self.body).unwrap()
        }
    }

    /// Serve exactly one request, answering with `status` and `body`
    pub async fn respond_once(
        status: u16,
        body: &'static str,
    ) -> (String, oneshot::Receiver<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).await.unwrap();

            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).await.unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((k, v)) = line.split_once(':') {
                    headers.push((k.trim().to_string(), v.trim().to_string()));
                }
            }

            let length = headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                .map(|(_, v)| v.parse::<usize>().unwrap())
                .unwrap_or(0);
            let mut payload = vec![0u8; length];
            reader.read_exact(&mut payload).await.unwrap();

            let response = format!(
                "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;

            let _ = tx.send(CapturedRequest {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: payload,
            });
        });

        (format!("http://{addr}"), rx)
    }
}
