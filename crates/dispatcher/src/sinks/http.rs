//! HttpTransmitter - JSON array POST to an HTTP collector

use contracts::{Batch, ContractError, Credentials, DeliveryError, Transmitter};
use tracing::{debug, instrument};

/// Posts each batch as one JSON array
#[derive(Debug, Clone)]
pub struct HttpTransmitter {
    name: String,
    client: reqwest::Client,
    endpoint: String,
    credentials: Option<Credentials>,
}

impl HttpTransmitter {
    /// Create a transmitter posting to `endpoint`
    ///
    /// # Errors
    /// `SinkSetup` when the HTTP client cannot be built
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        credentials: Option<Credentials>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let client = super::http_client(&name)?;
        Ok(Self {
            name,
            client,
            endpoint: endpoint.into(),
            credentials,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, body: Vec<u8>) -> reqwest::RequestBuilder {
        let request = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        match &self.credentials {
            Some(Credentials::Basic { username, password }) => {
                request.basic_auth(username, Some(password))
            }
            Some(Credentials::Bearer { token }) => {
                request.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"))
            }
            None => request,
        }
    }
}

impl Transmitter for HttpTransmitter {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "http_transmit",
        skip(self, batch),
        fields(sink = %self.name, endpoint = %self.endpoint, entries = batch.len())
    )]
    async fn transmit(&self, batch: &Batch) -> Result<(), DeliveryError> {
        let body = serde_json::to_vec(batch.events())
            .map_err(|e| DeliveryError::Serialize(e.to_string()))?;

        let response = self
            .request(body)
            .send()
            .await
            .map_err(|e| DeliveryError::request(&self.endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DeliveryError::rejected(
                &self.endpoint,
                format!("status {status}: {}", detail.trim()),
            ));
        }

        debug!(status = status.as_u16(), "Batch accepted");
        Ok(())
    }
}
