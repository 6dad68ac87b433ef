//! ElasticsearchTransmitter - bulk indexing into daily indices

use bytes::{BufMut, BytesMut};
use chrono::{DateTime, Utc};
use contracts::{Batch, ContractError, DeliveryError, Event, Transmitter};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Indexed document: the event plus a top-level `@timestamp`
#[derive(Serialize)]
struct EventDocument<'a> {
    #[serde(rename = "@timestamp")]
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    event: &'a Event,
}

#[derive(Serialize)]
struct BulkAction<'a> {
    index: BulkIndex<'a>,
}

#[derive(Serialize)]
struct BulkIndex<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

impl BulkResponse {
    /// Items whose operation result carries an `error`
    fn failed_items(&self) -> usize {
        self.items
            .iter()
            .filter_map(|item| item.as_object())
            .filter(|ops| ops.values().any(|op| op.get("error").is_some()))
            .count()
    }
}

/// Indexes each batch with one `_bulk` request
#[derive(Debug, Clone)]
pub struct ElasticsearchTransmitter {
    name: String,
    client: reqwest::Client,
    bulk_url: String,
    index_prefix: String,
}

impl ElasticsearchTransmitter {
    /// Create a transmitter for the cluster at `endpoint`
    ///
    /// # Errors
    /// `SinkSetup` when the HTTP client cannot be built
    pub fn new(
        name: impl Into<String>,
        endpoint: &str,
        index_prefix: impl Into<String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let client = super::http_client(&name)?;
        Ok(Self {
            name,
            client,
            bulk_url: format!("{}/_bulk", endpoint.trim_end_matches('/')),
            index_prefix: index_prefix.into(),
        })
    }

    pub fn bulk_url(&self) -> &str {
        &self.bulk_url
    }

    /// Daily index for an event timestamp
    pub fn index_name(&self, timestamp: DateTime<Utc>) -> String {
        format!("{}-{}", self.index_prefix, timestamp.format("%Y.%m.%d"))
    }

    /// Build the NDJSON bulk body: action line, then document line
    fn encode(&self, batch: &Batch) -> Result<BytesMut, DeliveryError> {
        let now = Utc::now();
        let mut buf = BytesMut::with_capacity(batch.len() * 640);

        for event in batch {
            let timestamp = event.timestamp().unwrap_or(now);
            let index = self.index_name(timestamp);

            let action = serde_json::to_vec(&BulkAction {
                index: BulkIndex { index: &index },
            })
            .map_err(|e| DeliveryError::Serialize(e.to_string()))?;
            let document = serde_json::to_vec(&EventDocument { timestamp, event })
                .map_err(|e| DeliveryError::Serialize(e.to_string()))?;

            buf.put_slice(&action);
            buf.put_u8(b'\n');
            buf.put_slice(&document);
            buf.put_u8(b'\n');
        }

        Ok(buf)
    }
}

impl Transmitter for ElasticsearchTransmitter {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "elasticsearch_transmit",
        skip(self, batch),
        fields(sink = %self.name, url = %self.bulk_url, entries = batch.len())
    )]
    async fn transmit(&self, batch: &Batch) -> Result<(), DeliveryError> {
        let body = self.encode(batch)?;

        let response = self
            .client
            .post(&self.bulk_url)
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body.freeze())
            .send()
            .await
            .map_err(|e| DeliveryError::request(&self.bulk_url, e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DeliveryError::rejected(
                &self.bulk_url,
                format!("status {status}: {}", detail.trim()),
            ));
        }

        let bulk: BulkResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::request(&self.bulk_url, e))?;

        if bulk.errors {
            let failed = bulk.failed_items();
            warn!(failed, "Bulk request reported item errors");
            return Err(DeliveryError::rejected(
                &self.bulk_url,
                format!("{failed} of {} items failed", batch.len()),
            ));
        }

        debug!(items = bulk.items.len(), "Bulk request indexed");
        Ok(())
    }
}
