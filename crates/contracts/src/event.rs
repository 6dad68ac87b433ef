//! Event - the unit moved through the pipeline
//!
//! Mirrors the shape of a Kubernetes `core/v1` Event, serialized with the
//! same camelCase field names so downstream consumers see familiar JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One domain occurrence reported by the watch collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Object metadata of the event itself
    #[serde(default)]
    pub metadata: ObjectMeta,

    /// Object this event is about
    #[serde(default)]
    pub involved_object: ObjectReference,

    /// Short machine-readable reason (e.g. `BackOff`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// Component that reported the event
    #[serde(default)]
    pub source: EventSource,

    /// Number of times this event has occurred
    #[serde(default)]
    pub count: i32,

    /// First time the event was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_timestamp: Option<DateTime<Utc>>,

    /// Most recent time the event was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<DateTime<Utc>>,

    /// Event type (`Normal`, `Warning`)
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub event_type: String,

    /// Fields not modelled above (`eventTime`, `action`, `series`, ...),
    /// forwarded untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Object metadata; the keyed fields are typed, the rest (`labels`,
/// `annotations`, `creationTimestamp`, ...) rides along in `extra`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_version: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reference to the object an event describes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field_path: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reporting component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventSource {
    #[serde(default)]
    pub component: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
}

/// Snapshot delivered by an initial listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventList {
    #[serde(default)]
    pub items: Vec<Event>,
}

impl Event {
    /// Component label used for received-entry counting
    pub fn component(&self) -> &str {
        &self.source.component
    }

    /// Store key: the uid when present, otherwise `namespace/name`
    pub fn object_key(&self) -> String {
        if self.metadata.uid.is_empty() {
            format!("{}/{}", self.metadata.namespace, self.metadata.name)
        } else {
            self.metadata.uid.clone()
        }
    }

    /// Best timestamp for the occurrence: last seen, else first seen
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_timestamp.or(self.first_timestamp)
    }
}
