//! Exporter metric recording
//!
//! Thin wrappers over the `metrics` facade so every crate reports under the
//! same names and labels. Whatever recorder is installed (Prometheus in the
//! binary, none in most tests) receives the values.

use metrics::{counter, gauge};

/// Events received from the watch, labelled by reporting component
pub const RECEIVED_ENTRY_COUNT: &str = "event_exporter_received_entry_count";
/// Events delivered by a successful transmission
pub const SUCCESSFULLY_SENT_ENTRY_COUNT: &str = "event_exporter_successfully_sent_entry_count";
/// Events lost to a failed transmission
pub const FAILED_SENT_ENTRY_COUNT: &str = "event_exporter_failed_sent_entry_count";
/// Batches flushed, labelled by trigger
pub const BATCHES_FLUSHED_TOTAL: &str = "event_exporter_batches_flushed_total";
/// Transmissions currently holding a concurrency slot
pub const IN_FLIGHT_TRANSMISSIONS: &str = "event_exporter_in_flight_transmissions";
/// Watch feed lines that could not be decoded
pub const FEED_DECODE_ERRORS_TOTAL: &str = "event_exporter_feed_decode_errors_total";

/// Record one received event
pub fn record_received(component: &str) {
    counter!(RECEIVED_ENTRY_COUNT, "component" => component.to_string()).increment(1);
}

/// Record a successful transmission of `entries` events
pub fn record_sent(entries: usize) {
    counter!(SUCCESSFULLY_SENT_ENTRY_COUNT).increment(entries as u64);
}

/// Record a failed transmission of `entries` events
pub fn record_failed(entries: usize) {
    counter!(FAILED_SENT_ENTRY_COUNT).increment(entries as u64);
}

/// Record one flushed batch
pub fn record_flush(reason: &'static str) {
    counter!(BATCHES_FLUSHED_TOTAL, "reason" => reason).increment(1);
}

/// Record the number of transmissions in flight
pub fn record_in_flight(sink: &str, in_flight: usize) {
    gauge!(IN_FLIGHT_TRANSMISSIONS, "sink" => sink.to_string()).set(in_flight as f64);
}

/// Record an undecodable watch feed line
pub fn record_feed_decode_error() {
    counter!(FEED_DECODE_ERRORS_TOTAL).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_received("kubelet");
        record_sent(3);
        record_failed(2);
        record_flush("timeout");
        record_in_flight("events", 1);
        record_feed_decode_error();
    }
}
