//! # Integration Tests
//!
//! Integration and end-to-end tests.
//!
//! Responsible for:
//! - Contract snapshot tests (config and event wire shapes)
//! - Watch feed -> dispatch engine -> real TCP / HTTP listeners

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{AuthMode, Event, SinkKind};

    #[test]
    fn test_config_toml_round_trip() {
        let toml = r#"
            [sink]
            name = "collector"
            kind = "http"
            endpoint = "https://collector.example.com/events"
            flush_delay_ms = 250
            max_buffer_size = 20
            max_concurrency = 2

            [sink.auth]
            mode = "basic"
            username = "exporter"
            password = "hunter2"

            [metrics]
            port = 9102
        "#;

        let config = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();
        let again = ConfigLoader::load_from_str(
            &ConfigLoader::to_toml(&config).unwrap(),
            ConfigFormat::Toml,
        )
        .unwrap();

        assert_eq!(again.sink.kind, SinkKind::Http);
        assert_eq!(again.sink.common, config.sink.common);
        assert_eq!(again.sink.auth.unwrap().mode, AuthMode::Basic);
        assert_eq!(again.metrics.enabled_port(), Some(9102));
    }

    #[test]
    fn test_event_wire_shape() {
        let mut event = Event::default();
        event.metadata.name = "web-0.17a".into();
        event.involved_object.kind = "Pod".into();
        event.involved_object.api_version = "v1".into();
        event.event_type = "Warning".into();
        event.count = 3;

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["metadata"]["name"], "web-0.17a");
        assert_eq!(json["involvedObject"]["apiVersion"], "v1");
        assert_eq!(json["type"], "Warning");
        assert_eq!(json["count"], 3);
        assert!(json.get("lastTimestamp").is_none());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{
        AuthMode, Event, HttpAuthConfig, SinkCommonConfig, SinkConfig, SinkKind,
    };
    use dispatcher::{create_sink, CancellationToken, ExporterCounters};
    use ingestion::WatchFeed;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    fn added(uid: &str, component: &str) -> String {
        format!(
            r#"{{"type":"ADDED","object":{{"metadata":{{"name":"{uid}","namespace":"default","uid":"{uid}"}},"reason":"Created","count":1,"source":{{"component":"{component}"}}}}}}"#
        )
    }

    fn sink(kind: SinkKind, endpoint: String, common: SinkCommonConfig) -> SinkConfig {
        let mut config = SinkConfig::new(kind);
        config.endpoint = Some(endpoint);
        config.common = common;
        config
    }

    /// Accept connections one after another, forwarding every received line
    async fn tcp_collector() -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let mut lines = BufReader::new(stream).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let _ = tx.send(line);
                }
            }
        });

        (addr, rx)
    }

    /// Answer every request with 200, forwarding `(authorization, body)`
    async fn http_collector() -> (String, mpsc::UnboundedReceiver<(Option<String>, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut reader = BufReader::new(stream);
                    loop {
                        let mut request_line = String::new();
                        if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
                            return;
                        }

                        let mut authorization = None;
                        let mut length = 0usize;
                        loop {
                            let mut line = String::new();
                            reader.read_line(&mut line).await.unwrap();
                            let line = line.trim_end();
                            if line.is_empty() {
                                break;
                            }
                            if let Some((name, value)) = line.split_once(':') {
                                let value = value.trim().to_string();
                                if name.eq_ignore_ascii_case("authorization") {
                                    authorization = Some(value);
                                } else if name.eq_ignore_ascii_case("content-length") {
                                    length = value.parse().unwrap();
                                }
                            }
                        }

                        let mut body = vec![0u8; length];
                        reader.read_exact(&mut body).await.unwrap();
                        let _ = tx.send((authorization, String::from_utf8(body).unwrap()));

                        reader
                            .get_mut()
                            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
                            .await
                            .unwrap();
                    }
                });
            }
        });

        (format!("http://{addr}/ingest"), rx)
    }

    async fn wait_for(mut done: impl FnMut() -> bool) {
        for _ in 0..200 {
            if done() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached within 2s");
    }

    /// Watch feed -> engine -> TCP collector, preserving order
    #[tokio::test]
    async fn test_feed_to_tcp_sink() {
        let (endpoint, mut lines) = tcp_collector().await;
        let counters = Arc::new(ExporterCounters::new());
        let config = sink(
            SinkKind::Tcp,
            endpoint,
            SinkCommonConfig {
                flush_delay_ms: 50,
                max_buffer_size: 4,
                max_concurrency: 1,
            },
        );
        let (handle, engine) = create_sink(&config, Arc::clone(&counters)).unwrap();
        let shutdown = CancellationToken::new();
        let engine_task = engine.spawn(shutdown.clone());

        let input: Vec<String> = (0..10)
            .map(|i| added(&format!("ev-{i}"), if i % 2 == 0 { "kubelet" } else { "scheduler" }))
            .collect();
        let input = input.join("\n");

        let stats = WatchFeed::new()
            .run(input.as_bytes(), &handle, shutdown.clone())
            .await
            .unwrap();
        assert_eq!(stats.added, 10);

        let mut names = Vec::new();
        while names.len() < 10 {
            let line = tokio::time::timeout(Duration::from_secs(2), lines.recv())
                .await
                .expect("collector starved")
                .unwrap();
            let event: Event = serde_json::from_str(&line).unwrap();
            names.push(event.metadata.name);
        }
        let expected: Vec<String> = (0..10).map(|i| format!("ev-{i}")).collect();
        assert_eq!(names, expected);

        wait_for(|| counters.succeeded() == 10).await;
        let snapshot = counters.snapshot();
        assert_eq!(snapshot.received["kubelet"], 5);
        assert_eq!(snapshot.received["scheduler"], 5);
        assert_eq!(snapshot.capacity_flushes, 2);
        assert_eq!(snapshot.timeout_flushes, 1);
        assert_eq!(snapshot.failed, 0);

        shutdown.cancel();
        engine_task.await.unwrap();
    }

    /// Updates reach the sink; deletes and lists do not
    #[tokio::test]
    async fn test_feed_informer_to_http_sink_with_token() {
        let (endpoint, mut requests) = http_collector().await;
        let counters = Arc::new(ExporterCounters::new());
        let mut config = sink(
            SinkKind::Http,
            endpoint,
            SinkCommonConfig {
                flush_delay_ms: 5_000,
                max_buffer_size: 100,
                max_concurrency: 2,
            },
        );
        config.auth = Some(HttpAuthConfig {
            mode: AuthMode::Token,
            token: Some("t0ken".into()),
            ..Default::default()
        });
        let (handle, engine) = create_sink(&config, Arc::clone(&counters)).unwrap();
        let engine_task = engine.spawn(CancellationToken::new());

        let input = [
            r#"{"type":"LIST","items":[]}"#.to_string(),
            added("u1", "kubelet"),
            r#"{"type":"MODIFIED","object":{"metadata":{"name":"u1","uid":"u1"},"count":2,"source":{"component":"kubelet"}}}"#.to_string(),
            r#"{"type":"DELETED","object":{"metadata":{"name":"u1","uid":"u1"},"count":2}}"#.to_string(),
        ]
        .join("\n");

        WatchFeed::new()
            .run(input.as_bytes(), &handle, CancellationToken::new())
            .await
            .unwrap();
        assert!(handle.has_listed());

        // End of input: the engine flushes the remainder and stops
        drop(handle);
        engine_task.await.unwrap();

        let (authorization, body) = tokio::time::timeout(Duration::from_secs(2), requests.recv())
            .await
            .expect("no request received")
            .unwrap();
        assert_eq!(authorization.as_deref(), Some("Bearer t0ken"));

        let events: Vec<Event> = serde_json::from_str(&body).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].count, 1);
        assert_eq!(events[1].count, 2);

        wait_for(|| counters.succeeded() == 2).await;
        assert_eq!(counters.snapshot().input_closed_flushes, 1);
    }

    /// Unreachable sink: every entry is counted as failed, none retried
    #[tokio::test]
    async fn test_unreachable_sink_counts_failures() {
        let endpoint = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().to_string()
        };
        let counters = Arc::new(ExporterCounters::new());
        let config = sink(
            SinkKind::Tcp,
            endpoint,
            SinkCommonConfig {
                flush_delay_ms: 1_000,
                max_buffer_size: 3,
                max_concurrency: 3,
            },
        );
        let (handle, engine) = create_sink(&config, Arc::clone(&counters)).unwrap();
        let shutdown = CancellationToken::new();
        let engine_task = engine.spawn(shutdown.clone());

        let input: Vec<String> = (0..6).map(|i| added(&format!("f{i}"), "kubelet")).collect();
        WatchFeed::new()
            .run(input.join("\n").as_bytes(), &handle, shutdown.clone())
            .await
            .unwrap();

        wait_for(|| counters.failed() == 6).await;
        assert_eq!(counters.succeeded(), 0);
        assert_eq!(counters.snapshot().capacity_flushes, 2);

        shutdown.cancel();
        engine_task.await.unwrap();
    }

    /// Shutdown drops the buffered batch instead of flushing it
    #[tokio::test]
    async fn test_shutdown_abandons_buffer() {
        let (endpoint, mut lines) = tcp_collector().await;
        let counters = Arc::new(ExporterCounters::new());
        let config = sink(
            SinkKind::Tcp,
            endpoint,
            SinkCommonConfig {
                flush_delay_ms: 60_000,
                max_buffer_size: 100,
                max_concurrency: 1,
            },
        );
        let (handle, engine) = create_sink(&config, Arc::clone(&counters)).unwrap();
        let shutdown = CancellationToken::new();
        let engine_task = engine.spawn(shutdown.clone());

        let input: Vec<String> = (0..3).map(|i| added(&format!("s{i}"), "kubelet")).collect();
        WatchFeed::new()
            .run(input.join("\n").as_bytes(), &handle, shutdown.clone())
            .await
            .unwrap();

        shutdown.cancel();
        engine_task.await.unwrap();
        drop(handle);

        assert!(
            tokio::time::timeout(Duration::from_millis(200), lines.recv())
                .await
                .is_err()
        );
        assert_eq!(counters.snapshot().total_received(), 3);
        assert_eq!(counters.snapshot().total_flushes(), 0);
    }
}
