//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - configuration contract (legacy camelCase option names)
//! - full relay against in-process fake sensor, ThingSpeak and ThingsBoard
//! - fatal reader failure leaving every sink untouched
//! - a rejecting HTTP peer failing only its own sink

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{DispatchMode, HostKeyPolicy};

    #[test]
    fn test_legacy_option_names_load() {
        let json = r#"{
            "keyPath": "/home/pi/.ssh/id_rsa",
            "host": "192.168.1.3:22",
            "temperatureHost": "http://192.168.1.4",
            "thingspeakApiKey": "TS",
            "thingsboardApiKey": "TB",
            "thingsboardDomain": "demo.thingsboard.io"
        }"#;

        let config = ConfigLoader::load_from_str(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.thingsboard_domain, "demo.thingsboard.io");
        assert_eq!(config.host_key_policy, HostKeyPolicy::Verify);
        assert_eq!(config.dispatch_mode, DispatchMode::Concurrent);

        // exported TOML reloads to the same run
        let toml = ConfigLoader::to_toml(&config).unwrap();
        let reloaded = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        assert_eq!(reloaded.key_path, config.key_path);
        assert_eq!(reloaded.sink_timeout(), config.sink_timeout());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::body::Bytes;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Form, Router};

    use config_loader::ConfigLoader;
    use contracts::{RelayConfig, SinkStatus};
    use dispatcher::sinks::{REMOTE_SHELL_SINK, THINGSBOARD_SINK, THINGSPEAK_SINK};
    use dispatcher::{create_dispatcher, relay, DispatcherError};
    use ingestion::HttpReader;

    /// Everything the fake services saw
    #[derive(Default)]
    struct Seen {
        sensor_hits: AtomicU64,
        thingspeak: Mutex<Vec<HashMap<String, String>>>,
        thingsboard: Mutex<Vec<(String, Bytes)>>,
    }

    /// Status codes the fake peers answer with
    #[derive(Clone, Copy)]
    struct Replies {
        sensor: StatusCode,
        thingspeak: StatusCode,
        thingsboard: StatusCode,
    }

    impl Replies {
        fn ok() -> Self {
            Self {
                sensor: StatusCode::OK,
                thingspeak: StatusCode::OK,
                thingsboard: StatusCode::OK,
            }
        }
    }

    /// One server playing the sensor, ThingSpeak and ThingsBoard
    async fn spawn_fake_services(
        sensor_status: StatusCode,
        reading: &'static str,
    ) -> (String, Arc<Seen>) {
        let replies = Replies {
            sensor: sensor_status,
            ..Replies::ok()
        };
        spawn_fake_services_with(replies, reading).await
    }

    async fn spawn_fake_services_with(
        replies: Replies,
        reading: &'static str,
    ) -> (String, Arc<Seen>) {
        let seen = Arc::new(Seen::default());

        let router = Router::new()
            .route(
                "/temperature",
                get(move |State(seen): State<Arc<Seen>>| async move {
                    seen.sensor_hits.fetch_add(1, Ordering::SeqCst);
                    (replies.sensor, reading)
                }),
            )
            .route(
                "/update",
                post(
                    move |State(seen): State<Arc<Seen>>,
                          Form(form): Form<HashMap<String, String>>| async move {
                        seen.thingspeak.lock().unwrap().push(form);
                        (replies.thingspeak, "42")
                    },
                ),
            )
            .route(
                "/api/v1/{key}/telemetry",
                post(
                    move |State(seen): State<Arc<Seen>>,
                          Path(key): Path<String>,
                          body: Bytes| async move {
                        seen.thingsboard.lock().unwrap().push((key, body));
                        replies.thingsboard
                    },
                ),
            )
            .with_state(Arc::clone(&seen));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (addr.to_string(), seen)
    }

    /// Config pointing every HTTP peer at the fake services; the remote
    /// shell key does not exist, so that sink always fails.
    fn write_config(authority: &str) -> tempfile::NamedTempFile {
        let content = format!(
            r#"
keyPath = "/nonexistent/id_rsa"
host = "127.0.0.1:1"
temperatureHost = "http://{authority}/temperature"
thingspeakApiKey = "TS-WRITE"
thingsboardApiKey = "DEVICE-TOKEN"
thingsboardDomain = "{authority}"
thingspeak_endpoint = "http://{authority}"
thingsboard_scheme = "http"
sink_timeout_secs = 5
"#
        );
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn reader(config: &RelayConfig) -> HttpReader {
        HttpReader::new(&config.temperature_host, Duration::from_secs(5)).unwrap()
    }

    /// End-to-end: fake sensor -> HttpReader -> Dispatcher -> three sinks
    ///
    /// The remote shell fails (missing key) while both HTTP sinks still
    /// receive the same reading.
    #[tokio::test]
    async fn test_e2e_relay_with_isolated_failure() {
        let (authority, seen) = spawn_fake_services(StatusCode::OK, "21.5").await;
        let file = write_config(&authority);
        let config = ConfigLoader::load_from_path(file.path()).unwrap();

        let dispatcher = create_dispatcher(&config).unwrap();
        let report = relay(&reader(&config), dispatcher).await.unwrap();

        assert_eq!(seen.sensor_hits.load(Ordering::SeqCst), 1);
        assert_eq!(report.reading, "21.5");
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.delivered_count(), 2);
        assert_eq!(report.failed_count(), 1);

        assert!(matches!(
            report.outcome(REMOTE_SHELL_SINK).unwrap().status,
            SinkStatus::Failed { .. }
        ));
        assert_eq!(
            report.outcome(THINGSPEAK_SINK).unwrap().status,
            SinkStatus::Delivered
        );
        assert_eq!(
            report.outcome(THINGSBOARD_SINK).unwrap().status,
            SinkStatus::Delivered
        );

        let thingspeak = seen.thingspeak.lock().unwrap();
        assert_eq!(thingspeak.len(), 1);
        assert_eq!(thingspeak[0]["api_key"], "TS-WRITE");
        assert_eq!(thingspeak[0]["field1"], "21.5");

        let thingsboard = seen.thingsboard.lock().unwrap();
        assert_eq!(thingsboard.len(), 1);
        assert_eq!(thingsboard[0].0, "DEVICE-TOKEN");
        assert_eq!(&thingsboard[0].1[..], br#"{"temperature":"21.5"}"#);
    }

    /// A sensor answering 503 aborts the run before any sink is called
    #[tokio::test]
    async fn test_e2e_reader_failure_touches_no_sink() {
        let (authority, seen) =
            spawn_fake_services(StatusCode::SERVICE_UNAVAILABLE, "warming up").await;
        let file = write_config(&authority);
        let config = ConfigLoader::load_from_path(file.path()).unwrap();

        let dispatcher = create_dispatcher(&config).unwrap();
        let err = relay(&reader(&config), dispatcher).await.unwrap_err();

        assert!(matches!(err, DispatcherError::Source(ref e) if e.is_fatal()));
        assert_eq!(seen.sensor_hits.load(Ordering::SeqCst), 1);
        assert!(seen.thingspeak.lock().unwrap().is_empty());
        assert!(seen.thingsboard.lock().unwrap().is_empty());
    }

    /// Sequential mode delivers the same way, one sink at a time
    #[tokio::test]
    async fn test_e2e_sequential_mode() {
        let (authority, seen) = spawn_fake_services(StatusCode::OK, "19.0\n").await;
        let file = write_config(&authority);
        let mut config = ConfigLoader::load_from_path(file.path()).unwrap();
        config.dispatch_mode = contracts::DispatchMode::Sequential;

        let dispatcher = create_dispatcher(&config).unwrap();
        let report = relay(&reader(&config), dispatcher).await.unwrap();

        assert_eq!(report.delivered_count(), 2);
        // body passed through untrimmed
        assert_eq!(seen.thingspeak.lock().unwrap()[0]["field1"], "19.0\n");
        assert_eq!(
            &seen.thingsboard.lock().unwrap()[0].1[..],
            br#"{"temperature":"19.0\n"}"#
        );
    }

    /// ThingSpeak answering 500 fails only the ThingSpeak sink
    #[tokio::test]
    async fn test_e2e_thingspeak_error_spares_thingsboard() {
        let replies = Replies {
            thingspeak: StatusCode::INTERNAL_SERVER_ERROR,
            ..Replies::ok()
        };
        let (authority, seen) = spawn_fake_services_with(replies, "22.0").await;
        let file = write_config(&authority);
        let config = ConfigLoader::load_from_path(file.path()).unwrap();

        let dispatcher = create_dispatcher(&config).unwrap();
        let report = relay(&reader(&config), dispatcher).await.unwrap();

        assert_eq!(report.attempted(), 3);
        assert_eq!(report.delivered_count(), 1);
        assert!(matches!(
            report.outcome(THINGSPEAK_SINK).unwrap().status,
            SinkStatus::Failed { .. }
        ));
        assert!(matches!(
            report.outcome(REMOTE_SHELL_SINK).unwrap().status,
            SinkStatus::Failed { .. }
        ));
        assert_eq!(
            report.outcome(THINGSBOARD_SINK).unwrap().status,
            SinkStatus::Delivered
        );

        // the request still reached ThingSpeak before it was rejected
        assert_eq!(seen.thingspeak.lock().unwrap().len(), 1);
        let thingsboard = seen.thingsboard.lock().unwrap();
        assert_eq!(thingsboard.len(), 1);
        assert_eq!(&thingsboard[0].1[..], br#"{"temperature":"22.0"}"#);
    }

    /// ThingsBoard answering 401 fails only the ThingsBoard sink
    #[tokio::test]
    async fn test_e2e_thingsboard_unauthorized_spares_thingspeak() {
        let replies = Replies {
            thingsboard: StatusCode::UNAUTHORIZED,
            ..Replies::ok()
        };
        let (authority, seen) = spawn_fake_services_with(replies, "23.5").await;
        let file = write_config(&authority);
        let config = ConfigLoader::load_from_path(file.path()).unwrap();

        let dispatcher = create_dispatcher(&config).unwrap();
        let report = relay(&reader(&config), dispatcher).await.unwrap();

        assert_eq!(report.attempted(), 3);
        assert_eq!(report.delivered_count(), 1);
        assert!(matches!(
            report.outcome(THINGSBOARD_SINK).unwrap().status,
            SinkStatus::Failed { .. }
        ));
        assert_eq!(
            report.outcome(THINGSPEAK_SINK).unwrap().status,
            SinkStatus::Delivered
        );

        assert_eq!(seen.thingsboard.lock().unwrap().len(), 1);
        let thingspeak = seen.thingspeak.lock().unwrap();
        assert_eq!(thingspeak.len(), 1);
        assert_eq!(thingspeak[0]["field1"], "23.5");
    }
}
