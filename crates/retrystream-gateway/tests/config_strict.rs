#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use retrystream_gateway::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
feed:
  tick_intervl_ms: 250 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.stream_path, "/hystrix.stream");
    assert_eq!(cfg.feed.tick_interval(), Duration::from_millis(500));
    assert_eq!(cfg.feed.subscriber_buffer, 256);
    assert_eq!(cfg.statistics.rolling_window(), Duration::from_secs(15));
    assert!(!cfg.gateway.demo_routes);
}

#[test]
fn full_config_round_trips_into_sections() {
    let ok = r#"
version: 1
gateway:
  listen: "127.0.0.1:9000"
  stream_path: "/feed"
  demo_routes: true
feed:
  tick_interval_ms: 100
  subscriber_buffer: 8
statistics:
  rolling_window_ms: 5000
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.gateway.listen, "127.0.0.1:9000");
    assert_eq!(cfg.gateway.stream_path, "/feed");
    assert!(cfg.gateway.demo_routes);
    assert_eq!(cfg.feed.tick_interval_ms, 100);
    assert_eq!(cfg.feed.subscriber_buffer, 8);
    assert_eq!(cfg.statistics.rolling_window_ms, 5000);
}

#[test]
fn unsupported_version_is_rejected() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn out_of_range_values_are_rejected() {
    for bad in [
        "version: 1\nfeed:\n  tick_interval_ms: 0\n",
        "version: 1\nfeed:\n  subscriber_buffer: 0\n",
        "version: 1\nstatistics:\n  rolling_window_ms: 10\n",
        "version: 1\ngateway:\n  stream_path: \"feed\"\n",
        "version: 1\ngateway:\n  stream_path: \"/metrics\"\n",
    ] {
        let err = config::load_from_str(bad).expect_err(bad);
        assert_eq!(err.code().as_str(), "BAD_REQUEST", "{bad}");
    }
}

#[test]
fn missing_file_is_an_internal_error() {
    let err = config::load_from_file("/nonexistent/retrystream.yaml").expect_err("must fail");
    assert_eq!(err.code().as_str(), "INTERNAL");
}
