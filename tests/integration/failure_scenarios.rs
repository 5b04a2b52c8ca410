//! Failure tests for the polling pipeline
//!
//! These tests verify that failed polls never destroy data already shown:
//! - Backend errors
//! - Unreachable backend
//! - Malformed payloads

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use sensor_dashboard::actors::messages::PollKind;
use sensor_dashboard::actors::poller::PollingSession;
use sensor_dashboard::config::DetailSelection;
use sensor_dashboard::projection::{AGGREGATE_PLACEHOLDER, project};
use sensor_dashboard::store::SyncStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

async fn mount_empty_history(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/sensor-history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_aggregate_failure_keeps_last_value() {
    let server = MockServer::start().await;
    mount_empty_history(&server).await;

    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/average-temperature"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "average_temperature": 23.5 })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/average-temperature"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = SyncStore::new();
    let session = PollingSession::start(
        &create_test_config(&server.uri(), 50),
        create_test_source(&server),
        Arc::new(store.clone()),
    )
    .unwrap();

    wait_until(&store, Duration::from_secs(3), |state| {
        state.poll_status(PollKind::Aggregate).consecutive_failures >= 2
    })
    .await;

    session.shutdown().await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.average_temperature, Some(23.5));
    assert!(state.poll_status(PollKind::Aggregate).last_error.is_some());

    let view = project(&state, DetailSelection::Clicked, None);
    assert_eq!(view.average_temperature, "23.50°C");
}

#[tokio::test]
async fn test_readings_failure_keeps_prior_readings() {
    let server = MockServer::start().await;
    mount_empty_history(&server).await;

    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(create_readings_json(&[("chip1", 21.0, 40.0)])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/average-temperature"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = SyncStore::new();
    let session = PollingSession::start(
        &create_test_config(&server.uri(), 50),
        create_test_source(&server),
        Arc::new(store.clone()),
    )
    .unwrap();

    wait_until(&store, Duration::from_secs(3), |state| {
        state.poll_status(PollKind::Readings).consecutive_failures >= 2
    })
    .await;

    session.shutdown().await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.readings.len(), 1);
    assert_eq!(state.readings["chip1"].temperature, 21.0);
    assert!(!state.is_connected());
    // A 404 on the average means "no data yet", not a failing loop
    assert_eq!(state.poll_status(PollKind::Aggregate).last_error, None);

    let view = project(&state, DetailSelection::Clicked, None);
    assert_eq!(view.gauges[0].temperature.text, "21°C");
    assert_eq!(view.average_temperature, AGGREGATE_PLACEHOLDER);
}

#[tokio::test]
async fn test_unreachable_backend_shows_placeholders() {
    // Nothing listens on the discard port
    let config = create_test_config("http://127.0.0.1:9", 50);
    let source: Arc<dyn sensor_dashboard::client::TelemetrySource> = Arc::new(
        sensor_dashboard::client::HttpTelemetryClient::new(
            &config.api_url,
            Duration::from_millis(500),
        )
        .unwrap(),
    );

    let store = SyncStore::new();
    let session = PollingSession::start(&config, source, Arc::new(store.clone())).unwrap();

    wait_until(&store, Duration::from_secs(5), |state| {
        PollKind::ALL
            .iter()
            .all(|kind| state.poll_status(*kind).last_error.is_some())
    })
    .await;

    session.shutdown().await.unwrap();

    let state = store.snapshot();
    assert!(state.readings.is_empty());
    assert!(state.history.is_empty());
    assert_eq!(state.average_temperature, None);
    assert!(!state.is_connected());

    let view = project(&state, DetailSelection::FirstDevice, None);
    assert!(view.gauges.is_empty());
    assert!(view.detail.is_none());
    assert_eq!(view.average_temperature, AGGREGATE_PLACEHOLDER);
}

#[tokio::test]
async fn test_malformed_payload_is_a_failure() {
    let server = MockServer::start().await;
    mount_empty_history(&server).await;

    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/average-temperature"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "average_temperature": 19.0 })),
        )
        .mount(&server)
        .await;

    let store = SyncStore::new();
    let session = PollingSession::start(
        &create_test_config(&server.uri(), 50),
        create_test_source(&server),
        Arc::new(store.clone()),
    )
    .unwrap();

    wait_until(&store, Duration::from_secs(3), |state| {
        state.poll_status(PollKind::Readings).last_error.is_some()
            && state.average_temperature.is_some()
    })
    .await;

    session.shutdown().await.unwrap();

    let state = store.snapshot();
    assert!(state.readings.is_empty());
    assert_eq!(state.average_temperature, Some(19.0));
    assert!(state.poll_status(PollKind::Readings).last_success.is_none());
}

#[tokio::test]
async fn test_aggregate_failure_does_not_block_readings() {
    let server = MockServer::start().await;
    mount_empty_history(&server).await;

    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(create_readings_json(&[("chip1", 22.0, 45.0), ("chip2", 18.0, 60.0)])),
        )
        .mount(&server)
        .await;

    // Slow failure on the aggregate endpoint
    Mock::given(method("GET"))
        .and(path("/average-temperature"))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let store = SyncStore::new();
    let session = PollingSession::start(
        &create_test_config(&server.uri(), 50),
        create_test_source(&server),
        Arc::new(store.clone()),
    )
    .unwrap();

    wait_until(&store, Duration::from_secs(3), |state| state.readings.len() == 2).await;
    wait_until(&store, Duration::from_secs(3), |state| {
        state.poll_status(PollKind::Aggregate).last_error.is_some()
    })
    .await;

    session.shutdown().await.unwrap();

    let state = store.snapshot();
    assert!(state.is_connected());
    assert_eq!(state.average_temperature, None);
    assert_eq!(state.first_device_id(), Some("chip1"));
}
