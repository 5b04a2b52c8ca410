//! Ordering and teardown tests
//!
//! Responses can arrive out of issue order; only the newest issued request
//! may decide what the store shows, and nothing may land after shutdown.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use sensor_dashboard::actors::messages::PollKind;
use sensor_dashboard::actors::poller::{PollerHandle, PollingSession};
use sensor_dashboard::store::SyncStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

/// Long enough that only the immediate first tick and manual polls fire
const NO_TICKS: Duration = Duration::from_secs(3600);

#[tokio::test]
async fn test_late_older_response_is_discarded() {
    let server = MockServer::start().await;

    // First request: slow, reports chip-a
    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(create_readings_json(&[("chip-a", 10.0, 10.0)]))
                .set_delay(Duration::from_millis(500)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // Every later request: fast, reports chip-b
    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(create_readings_json(&[("chip-b", 20.0, 20.0)])),
        )
        .mount(&server)
        .await;

    let store = SyncStore::new();
    let handle = PollerHandle::spawn(
        PollKind::Readings,
        NO_TICKS,
        create_test_source(&server),
        Arc::new(store.clone()),
    )
    .unwrap();

    // Make sure the slow request is the first one the backend sees
    tokio::time::timeout(Duration::from_secs(2), async {
        while server.received_requests().await.unwrap_or_default().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("first request never reached the backend");

    handle.poll_now().await.unwrap();

    wait_until(&store, Duration::from_secs(2), |state| {
        state.readings.contains_key("chip-b")
    })
    .await;

    // Let the slow response arrive
    tokio::time::sleep(Duration::from_millis(700)).await;

    let state = store.snapshot();
    assert_eq!(
        state.device_ids().collect::<Vec<_>>(),
        vec!["chip-b"],
        "stale response overwrote a newer one"
    );

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_response_after_shutdown_is_never_applied() {
    let server = MockServer::start().await;

    let bodies = [
        ("/sensor-data", create_readings_json(&[("chip1", 21.0, 40.0)])),
        ("/sensor-history", create_history_json(&["chip1"], 2)),
    ];

    for (endpoint, body) in bodies {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(body)
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/average-temperature"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "average_temperature": 21.0 }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let store = SyncStore::new();
    let config = create_test_config(&server.uri(), NO_TICKS.as_millis() as u64);

    let session = PollingSession::start(
        &config,
        create_test_source(&server),
        Arc::new(store.clone()),
    )
    .unwrap();

    tokio::time::timeout(Duration::from_secs(2), async {
        while server.received_requests().await.unwrap_or_default().len() < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("pollers never issued their first fetch");

    session.shutdown().await.unwrap();

    tokio::time::sleep(Duration::from_millis(600)).await;

    let state = store.snapshot();
    assert!(state.readings.is_empty());
    assert!(state.history.is_empty());
    assert_eq!(state.average_temperature, None);
    for kind in PollKind::ALL {
        assert_eq!(state.poll_status(kind).last_success, None);
        assert_eq!(state.poll_status(kind).last_error, None);
    }
}

#[tokio::test]
async fn test_dropped_session_stops_polling() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(create_readings_json(&[("chip1", 21.0, 40.0)])),
        )
        .mount(&server)
        .await;

    let store = SyncStore::new();
    let mut config = create_test_config(&server.uri(), 20);
    config.history_interval_ms = NO_TICKS.as_millis() as u64;
    config.aggregate_interval_ms = NO_TICKS.as_millis() as u64;

    let session = PollingSession::start(
        &config,
        create_test_source(&server),
        Arc::new(store.clone()),
    )
    .unwrap();

    wait_until(&store, Duration::from_secs(2), |state| !state.readings.is_empty()).await;

    drop(session);
    // Aborted tasks need a scheduler turn to go away
    tokio::time::sleep(Duration::from_millis(50)).await;

    let settled = server.received_requests().await.unwrap_or_default().len();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(
        server.received_requests().await.unwrap_or_default().len(),
        settled
    );
}
