//! End-to-end tests: mock backend → pollers → store → projection

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use sensor_dashboard::actors::dispatcher::AlertDispatcher;
use sensor_dashboard::actors::messages::{AlertOutcome, PollKind};
use sensor_dashboard::actors::poller::PollingSession;
use sensor_dashboard::config::DetailSelection;
use sensor_dashboard::projection::project;
use sensor_dashboard::store::SyncStore;
use sensor_dashboard::{AlertRule, NotificationKind};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

async fn mount_backend(server: &MockServer, readings: serde_json::Value, average: f64) {
    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(readings))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sensor-history"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(create_history_json(&["chip1"], 3)),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/average-temperature"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "average_temperature": average })),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_session_populates_every_part_of_the_state() {
    let server = MockServer::start().await;
    mount_backend(&server, create_readings_json(&[("chip1", 21.0, 40.0)]), 23.5).await;

    let store = SyncStore::new();
    let session = PollingSession::start(
        &create_test_config(&server.uri(), 50),
        create_test_source(&server),
        Arc::new(store.clone()),
    )
    .unwrap();

    wait_until(&store, Duration::from_secs(3), |state| {
        !state.readings.is_empty()
            && !state.history.is_empty()
            && state.average_temperature.is_some()
    })
    .await;

    let state = store.snapshot();
    assert_eq!(state.readings["chip1"].temperature, 21.0);
    assert_eq!(state.history_for("chip1").len(), 3);
    assert_eq!(state.average_temperature, Some(23.5));
    assert!(state.is_connected());
    for kind in PollKind::ALL {
        assert!(state.poll_status(kind).last_success.is_some());
    }

    let view = project(&state, DetailSelection::Clicked, Some("chip1"));
    assert_eq!(view.average_temperature, "23.50°C");
    assert_eq!(view.detail.unwrap().chart.categories.len(), 3);

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_devices_missing_from_new_snapshot_are_removed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(create_readings_json(&[("chip1", 21.0, 40.0), ("chip2", 19.0, 55.0)])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    mount_backend(&server, create_readings_json(&[("chip2", 20.0, 56.0)]), 20.0).await;

    let store = SyncStore::new();
    let session = PollingSession::start(
        &create_test_config(&server.uri(), 50),
        create_test_source(&server),
        Arc::new(store.clone()),
    )
    .unwrap();

    wait_until(&store, Duration::from_secs(3), |state| state.readings.len() == 2).await;
    wait_until(&store, Duration::from_secs(3), |state| {
        state.readings.len() == 1 && state.readings.contains_key("chip2")
    })
    .await;

    let state = store.snapshot();
    assert_eq!(state.readings["chip2"].temperature, 20.0);
    assert!(!state.readings.contains_key("chip1"));

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_reading_then_accepted_alert_leaves_gauges_untouched() {
    let server = MockServer::start().await;
    mount_backend(&server, create_readings_json(&[("chip1", 21.0, 40.0)]), 21.0).await;

    Mock::given(method("POST"))
        .and(path("/set-alert"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "message": "Alert settings updated" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = SyncStore::new();
    let source = create_test_source(&server);
    let session = PollingSession::start(
        &create_test_config(&server.uri(), 50),
        Arc::clone(&source),
        Arc::new(store.clone()),
    )
    .unwrap();

    wait_until(&store, Duration::from_secs(3), |state| !state.readings.is_empty()).await;

    let dispatcher = AlertDispatcher::new(source, store.clone());
    let outcome = dispatcher
        .submit(AlertRule {
            threshold_celsius: 30.0,
            enabled: true,
        })
        .await;

    assert_eq!(outcome, AlertOutcome::Accepted);

    let view = project(&store.snapshot(), DetailSelection::Clicked, None);
    assert_eq!(
        view.notification.as_ref().map(|n| n.kind),
        Some(NotificationKind::Success)
    );
    assert_eq!(view.gauges.len(), 1);
    assert_eq!(view.gauges[0].temperature.text, "21°C");
    assert_eq!(view.gauges[0].humidity.text, "40%");

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_poll_all_now_fetches_every_endpoint() {
    let server = MockServer::start().await;
    mount_backend(&server, create_readings_json(&[("chip1", 21.0, 40.0)]), 21.0).await;

    let store = SyncStore::new();
    let mut config = create_test_config(&server.uri(), 3_600_000);
    config.detail_selection = DetailSelection::FirstDevice;

    let session = PollingSession::start(
        &config,
        create_test_source(&server),
        Arc::new(store.clone()),
    )
    .unwrap();

    // Immediate first tick on each poller
    wait_until(&store, Duration::from_secs(3), |state| {
        PollKind::ALL
            .iter()
            .all(|kind| state.poll_status(*kind).last_success.is_some())
    })
    .await;

    session.poll_all_now().await.unwrap();

    tokio::time::timeout(Duration::from_secs(3), async {
        while server.received_requests().await.unwrap_or_default().len() < 6 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("manual refresh did not reach the backend");

    session.shutdown().await.unwrap();
}
