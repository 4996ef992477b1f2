//! Device client behaviour against a mock device service

mod common;

use common::{client_for, desks_path, setup_mock_server, snapshot_json};
use deskmate_client::{ClientError, DeviceApi, DeviceClient, DeviceClientConfig, RetryPolicy};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_list_device_ids() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path(desks_path()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!(["desk-1", "desk-2"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let ids = client.list_device_ids().await.unwrap();

    assert_eq!(ids, vec!["desk-1".to_string(), "desk-2".to_string()]);
}

#[tokio::test]
async fn test_list_device_ids_non_success_is_connectivity_error() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path(desks_path()))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let err = client.list_device_ids().await.unwrap_err();

    match err {
        ClientError::Connectivity { target, detail } => {
            assert_eq!(target, "desk list");
            assert!(detail.contains("503"));
            assert!(detail.contains("maintenance"));
        }
        other => panic!("expected Connectivity, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_device_snapshot() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/desk-1", desks_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_json("DESK 1", 912)))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let snapshot = client.get_device_snapshot("desk-1").await.unwrap();

    assert_eq!(snapshot.config.name, "DESK 1");
    assert_eq!(snapshot.state.position_mm, 912);
    assert_eq!(snapshot.usage.sit_stand_counter, 2);
}

#[tokio::test]
async fn test_get_device_snapshot_not_found_is_connectivity_error() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/ghost", desks_path())))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let err = client.get_device_snapshot("ghost").await.unwrap_err();

    assert!(matches!(err, ClientError::Connectivity { .. }));
}

#[tokio::test]
async fn test_set_position_sends_body_and_returns_echo() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path(format!("{}/desk-1/state", desks_path())))
        .and(body_json(serde_json::json!({ "position_mm": 1100 })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "position_mm": 1100 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let echo = client.set_position("desk-1", 1100).await.unwrap();

    assert_eq!(echo.position_mm, 1100);
}

#[tokio::test]
async fn test_set_position_out_of_range_makes_no_request() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());

    for position in [0, 679, 1321, 5000, -20] {
        let err = client.set_position("desk-1", position).await.unwrap_err();
        match err {
            ClientError::OutOfRange {
                attempted_mm,
                min_mm,
                max_mm,
            } => {
                assert_eq!(attempted_mm, position);
                assert_eq!((min_mm, max_mm), (680, 1320));
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_set_position_rejection_is_not_retried() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path(format!("{}/desk-1/state", desks_path())))
        .respond_with(ResponseTemplate::new(400).set_body_string("desk is in collision stop"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let err = client.set_position("desk-1", 1000).await.unwrap_err();

    match err {
        ClientError::Rejected {
            target,
            status,
            message,
        } => {
            assert_eq!(target, "desk desk-1");
            assert_eq!(status, 400);
            assert_eq!(message, "desk is in collision stop");
        }
        other => panic!("expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_set_position_times_out() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path(format!("{}/desk-1/state", desks_path())))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "position_mm": 1000 }))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = DeviceClient::new(DeviceClientConfig {
        base_url: server.uri(),
        api_key: common::API_KEY.to_string(),
        timeout: Duration::from_millis(100),
        retry: RetryPolicy::new(2, Duration::from_millis(10)),
    });
    let err = client.set_position("desk-1", 1000).await.unwrap_err();

    match err {
        ClientError::Timeout { target, timeout_ms } => {
            assert_eq!(target, "desk desk-1");
            assert_eq!(timeout_ms, 100);
        }
        other => panic!("expected Timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_service_is_connectivity_error() {
    // Reserve a port, then free it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}", addr));
    let err = client.set_position("desk-1", 1000).await.unwrap_err();

    assert!(matches!(err, ClientError::Connectivity { .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_invalid_success_body_is_invalid_response() {
    let server = setup_mock_server().await;
    Mock::given(method("PUT"))
        .and(path(format!("{}/desk-1/state", desks_path())))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let err = client.set_position("desk-1", 1000).await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_trait_object_dispatches_to_client() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path(desks_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["desk-9"])))
        .mount(&server)
        .await;

    let device: Box<dyn DeviceApi> = Box::new(client_for(&server.uri()));
    assert_eq!(device.list_device_ids().await.unwrap(), vec!["desk-9".to_string()]);
}
