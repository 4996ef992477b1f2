//! Shared helpers for device client tests

use deskmate_client::{DeviceClient, DeviceClientConfig, RetryPolicy};
use std::time::Duration;
use wiremock::MockServer;

pub const API_KEY: &str = "test-key";

/// Setup a mock device service
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at `base_url` with short timings
pub fn client_for(base_url: &str) -> DeviceClient {
    DeviceClient::new(DeviceClientConfig {
        base_url: base_url.to_string(),
        api_key: API_KEY.to_string(),
        timeout: Duration::from_millis(500),
        retry: RetryPolicy::new(2, Duration::from_millis(10)),
    })
}

pub fn desks_path() -> String {
    format!("/api/v2/{}/desks", API_KEY)
}

/// A device payload as the service returns it
pub fn snapshot_json(name: &str, position_mm: i32) -> serde_json::Value {
    serde_json::json!({
        "config": { "name": name, "manufacturer": "Linak A/S" },
        "state": {
            "position_mm": position_mm,
            "speed_mms": 0,
            "status": "Normal",
            "isPositionLost": false,
            "isOverloadProtectionUp": false,
            "isOverloadProtectionDown": false,
            "isAntiCollision": false
        },
        "usage": { "activationsCounter": 4, "sitStandCounter": 2 },
        "lastErrors": []
    })
}
