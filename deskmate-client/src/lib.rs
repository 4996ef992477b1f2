//! DeskMate Device Client
//!
//! A small, type-safe HTTP client for the external device service that owns
//! the physical desk actuators.
//!
//! Every call carries its own timeout. Position writes are validated against
//! the global height envelope before any network traffic, and retried with
//! exponential backoff when the service cannot be reached. The client never
//! touches persisted state; that is the caller's job.
//!
//! # Example
//!
//! ```no_run
//! use deskmate_client::{DeviceClient, DeviceClientConfig};
//!
//! # async fn example() -> deskmate_client::Result<()> {
//! let client = DeviceClient::new(DeviceClientConfig::default());
//!
//! for id in client.list_device_ids().await? {
//!     let snapshot = client.get_device_snapshot(&id).await?;
//!     println!("{} is at {}mm", snapshot.config.name, snapshot.state.position_mm);
//! }
//! # Ok(())
//! # }
//! ```

mod api;
mod desks;
pub mod error;
pub mod retry;

pub use api::DeviceApi;
pub use error::{ClientError, Result};
pub use retry::{AttemptFailure, RetryPolicy};

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Connection settings for the device service
#[derive(Debug, Clone)]
pub struct DeviceClientConfig {
    /// Base URL of the device service (e.g., "http://127.0.0.1:8000")
    pub base_url: String,
    /// API key embedded in every request path
    pub api_key: String,
    /// Deadline for a single attempt
    pub timeout: Duration,
    /// Retry policy for attempts that never got a response
    pub retry: RetryPolicy,
}

impl Default for DeviceClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            api_key: "E9Y2LxT4g1hQZ7aD8nR3mWx5P0qK6pV7".to_string(),
            timeout: Duration::from_millis(10_000),
            retry: RetryPolicy::default(),
        }
    }
}

/// HTTP client for the device service API
#[derive(Debug, Clone)]
pub struct DeviceClient {
    /// Base URL without trailing slash
    base_url: String,
    api_key: String,
    timeout: Duration,
    retry: RetryPolicy,
    client: Client,
}

impl DeviceClient {
    /// Create a new device client
    pub fn new(config: DeviceClientConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create a new device client around a preconfigured reqwest client
    ///
    /// Useful for proxies or TLS settings. The per-attempt timeout from
    /// `config` is still applied to every request.
    pub fn with_client(config: DeviceClientConfig, client: Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            timeout: config.timeout,
            retry: config.retry,
            client,
        }
    }

    /// Get the base URL of the device service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// `{base}/api/v2/{apiKey}/desks`
    fn desks_url(&self) -> String {
        format!("{}/api/v2/{}/desks", self.base_url, self.api_key)
    }

    // =============================================================================
    // Transport
    // =============================================================================

    /// Sends a request under the retry policy
    ///
    /// `build` is called once per attempt since a request cannot be reused.
    async fn send(&self, target: &str, build: impl Fn() -> RequestBuilder) -> Result<Response> {
        let timeout = self.timeout;

        self.retry
            .run(target, || {
                let request = build().timeout(timeout);
                async move {
                    request.send().await.map_err(|e| {
                        if e.is_timeout() {
                            AttemptFailure::TimedOut(timeout)
                        } else {
                            AttemptFailure::Unreachable(e.to_string())
                        }
                    })
                }
            })
            .await
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Decodes a JSON body from a response already known to be successful
    async fn decode<T: DeserializeOwned>(&self, target: &str, response: Response) -> Result<T> {
        response.json().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout {
                    target: target.to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                }
            } else {
                ClientError::InvalidResponse(format!("Failed to parse JSON response: {}", e))
            }
        })
    }

    /// Handles a read: a non-success status counts as the service being unavailable
    async fn handle_read<T: DeserializeOwned>(&self, target: &str, response: Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "No error details".to_string());
            return Err(ClientError::Connectivity {
                target: target.to_string(),
                detail: format!("HTTP {}: {}", status, error_text),
            });
        }

        self.decode(target, response).await
    }

    /// Handles a write: a non-success status is a rejection by the device
    async fn handle_write<T: DeserializeOwned>(
        &self,
        target: &str,
        response: Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "No error details".to_string());
            return Err(ClientError::Rejected {
                target: target.to_string(),
                status: status.as_u16(),
                message: error_text,
            });
        }

        self.decode(target, response).await
    }
}
