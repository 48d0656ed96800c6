//! Cloud sync gateway boundary.
//!
//! The engine depends only on the [`SyncGateway`] contract; the bundled
//! [`HttpGateway`] talks to a remote contractor directory keyed by device
//! identity over plain HTTP+JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::device::DeviceId;
use crate::models::Contractor;

/// Timeout for the connectivity probe.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Errors from gateway transport.
#[derive(Debug)]
pub enum GatewayError {
    /// HTTP transport failure (connect, timeout, body read).
    Http(String),
    /// Server answered with a non-success status.
    Status(u16),
    /// Remote payload could not be decoded.
    Malformed(String),
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::Http(e) => write!(f, "HTTP error: {}", e),
            GatewayError::Status(code) => write!(f, "Server returned status {}", code),
            GatewayError::Malformed(e) => write!(f, "Malformed remote payload: {}", e),
        }
    }
}

impl std::error::Error for GatewayError {}

/// Contract the sync orchestrator drives.
///
/// Implementations own their transport and timeouts; the engine treats
/// "no response" the same as "not connected".
pub trait SyncGateway {
    /// Whether the remote side is reachable right now.
    fn is_connected(&self) -> impl std::future::Future<Output = bool> + Send;

    /// Fetches the remote contractor list; empty when nothing is stored.
    fn pull(&self) -> impl std::future::Future<Output = Result<Vec<Contractor>, GatewayError>> + Send;

    /// Replaces the remote contractor list.
    fn push(
        &self,
        contractors: &[Contractor],
    ) -> impl std::future::Future<Output = Result<(), GatewayError>> + Send;
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    #[serde(default)]
    contractors: Vec<Contractor>,
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    contractors: &'a [Contractor],
}

/// HTTP implementation of the gateway.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: String,
    api_key: Option<String>,
    device_id: DeviceId,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, device_id: DeviceId) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            device_id,
            client: reqwest::Client::new(),
        }
    }

    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn directory_url(&self) -> String {
        format!(
            "{}/v1/devices/{}/contractors",
            self.base_url.trim_end_matches('/'),
            self.device_id
        )
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.base_url.trim_end_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }
}

impl SyncGateway for HttpGateway {
    async fn is_connected(&self) -> bool {
        let request = self.client.get(self.health_url()).timeout(HEALTH_TIMEOUT);
        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn pull(&self) -> Result<Vec<Contractor>, GatewayError> {
        let request = self.authorize(self.client.get(self.directory_url()));
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        // No remote directory yet reads as an empty list.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(GatewayError::Status(response.status().as_u16()));
        }

        let body: PullResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        Ok(body.contractors)
    }

    async fn push(&self, contractors: &[Contractor]) -> Result<(), GatewayError> {
        let request = self
            .authorize(self.client.put(self.directory_url()))
            .json(&PushRequest { contractors });
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}
