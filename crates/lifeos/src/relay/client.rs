//! Agent webhook relay.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::error::{RelayError, RelayResult};
use super::types::{RelayConfig, RelayReply, RelayResponse, SHARED_SECRET_HEADER, UpstreamResponse};

/// Outbound leg of the relay: one POST, full body read as text.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        shared_secret: &str,
        body: Vec<u8>,
    ) -> RelayResult<UpstreamResponse>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport, applying the optional timeout.
    pub fn new(timeout: Option<Duration>) -> RelayResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RelayError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        shared_secret: &str,
        body: Vec<u8>,
    ) -> RelayResult<UpstreamResponse> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(SHARED_SECRET_HEADER, shared_secret)
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(UpstreamResponse { status, body })
    }
}

/// Forwards caller payloads to the configured agent webhook.
#[derive(Clone)]
pub struct AgentRelay {
    config: Arc<RelayConfig>,
    transport: Arc<dyn WebhookTransport>,
}

impl std::fmt::Debug for AgentRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRelay")
            .field("webhook_url", &self.config.webhook_url)
            .field("configured", &self.config.is_configured())
            .finish()
    }
}

impl AgentRelay {
    /// Create a relay using the HTTP transport.
    pub fn new(config: RelayConfig) -> RelayResult<Self> {
        let transport = HttpTransport::new(config.timeout_secs.map(Duration::from_secs))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a relay with a custom transport.
    pub fn with_transport(config: RelayConfig, transport: Arc<dyn WebhookTransport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// Whether both the webhook URL and shared secret are set.
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Forward `payload` and normalize the reply.
    ///
    /// Fails with [`RelayError::NotConfigured`] before any network I/O when a
    /// credential is missing.
    pub async fn forward(&self, payload: &Value) -> RelayResult<RelayResponse> {
        let (url, secret) = self.config.credentials().ok_or(RelayError::NotConfigured)?;

        let body =
            serde_json::to_vec(payload).map_err(|e| RelayError::InvalidPayload(e.to_string()))?;

        debug!(url, secret_len = secret.len(), "forwarding request to agent webhook");
        let upstream = self.transport.post_json(url, secret, body).await?;
        info!(status = upstream.status, "agent webhook responded");

        Ok(RelayResponse {
            status: upstream.status,
            reply: RelayReply::parse(upstream.body),
        })
    }

    /// Parse a raw request body and forward it.
    pub async fn forward_bytes(&self, body: &[u8]) -> RelayResult<RelayResponse> {
        if !self.is_configured() {
            return Err(RelayError::NotConfigured);
        }

        let payload: Value =
            serde_json::from_slice(body).map_err(|e| RelayError::InvalidPayload(e.to_string()))?;
        self.forward(&payload).await
    }
}
