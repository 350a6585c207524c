//! Agent relay module.
//!
//! Forwards chat requests to the external webhook-based agent, authenticating
//! with a shared secret, and normalizes the webhook's JSON-or-text reply.

mod client;
mod error;
mod types;

pub use client::{AgentRelay, HttpTransport, WebhookTransport};
pub use error::{RelayError, RelayResult};
pub use types::{
    RelayConfig, RelayReply, RelayResponse, SHARED_SECRET_ENV, SHARED_SECRET_HEADER,
    UpstreamResponse, WEBHOOK_URL_ENV,
};

#[cfg(test)]
pub(crate) use client::tests::FakeTransport;
