//! Relay configuration and reply types.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Header carrying the shared secret to the webhook.
pub const SHARED_SECRET_HEADER: &str = "x-agent-shared-secret";

/// Legacy environment variable for the webhook URL.
pub const WEBHOOK_URL_ENV: &str = "AGENT_WEBHOOK_URL";

/// Legacy environment variable for the shared secret.
pub const SHARED_SECRET_ENV: &str = "AGENT_SHARED_SECRET";

/// Keys checked, in order, when pulling reply text out of a structured reply.
const REPLY_TEXT_KEYS: [&str; 6] = ["reply", "output", "response", "message", "text", "content"];

/// Agent relay configuration.
///
/// Both values may be missing; the relay then refuses every request with
/// "Server not configured" while the rest of the application keeps serving.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Destination webhook URL. Supports `env:VAR_NAME`.
    pub webhook_url: Option<String>,
    /// Shared secret sent in `x-agent-shared-secret`. Supports `env:VAR_NAME`.
    pub shared_secret: Option<String>,
    /// Request timeout in seconds. Unset means the HTTP client default.
    pub timeout_secs: Option<u64>,
}

impl RelayConfig {
    /// Create a config with both credentials set.
    pub fn new(webhook_url: impl Into<String>, shared_secret: impl Into<String>) -> Self {
        Self {
            webhook_url: Some(webhook_url.into()),
            shared_secret: Some(shared_secret.into()),
            timeout_secs: None,
        }
    }

    /// Resolve `env:VAR_NAME` references and fall back to the legacy
    /// `AGENT_WEBHOOK_URL` / `AGENT_SHARED_SECRET` variables for unset values.
    ///
    /// `lookup` reads a variable; startup passes `std::env::var`, tests pass a map.
    pub fn resolve<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        self.webhook_url = resolve_value(self.webhook_url.take(), WEBHOOK_URL_ENV, &lookup);
        self.shared_secret = resolve_value(self.shared_secret.take(), SHARED_SECRET_ENV, &lookup);
        self
    }

    /// Return `(url, secret)` when both are present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let url = self.webhook_url.as_deref().filter(|v| !v.is_empty())?;
        let secret = self.shared_secret.as_deref().filter(|v| !v.is_empty())?;
        Some((url, secret))
    }

    /// Whether the relay can forward requests.
    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }
}

fn resolve_value<F>(value: Option<String>, legacy_var: &str, lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match value {
        Some(v) => match v.strip_prefix("env:") {
            Some(var_name) => lookup(var_name),
            None => Some(v),
        },
        None => None,
    };

    value
        .filter(|v| !v.is_empty())
        .or_else(|| lookup(legacy_var).filter(|v| !v.is_empty()))
}

/// Raw upstream answer as read off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    /// HTTP status code returned by the webhook.
    pub status: u16,
    /// Full response body as text.
    pub body: String,
}

/// Webhook reply after the single parse attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayReply {
    /// Body parsed as JSON.
    Structured(Value),
    /// Body was not JSON; kept verbatim.
    PlainText(String),
}

impl RelayReply {
    /// Classify an upstream body.
    pub fn parse(body: String) -> Self {
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Self::Structured(value),
            Err(_) => Self::PlainText(body),
        }
    }

    /// JSON body returned to the relay caller.
    pub fn into_body(self) -> Value {
        match self {
            Self::Structured(value) => value,
            Self::PlainText(text) => json!({ "reply": text }),
        }
    }

    /// Text to store as the assistant's message.
    ///
    /// Plain text is used as is. For JSON, a bare string, or the first string
    /// field among `reply`, `output`, `response`, `message`, `text`, `content`
    /// (also inside a one-element array), wins; anything else is stored as
    /// compact JSON.
    pub fn reply_text(&self) -> String {
        match self {
            Self::PlainText(text) => text.clone(),
            Self::Structured(value) => {
                extract_text(value).unwrap_or_else(|| value.to_string())
            }
        }
    }
}

fn extract_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => REPLY_TEXT_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        Value::Array(items) => items.first().and_then(extract_text),
        _ => None,
    }
}

/// Relay outcome handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayResponse {
    /// Upstream status code, forwarded verbatim.
    pub status: u16,
    /// Normalized reply.
    pub reply: RelayReply,
}

impl RelayResponse {
    /// Whether the upstream answered with a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
