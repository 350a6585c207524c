//! Test utilities and common setup.
#![allow(clippy::field_reassign_with_default)]
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use lifeos::api::{self, AppState};
use lifeos::auth::{AuthConfig, AuthState, DevUser};
use lifeos::db::Database;
use lifeos::relay::{
    AgentRelay, RelayConfig, RelayError, RelayResult, UpstreamResponse, WebhookTransport,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower::ServiceExt;
use tracing::Level;
use tracing::subscriber::DefaultGuard;

pub const JWT_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";
pub const WEBHOOK_URL: &str = "http://agent.invalid/webhook";
pub const SHARED_SECRET: &str = "relay-secret";

/// Create a test AuthConfig with a JWT secret and two dev users.
fn test_auth_config() -> AuthConfig {
    let mut config = AuthConfig::default();
    config.dev_mode = true;
    config.dev_users = vec![
        DevUser {
            id: "dev".to_string(),
            name: "Developer".to_string(),
            email: "dev@localhost".to_string(),
        },
        DevUser {
            id: "other".to_string(),
            name: "Other User".to_string(),
            email: "other@localhost".to_string(),
        },
    ];
    config.jwt_secret = Some(JWT_SECRET.to_string());
    config
}

/// Agent webhook stand-in answering from a script.
///
/// Once the script runs out every call answers `{"reply": "ok"}` with 200.
#[derive(Default)]
pub struct ScriptedAgent {
    answers: Mutex<VecDeque<RelayResult<UpstreamResponse>>>,
    bodies: Mutex<Vec<Value>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl ScriptedAgent {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answering(answers: Vec<RelayResult<UpstreamResponse>>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into()),
            ..Self::default()
        })
    }

    /// An agent that holds every call until `gate` is notified.
    pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Self::default()
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }
}

pub fn upstream(status: u16, body: &str) -> RelayResult<UpstreamResponse> {
    Ok(UpstreamResponse {
        status,
        body: body.to_string(),
    })
}

pub fn unreachable_upstream() -> RelayResult<UpstreamResponse> {
    Err(RelayError::Transport("connection refused".to_string()))
}

#[async_trait]
impl WebhookTransport for ScriptedAgent {
    async fn post_json(
        &self,
        _url: &str,
        _shared_secret: &str,
        body: Vec<u8>,
    ) -> RelayResult<UpstreamResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(value) = serde_json::from_slice(&body) {
            self.bodies.lock().unwrap().push(value);
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self.answers.lock().unwrap().pop_front();
        next.unwrap_or_else(|| upstream(200, r#"{"reply":"ok"}"#))
    }
}

/// A router over a fresh in-memory database.
pub struct TestApp {
    pub router: Router,
    pub auth: AuthState,
    pub agent: Arc<ScriptedAgent>,
}

impl TestApp {
    /// Bearer token for `user_id`.
    pub fn token(&self, user_id: &str) -> String {
        self.auth
            .generate_token(user_id, None, None, 3600)
            .expect("token")
    }

    /// Send a request as `user_id` (or anonymously) and decode the JSON body.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        user_id: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri).method(method);
        if let Some(user_id) = user_id {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.token(user_id)),
            );
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        send(self.router.clone(), request).await
    }
}

/// Run one request through `router` and decode the body as JSON (`Null` if empty or not JSON).
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// App whose relay talks to a scripted agent.
pub async fn test_app_with_agent(agent: Arc<ScriptedAgent>) -> TestApp {
    let relay = AgentRelay::with_transport(
        RelayConfig::new(WEBHOOK_URL, SHARED_SECRET),
        agent.clone(),
    );
    build_app(relay, agent).await
}

pub async fn test_app() -> TestApp {
    test_app_with_agent(ScriptedAgent::new()).await
}

/// App with no webhook URL or secret configured.
pub async fn unconfigured_app() -> TestApp {
    let agent = ScriptedAgent::new();
    let relay = AgentRelay::with_transport(RelayConfig::default(), agent.clone());
    build_app(relay, agent).await
}

/// App relaying over real HTTP to `config`.
pub async fn http_relay_app(config: RelayConfig) -> TestApp {
    let relay = AgentRelay::new(config).expect("relay");
    build_app(relay, ScriptedAgent::new()).await
}

async fn build_app(relay: AgentRelay, agent: Arc<ScriptedAgent>) -> TestApp {
    let database = Database::in_memory()
        .await
        .expect("Failed to create test database");
    let auth = AuthState::new(test_auth_config());
    let state = AppState::new(database, auth.clone(), relay);

    TestApp {
        router: api::create_router(state),
        auth,
        agent,
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Formatted log lines written while a [`capture_logs`] guard is alive.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Route this thread's tracing output into a buffer until the guard drops.
///
/// `#[tokio::test]` runs on a current-thread runtime, so spawned tasks log
/// into the same buffer.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(Level::DEBUG)
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}
