//! API route definitions.

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers;
use super::state::AppState;
use crate::auth::auth_middleware;

/// Request bodies above this size are rejected.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Create the application router, mounted under `/api`.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let protected_routes = Router::new()
        // Chat
        .route(
            "/chat/messages",
            get(handlers::list_messages).post(handlers::send_message),
        )
        .route("/chat/turns", get(handlers::list_turns))
        .route("/chat/turns/{turn_id}/retry", post(handlers::retry_turn))
        // Projects
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/projects/{id}",
            get(handlers::get_project)
                .patch(handlers::update_project)
                .delete(handlers::archive_project),
        )
        // Profile
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route(
            "/onboarding",
            get(handlers::onboarding_status).post(handlers::complete_onboarding),
        )
        // KPIs
        .route("/kpi/metrics", get(handlers::get_week_metrics))
        .route("/kpi/metrics/{id}", patch(handlers::update_metric))
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    // Public routes (no authentication)
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/agent-proxy", post(handlers::agent_proxy))
        .with_state(state);

    let api = Router::new().merge(public_routes).merge(protected_routes);

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(trace_layer)
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins = state.auth.allowed_origins();
    let dev_mode = state.auth.is_dev_mode();

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::PATCH,
        Method::OPTIONS,
    ];

    let headers = [
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        header::ORIGIN,
        header::COOKIE,
        header::HeaderName::from_static("x-dev-user"),
    ];

    if allowed_origins.is_empty() {
        if dev_mode {
            tracing::warn!("CORS: No origins configured in dev mode, allowing any origin");
            // allow_credentials(true) cannot be combined with any origin
            CorsLayer::new()
                .allow_origin(AllowOrigin::any())
                .allow_methods(methods)
                .allow_headers(headers)
        } else {
            tracing::warn!(
                "CORS: No origins configured in production mode, denying all cross-origin requests"
            );
            CorsLayer::new().allow_origin(AllowOrigin::exact(HeaderValue::from_static("null")))
        }
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| {
                origin.parse::<HeaderValue>().ok().or_else(|| {
                    tracing::warn!("CORS: Invalid origin in config: {}", origin);
                    None
                })
            })
            .collect();

        if origins.is_empty() {
            tracing::error!("CORS: All configured origins are invalid!");
            CorsLayer::new().allow_origin(AllowOrigin::exact(HeaderValue::from_static("null")))
        } else {
            tracing::info!("CORS: Allowing {} origin(s)", origins.len());
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(methods)
                .allow_headers(headers)
                .allow_credentials(true)
        }
    }
}
