//! HTTP API module.
//!
//! REST endpoints for chat, projects, profile and KPIs, plus the public
//! agent relay.

mod error;
pub mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;
