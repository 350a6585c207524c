//! Authentication module.
//!
//! Verifies HS256 bearer tokens issued by the identity provider, with a
//! dev bypass mode for configured test users.

mod claims;
mod config;
mod error;
mod middleware;

pub use claims::Claims;
pub use config::{AuthConfig, ConfigValidationError, DevUser, MIN_JWT_SECRET_LEN};
pub use error::AuthError;
pub use middleware::{AUTH_COOKIE, AuthState, CurrentUser, DEV_USER_HEADER, auth_middleware};
