//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Minimum accepted length of the HS256 secret.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Enable development mode (accepts the `X-Dev-User` header).
    pub dev_mode: bool,

    /// HS256 secret used to verify bearer tokens. Supports `env:VAR_NAME`.
    /// Required when dev_mode is false.
    pub jwt_secret: Option<String>,

    /// Users accepted via `X-Dev-User` in dev mode.
    pub dev_users: Vec<DevUser>,

    /// Allowed CORS origins.
    pub allowed_origins: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            jwt_secret: None,
            dev_users: Vec::new(),
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

impl AuthConfig {
    /// Resolve the JWT secret, expanding `env:VAR_NAME` syntax.
    /// Returns the resolved secret or None if not configured.
    pub fn resolve_jwt_secret(&self) -> Result<Option<String>, ConfigValidationError> {
        match &self.jwt_secret {
            None => Ok(None),
            Some(value) => {
                if let Some(var_name) = value.strip_prefix("env:") {
                    match std::env::var(var_name) {
                        Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
                        Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
                        Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
                    }
                } else {
                    Ok(Some(value.clone()))
                }
            }
        }
    }

    /// Validate the configuration for the current mode.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.dev_mode {
            return Ok(());
        }

        match self.resolve_jwt_secret()? {
            None => Err(ConfigValidationError::MissingJwtSecret),
            Some(secret) if secret.len() < MIN_JWT_SECRET_LEN => {
                Err(ConfigValidationError::JwtSecretTooShort)
            }
            Some(_) => Ok(()),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// JWT secret is required in production mode.
    MissingJwtSecret,
    /// JWT secret is shorter than [`MIN_JWT_SECRET_LEN`].
    JwtSecretTooShort,
    /// Environment variable not found (for `env:VAR_NAME` syntax).
    EnvVarNotFound(String),
    /// Environment variable is empty (for `env:VAR_NAME` syntax).
    EnvVarEmpty(String),
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingJwtSecret => write!(
                f,
                "JWT secret is required when dev_mode is false. Set LIFEOS__AUTH__JWT_SECRET or auth.jwt_secret in config."
            ),
            Self::JwtSecretTooShort => write!(
                f,
                "JWT secret must be at least {} characters long.",
                MIN_JWT_SECRET_LEN
            ),
            Self::EnvVarNotFound(var) => write!(
                f,
                "Environment variable '{}' not found (referenced via env:{} in config).",
                var, var
            ),
            Self::EnvVarEmpty(var) => write!(
                f,
                "Environment variable '{}' is empty (referenced via env:{} in config).",
                var, var
            ),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Development user configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevUser {
    /// User ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
}

#[cfg(test)]
#[allow(clippy::field_reassign_with_default)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_mode_needs_no_secret() {
        let mut config = AuthConfig::default();
        config.dev_mode = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_requires_secret() {
        let config = AuthConfig::default();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::MissingJwtSecret)
        );
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = AuthConfig::default();
        config.jwt_secret = Some("short".to_string());
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::JwtSecretTooShort)
        );

        config.jwt_secret = Some("x".repeat(MIN_JWT_SECRET_LEN));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_env_reference() {
        let mut config = AuthConfig::default();
        config.jwt_secret = Some("env:LIFEOS_TEST_SECRET_THAT_DOES_NOT_EXIST".to_string());
        assert!(matches!(
            config.resolve_jwt_secret(),
            Err(ConfigValidationError::EnvVarNotFound(_))
        ));
    }

    #[test]
    fn test_inline_secret_resolves_as_is() {
        let mut config = AuthConfig::default();
        config.jwt_secret = Some("inline-secret".to_string());
        assert_eq!(
            config.resolve_jwt_secret().unwrap().as_deref(),
            Some("inline-secret")
        );
    }
}
