//! JWT claims.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JWT claims structure.
///
/// Accepts tokens from hosted identity providers, whose `aud` may be a
/// string or a list, as well as tokens minted by `lifeos token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,

    /// Issuer.
    #[serde(default)]
    pub iss: Option<String>,

    /// Audience.
    #[serde(default)]
    pub aud: Option<Value>,

    /// Expiration time (as Unix timestamp).
    pub exp: i64,

    /// Issued at (as Unix timestamp).
    #[serde(default)]
    pub iat: Option<i64>,

    /// User's email.
    #[serde(default)]
    pub email: Option<String>,

    /// User's name.
    #[serde(default)]
    pub name: Option<String>,

    /// Provider role claim.
    #[serde(default)]
    pub role: Option<String>,
}

impl Claims {
    /// Get the display name for the user.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallbacks() {
        let mut claims: Claims =
            serde_json::from_value(serde_json::json!({"sub": "u1", "exp": 0})).unwrap();
        assert_eq!(claims.display_name(), "u1");

        claims.email = Some("ada@example.com".into());
        assert_eq!(claims.display_name(), "ada@example.com");

        claims.name = Some("Ada".into());
        assert_eq!(claims.display_name(), "Ada");
    }

    #[test]
    fn test_audience_string_or_list() {
        let single: Claims = serde_json::from_value(
            serde_json::json!({"sub": "u1", "exp": 0, "aud": "authenticated", "role": "authenticated"}),
        )
        .unwrap();
        assert_eq!(single.aud, Some(Value::String("authenticated".into())));

        let list: Claims =
            serde_json::from_value(serde_json::json!({"sub": "u1", "exp": 0, "aud": ["a", "b"]}))
                .unwrap();
        assert!(list.aud.unwrap().is_array());
    }
}
