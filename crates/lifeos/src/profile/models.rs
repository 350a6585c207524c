//! Profile data models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::projects::Project;

/// Most core values a user may pick.
pub const MAX_CORE_VALUES: usize = 4;

/// The user's long-term vision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountEverest {
    pub vision_statement: String,
    pub why_it_matters: String,
    pub purpose_statement: String,
}

/// User profile as exposed by the API.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub role: String,
    pub industry: String,
    pub bio: String,
    pub tone: String,
    pub non_negotiable_values: Vec<String>,
    pub prime_directive: String,
    pub mount_everest: MountEverest,
    pub inner_boardroom: Value,
    pub default_state_map: Value,
    pub skill_accelerator_mode: bool,
    pub auto_template_behavior: String,
    pub onboarding_completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl UserProfile {
    /// Blank profile for a user who has none yet.
    pub fn empty(user_id: &str, now: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            user_name: String::new(),
            role: String::new(),
            industry: String::new(),
            bio: String::new(),
            tone: String::new(),
            non_negotiable_values: Vec::new(),
            prime_directive: String::new(),
            mount_everest: MountEverest::default(),
            inner_boardroom: Value::Object(Default::default()),
            default_state_map: Value::Object(Default::default()),
            skill_accelerator_mode: false,
            auto_template_behavior: String::new(),
            onboarding_completed: false,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

/// Database row; JSON columns are kept as text.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct UserProfileRow {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub role: String,
    pub industry: String,
    pub bio: String,
    pub tone: String,
    pub non_negotiable_values: String,
    pub prime_directive: String,
    pub mount_everest: String,
    pub inner_boardroom: String,
    pub default_state_map: String,
    pub skill_accelerator_mode: bool,
    pub auto_template_behavior: String,
    pub onboarding_completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserProfileRow> for UserProfile {
    fn from(row: UserProfileRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name,
            role: row.role,
            industry: row.industry,
            bio: row.bio,
            tone: row.tone,
            non_negotiable_values: serde_json::from_str(&row.non_negotiable_values)
                .unwrap_or_default(),
            prime_directive: row.prime_directive,
            mount_everest: serde_json::from_str(&row.mount_everest).unwrap_or_default(),
            inner_boardroom: parse_object(&row.inner_boardroom),
            default_state_map: parse_object(&row.default_state_map),
            skill_accelerator_mode: row.skill_accelerator_mode,
            auto_template_behavior: row.auto_template_behavior,
            onboarding_completed: row.onboarding_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn parse_object(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => value,
        _ => Value::Object(Default::default()),
    }
}

/// Editable profile fields. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub user_name: Option<String>,
    pub role: Option<String>,
    pub industry: Option<String>,
    pub bio: Option<String>,
    pub tone: Option<String>,
    pub non_negotiable_values: Option<Vec<String>>,
    pub prime_directive: Option<String>,
    pub mount_everest: Option<MountEverest>,
    pub inner_boardroom: Option<Value>,
}

/// Answers collected by the onboarding flow.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OnboardingRequest {
    pub user_name: String,
    pub role: String,
    pub industry: String,
    pub bio: String,
    pub tone: String,
    pub non_negotiable_values: Vec<String>,
    pub prime_directive: String,
    pub mount_everest_vision: String,
    pub mount_everest_why: String,
    pub mount_everest_purpose: String,
}

impl OnboardingRequest {
    /// Check required answers. Returns the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.user_name.trim().is_empty() {
            return Err("user_name is required".to_string());
        }
        let values = self
            .non_negotiable_values
            .iter()
            .filter(|v| !v.trim().is_empty())
            .count();
        if values == 0 {
            return Err("at least one non-negotiable value is required".to_string());
        }
        if values > MAX_CORE_VALUES {
            return Err(format!(
                "at most {} non-negotiable values may be chosen",
                MAX_CORE_VALUES
            ));
        }
        if self.mount_everest_vision.trim().is_empty() {
            return Err("mount_everest_vision is required".to_string());
        }
        Ok(())
    }
}

/// Whether the user finished onboarding.
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingStatus {
    pub completed: bool,
}

/// Profile and starter project written by onboarding.
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingResult {
    pub profile: UserProfile,
    pub project: Project,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> OnboardingRequest {
        OnboardingRequest {
            user_name: "Ada".into(),
            non_negotiable_values: vec!["Truth".into(), "Growth".into()],
            mount_everest_vision: "Build a school".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_accepts_complete_answers() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_answers() {
        let mut request = valid_request();
        request.user_name = "  ".into();
        assert!(request.validate().unwrap_err().contains("user_name"));

        let mut request = valid_request();
        request.non_negotiable_values.clear();
        assert!(request.validate().is_err());

        let mut request = valid_request();
        request.non_negotiable_values = vec!["a", "b", "c", "d", "e"]
            .into_iter()
            .map(String::from)
            .collect();
        assert!(request.validate().unwrap_err().contains("at most 4"));

        let mut request = valid_request();
        request.mount_everest_vision.clear();
        assert!(request.validate().unwrap_err().contains("vision"));
    }

    #[test]
    fn test_row_with_bad_json_falls_back() {
        let row = UserProfileRow {
            id: "p".into(),
            user_id: "u".into(),
            user_name: "Ada".into(),
            role: String::new(),
            industry: String::new(),
            bio: String::new(),
            tone: String::new(),
            non_negotiable_values: "not json".into(),
            prime_directive: String::new(),
            mount_everest: r#"{"vision_statement":"v"}"#.into(),
            inner_boardroom: "[]".into(),
            default_state_map: "{}".into(),
            skill_accelerator_mode: true,
            auto_template_behavior: String::new(),
            onboarding_completed: true,
            created_at: String::new(),
            updated_at: String::new(),
        };

        let profile = UserProfile::from(row);
        assert!(profile.non_negotiable_values.is_empty());
        assert_eq!(profile.mount_everest.vision_statement, "v");
        assert!(profile.mount_everest.why_it_matters.is_empty());
        assert!(profile.inner_boardroom.as_object().unwrap().is_empty());
    }
}
