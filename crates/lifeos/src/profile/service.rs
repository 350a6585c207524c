//! Profile service: editing and onboarding.

use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use tracing::{info, instrument};

use super::boardroom::{DEFAULT_AUTO_TEMPLATE_BEHAVIOR, default_inner_boardroom, default_state_map};
use super::models::{
    MountEverest, OnboardingRequest, OnboardingResult, OnboardingStatus, UpdateProfileRequest,
    UserProfile,
};
use super::repository::ProfileRepository;
use crate::projects::{CreateProjectRequest, DEFAULT_PROJECT_COLOR, ProjectRepository};

/// Name of the project created by onboarding.
pub const STARTER_PROJECT_NAME: &str = "Getting Started";

const STARTER_PROJECT_DESCRIPTION: &str = "Your first LifeOS project to explore the system";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile not found")]
    NotFound,

    #[error("onboarding already completed")]
    AlreadyOnboarded,

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Service for profile reads, edits and onboarding.
#[derive(Debug, Clone)]
pub struct ProfileService {
    profiles: ProfileRepository,
    projects: ProjectRepository,
}

impl ProfileService {
    pub fn new(profiles: ProfileRepository, projects: ProjectRepository) -> Self {
        Self { profiles, projects }
    }

    pub async fn get(&self, user_id: &str) -> Result<UserProfile, ProfileError> {
        self.profiles
            .get(user_id)
            .await?
            .ok_or(ProfileError::NotFound)
    }

    /// Apply an edit, creating the profile if needed. Last write wins per
    /// field; onboarding state is left alone.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        user_id: &str,
        mut request: UpdateProfileRequest,
    ) -> Result<UserProfile, ProfileError> {
        if request.inner_boardroom.as_ref().is_some_and(|b| !b.is_object()) {
            return Err(ProfileError::Invalid(
                "inner_boardroom must be an object".to_string(),
            ));
        }
        request.non_negotiable_values = request.non_negotiable_values.map(clean_values);

        Ok(self.profiles.apply_edit(user_id, &request, &now()).await?)
    }

    pub async fn onboarding_status(&self, user_id: &str) -> Result<OnboardingStatus, ProfileError> {
        let completed = self
            .profiles
            .get(user_id)
            .await?
            .is_some_and(|p| p.onboarding_completed);
        Ok(OnboardingStatus { completed })
    }

    /// Write the onboarded profile with the default boardroom and create
    /// the starter project.
    #[instrument(skip(self, request))]
    pub async fn complete_onboarding(
        &self,
        user_id: &str,
        request: OnboardingRequest,
    ) -> Result<OnboardingResult, ProfileError> {
        request.validate().map_err(ProfileError::Invalid)?;

        let now = now();
        let mut profile = match self.profiles.get(user_id).await? {
            Some(existing) if existing.onboarding_completed => {
                return Err(ProfileError::AlreadyOnboarded);
            }
            Some(existing) => existing,
            None => UserProfile::empty(user_id, &now),
        };

        profile.user_name = request.user_name.trim().to_string();
        profile.role = request.role;
        profile.industry = request.industry;
        profile.bio = request.bio;
        profile.tone = request.tone;
        profile.non_negotiable_values = clean_values(request.non_negotiable_values);
        profile.prime_directive = request.prime_directive;
        profile.mount_everest = MountEverest {
            vision_statement: request.mount_everest_vision,
            why_it_matters: request.mount_everest_why,
            purpose_statement: request.mount_everest_purpose,
        };
        profile.inner_boardroom = default_inner_boardroom();
        profile.default_state_map = default_state_map();
        profile.skill_accelerator_mode = true;
        profile.auto_template_behavior = DEFAULT_AUTO_TEMPLATE_BEHAVIOR.to_string();
        profile.onboarding_completed = true;
        profile.updated_at = now;

        let starter = CreateProjectRequest {
            name: STARTER_PROJECT_NAME.to_string(),
            description: Some(STARTER_PROJECT_DESCRIPTION.to_string()),
            color: Some(DEFAULT_PROJECT_COLOR.to_string()),
            context_visibility: None,
        };

        let project_id = self
            .profiles
            .complete_onboarding(&profile, &starter)
            .await?
            .ok_or(ProfileError::AlreadyOnboarded)?;

        let project = self
            .projects
            .get(user_id, &project_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Project not found after onboarding"))?;

        info!("User {} completed onboarding", user_id);
        Ok(OnboardingResult { profile, project })
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn clean_values(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
