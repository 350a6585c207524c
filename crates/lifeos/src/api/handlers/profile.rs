//! Profile and onboarding handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::{info, instrument};

use super::super::error::ApiResult;
use super::super::state::AppState;
use crate::auth::CurrentUser;
use crate::profile::{
    OnboardingRequest, OnboardingResult, OnboardingStatus, UpdateProfileRequest, UserProfile,
};

pub async fn get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.profiles.get(user.id()).await?))
}

#[instrument(skip(state, user, request), fields(user_id = %user.id()))]
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.profiles.update(user.id(), request).await?))
}

pub async fn onboarding_status(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<OnboardingStatus>> {
    Ok(Json(state.profiles.onboarding_status(user.id()).await?))
}

/// Finish onboarding: profile defaults plus the starter project.
#[instrument(skip(state, user, request), fields(user_id = %user.id()))]
pub async fn complete_onboarding(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<OnboardingRequest>,
) -> ApiResult<(StatusCode, Json<OnboardingResult>)> {
    let result = state.profiles.complete_onboarding(user.id(), request).await?;
    info!("Onboarding completed for {}", user.id());
    Ok((StatusCode::CREATED, Json(result)))
}
