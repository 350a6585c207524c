//! User profile and onboarding.
//!
//! Onboarding collects the user's identity, values and vision, seats the
//! default inner boardroom, and creates a starter project.

mod boardroom;
mod models;
mod repository;
mod service;

pub use boardroom::{
    BoardMember, DEFAULT_AUTO_TEMPLATE_BEHAVIOR, DEFAULT_BOARDROOM, DEFAULT_STATE_MAP,
    default_inner_boardroom, default_state_map,
};
pub use models::{
    MAX_CORE_VALUES, MountEverest, OnboardingRequest, OnboardingResult, OnboardingStatus,
    UpdateProfileRequest, UserProfile,
};
pub use repository::ProfileRepository;
pub use service::{ProfileError, ProfileService, STARTER_PROJECT_NAME};
