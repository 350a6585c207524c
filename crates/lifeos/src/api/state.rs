//! Application state.

use crate::auth::AuthState;
use crate::chat::{ChatRepository, ChatService};
use crate::db::Database;
use crate::kpi::KpiRepository;
use crate::profile::{ProfileRepository, ProfileService};
use crate::projects::ProjectRepository;
use crate::relay::AgentRelay;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Authentication state.
    pub auth: AuthState,
    /// Agent webhook relay.
    pub relay: AgentRelay,
    /// Chat turns.
    pub chat: ChatService,
    /// Project workspaces.
    pub projects: ProjectRepository,
    /// Profiles and onboarding.
    pub profiles: ProfileService,
    /// Weekly KPI metrics.
    pub kpi: KpiRepository,
}

impl AppState {
    /// Wire repositories and services over one database.
    pub fn new(db: Database, auth: AuthState, relay: AgentRelay) -> Self {
        let pool = db.pool().clone();
        let projects = ProjectRepository::new(pool.clone());
        let chat = ChatService::new(
            ChatRepository::new(pool.clone()),
            projects.clone(),
            relay.clone(),
        );
        let profiles = ProfileService::new(ProfileRepository::new(pool.clone()), projects.clone());

        Self {
            db,
            auth,
            relay,
            chat,
            projects,
            profiles,
            kpi: KpiRepository::new(pool),
        }
    }
}
