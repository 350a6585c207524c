//! Project workspaces.
//!
//! Projects group a user's chat messages and metrics. Deleting a project
//! archives it; archived projects drop out of listings but keep their data.

mod models;
mod repository;

pub use models::{
    CreateProjectRequest, DEFAULT_PROJECT_COLOR, Project, ProjectListQuery, UpdateProjectRequest,
};
pub use repository::ProjectRepository;
