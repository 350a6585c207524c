//! Project data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Color given to projects created without one.
pub const DEFAULT_PROJECT_COLOR: &str = "#6366F1";

/// Project entity with its message count.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub context_visibility: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    /// Chat messages stored in this project.
    pub message_count: i64,
}

/// Request to create a project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub context_visibility: Option<String>,
}

impl CreateProjectRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            color: None,
            context_visibility: None,
        }
    }

    /// Trimmed name, or `None` when blank.
    pub fn validated_name(&self) -> Option<&str> {
        Some(self.name.trim()).filter(|n| !n.is_empty())
    }
}

/// Request to update a project. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub context_visibility: Option<String>,
}

/// Query parameters for listing projects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectListQuery {
    /// Case-insensitive name filter.
    pub q: Option<String>,
}
