//! Project repository for database operations.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::models::{
    CreateProjectRequest, DEFAULT_PROJECT_COLOR, Project, ProjectListQuery, UpdateProjectRequest,
};

const PROJECT_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.name, p.description, p.color, p.context_visibility,
           p.is_active, p.created_at, p.updated_at,
           (SELECT COUNT(*) FROM chat_messages m
             WHERE m.project_id = p.id AND m.user_id = p.user_id) AS message_count
    FROM projects p
"#;

/// Repository for project database operations.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: SqlitePool,
}

impl ProjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a project row with defaults applied, on any executor.
    ///
    /// Returns the new project ID. Callers validate the name first.
    pub(crate) async fn insert<'e, E>(
        executor: E,
        user_id: &str,
        request: &CreateProjectRequest,
    ) -> Result<String>
    where
        E: SqliteExecutor<'e>,
    {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let name = request.name.trim();
        let description = request
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("{} project workspace", name));
        let color = request
            .color
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROJECT_COLOR.to_string());

        sqlx::query(
            r#"
            INSERT INTO projects (id, user_id, name, description, color, context_visibility, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(name)
        .bind(&description)
        .bind(&color)
        .bind(&request.context_visibility)
        .bind(&now)
        .bind(&now)
        .execute(executor)
        .await
        .context("Failed to insert project")?;

        Ok(id)
    }

    /// Create a project for `user_id`.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, user_id: &str, request: CreateProjectRequest) -> Result<Project> {
        let id = Self::insert(&self.pool, user_id, &request).await?;
        debug!("Created project {} for {}", id, user_id);

        self.get(user_id, &id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Project not found after creation"))
    }

    /// Get one of the user's projects, archived or not.
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: &str, id: &str) -> Result<Option<Project>> {
        let sql = format!("{PROJECT_SELECT} WHERE p.id = ? AND p.user_id = ?");
        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch project")
    }

    /// Get an active project of the user.
    pub async fn get_active(&self, user_id: &str, id: &str) -> Result<Option<Project>> {
        Ok(self.get(user_id, id).await?.filter(|p| p.is_active))
    }

    /// List the user's active projects, newest first.
    #[instrument(skip(self, query))]
    pub async fn list(&self, user_id: &str, query: &ProjectListQuery) -> Result<Vec<Project>> {
        let filter = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q.to_lowercase()));

        let mut qb: sqlx::QueryBuilder<sqlx::Sqlite> = sqlx::QueryBuilder::new(PROJECT_SELECT);
        qb.push(" WHERE p.user_id = ");
        qb.push_bind(user_id);
        qb.push(" AND p.is_active = 1");
        if let Some(pattern) = filter {
            qb.push(" AND LOWER(p.name) LIKE ");
            qb.push_bind(pattern);
        }
        qb.push(" ORDER BY p.created_at DESC, p.rowid DESC");

        qb.build_query_as::<Project>()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list projects")
    }

    /// Update a project. Returns `None` when the user does not own it.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateProjectRequest,
    ) -> Result<Option<Project>> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let result = sqlx::query(
            r#"
            UPDATE projects
            SET name = COALESCE(?, name),
                description = COALESCE(?, description),
                color = COALESCE(?, color),
                context_visibility = COALESCE(?, context_visibility),
                updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(request.name.as_deref().map(str::trim))
        .bind(&request.description)
        .bind(&request.color)
        .bind(&request.context_visibility)
        .bind(&now)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("Failed to update project")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(user_id, id).await
    }

    /// Archive a project. Returns `false` when the user does not own it.
    #[instrument(skip(self))]
    pub async fn archive(&self, user_id: &str, id: &str) -> Result<bool> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let result = sqlx::query(
            "UPDATE projects SET is_active = 0, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(&now)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("Failed to archive project")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup() -> (Database, ProjectRepository) {
        let db = Database::in_memory().await.unwrap();
        let repo = ProjectRepository::new(db.pool().clone());
        (db, repo)
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let (_db, repo) = setup().await;

        let project = repo
            .create("u1", CreateProjectRequest::named("  Launch  "))
            .await
            .unwrap();

        assert_eq!(project.name, "Launch");
        assert_eq!(project.description.as_deref(), Some("Launch project workspace"));
        assert_eq!(project.color.as_deref(), Some(DEFAULT_PROJECT_COLOR));
        assert!(project.is_active);
        assert_eq!(project.message_count, 0);
    }

    #[tokio::test]
    async fn test_list_filters_owner_archived_and_query() {
        let (_db, repo) = setup().await;

        let alpha = repo.create("u1", CreateProjectRequest::named("Alpha Plan")).await.unwrap();
        repo.create("u1", CreateProjectRequest::named("Beta")).await.unwrap();
        repo.create("u2", CreateProjectRequest::named("Alpha Other")).await.unwrap();
        let archived = repo.create("u1", CreateProjectRequest::named("Old")).await.unwrap();
        assert!(repo.archive("u1", &archived.id).await.unwrap());

        let all = repo.list("u1", &ProjectListQuery::default()).await.unwrap();
        let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Alpha Plan"]);

        let found = repo
            .list("u1", &ProjectListQuery { q: Some("alpha".into()) })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, alpha.id);
    }

    #[tokio::test]
    async fn test_foreign_owner_sees_nothing() {
        let (_db, repo) = setup().await;
        let project = repo.create("u1", CreateProjectRequest::named("Mine")).await.unwrap();

        assert!(repo.get("u2", &project.id).await.unwrap().is_none());
        assert!(
            repo.update("u2", &project.id, UpdateProjectRequest::default())
                .await
                .unwrap()
                .is_none()
        );
        assert!(!repo.archive("u2", &project.id).await.unwrap());
        assert!(repo.get_active("u1", &project.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_keeps_absent_fields() {
        let (_db, repo) = setup().await;
        let project = repo.create("u1", CreateProjectRequest::named("Mine")).await.unwrap();

        let updated = repo
            .update(
                "u1",
                &project.id,
                UpdateProjectRequest {
                    color: Some("#000000".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Mine");
        assert_eq!(updated.color.as_deref(), Some("#000000"));
        assert_eq!(updated.description, project.description);
    }

    #[tokio::test]
    async fn test_message_count() {
        let (db, repo) = setup().await;
        let project = repo.create("u1", CreateProjectRequest::named("Mine")).await.unwrap();

        for i in 0..3 {
            sqlx::query(
                "INSERT INTO chat_messages (id, user_id, project_id, role, content, created_at) VALUES (?, 'u1', ?, 'user', 'x', '')",
            )
            .bind(format!("m{i}"))
            .bind(&project.id)
            .execute(db.pool())
            .await
            .unwrap();
        }

        let project = repo.get("u1", &project.id).await.unwrap().unwrap();
        assert_eq!(project.message_count, 3);
        assert!(repo.get_active("u1", "missing").await.unwrap().is_none());
    }
}
