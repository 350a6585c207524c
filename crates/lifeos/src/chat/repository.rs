//! Chat message repository.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::models::{ChatMessage, ConversationScope, CreateChatMessage};

const MESSAGE_COLUMNS: &str =
    "id, user_id, project_id, role, content, agent_id, message_metadata, created_at";

/// Repository for chat message storage. Rows are append-only.
#[derive(Debug, Clone)]
pub struct ChatRepository {
    pool: SqlitePool,
}

impl ChatRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a message and return the stored row.
    #[instrument(skip(self, message), fields(user_id = %message.user_id, role = %message.role))]
    pub async fn add(&self, message: CreateChatMessage) -> Result<ChatMessage> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let metadata = message.metadata.map(|m| m.to_string());

        debug!("Storing chat message {}", id);

        sqlx::query(
            r#"
            INSERT INTO chat_messages (id, user_id, project_id, role, content, agent_id, message_metadata, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&message.user_id)
        .bind(&message.project_id)
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(&message.agent_id)
        .bind(&metadata)
        .bind(&created_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert chat message")?;

        self.get(&message.user_id, &id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Chat message not found after insert"))
    }

    /// Get one of the user's messages.
    pub async fn get(&self, user_id: &str, id: &str) -> Result<Option<ChatMessage>> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM chat_messages WHERE id = ? AND user_id = ?");
        sqlx::query_as::<_, ChatMessage>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch chat message")
    }

    /// All messages of a conversation, oldest first.
    ///
    /// A scope without a project matches only the user's global messages.
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn list(&self, scope: &ConversationScope) -> Result<Vec<ChatMessage>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_messages \
             WHERE user_id = ? AND project_id IS ? \
             ORDER BY created_at ASC, seq ASC"
        );
        sqlx::query_as::<_, ChatMessage>(&sql)
            .bind(&scope.user_id)
            .bind(&scope.project_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list chat messages")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::models::MessageRole;
    use crate::db::Database;
    use serde_json::json;

    async fn setup() -> (Database, ChatRepository) {
        let db = Database::in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO projects (id, user_id, name, created_at, updated_at) VALUES ('p1', 'u1', 'P', '', '')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        let repo = ChatRepository::new(db.pool().clone());
        (db, repo)
    }

    fn message(user: &str, project: Option<&str>, role: MessageRole, content: &str) -> CreateChatMessage {
        CreateChatMessage {
            user_id: user.to_string(),
            project_id: project.map(str::to_string),
            role,
            content: content.to_string(),
            agent_id: None,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn test_add_and_list_in_order() {
        let (_db, repo) = setup().await;
        let scope = ConversationScope::global("u1");

        for i in 0..5 {
            repo.add(message("u1", None, MessageRole::User, &format!("m{i}")))
                .await
                .unwrap();
        }

        let messages = repo.list(&scope).await.unwrap();
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m0", "m1", "m2", "m3", "m4"]);
    }

    #[tokio::test]
    async fn test_scopes_are_isolated() {
        let (_db, repo) = setup().await;

        repo.add(message("u1", None, MessageRole::User, "global"))
            .await
            .unwrap();
        repo.add(message("u1", Some("p1"), MessageRole::User, "project"))
            .await
            .unwrap();
        repo.add(message("u2", None, MessageRole::User, "other user"))
            .await
            .unwrap();

        let global = repo.list(&ConversationScope::global("u1")).await.unwrap();
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].content, "global");

        let project = repo
            .list(&ConversationScope::new("u1", Some("p1".into())))
            .await
            .unwrap();
        assert_eq!(project.len(), 1);
        assert_eq!(project[0].project_id.as_deref(), Some("p1"));

        assert!(repo.list(&ConversationScope::global("u3")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_metadata_and_owner_check() {
        let (_db, repo) = setup().await;
        let mut create = message("u1", None, MessageRole::Assistant, "reply");
        create.metadata = Some(json!({"relay_status": 200}));

        let stored = repo.add(create).await.unwrap();
        assert_eq!(stored.role, MessageRole::Assistant);
        assert_eq!(stored.message_metadata.as_deref(), Some(r#"{"relay_status":200}"#));

        assert!(repo.get("u2", &stored.id).await.unwrap().is_none());
        assert!(repo.get("u1", &stored.id).await.unwrap().is_some());
    }
}
