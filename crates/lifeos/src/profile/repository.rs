//! Profile repository.

use anyhow::{Context, Result};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::instrument;

use super::models::{UpdateProfileRequest, UserProfile, UserProfileRow};
use crate::projects::{CreateProjectRequest, ProjectRepository};

/// Onboarding write. Leaves an already onboarded profile untouched.
const UPSERT_ONBOARDED_PROFILE: &str = r#"
    INSERT INTO user_profiles (
        id, user_id, user_name, role, industry, bio, tone, non_negotiable_values,
        prime_directive, mount_everest, inner_boardroom, default_state_map,
        skill_accelerator_mode, auto_template_behavior, onboarding_completed,
        created_at, updated_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(user_id) DO UPDATE SET
        user_name = excluded.user_name,
        role = excluded.role,
        industry = excluded.industry,
        bio = excluded.bio,
        tone = excluded.tone,
        non_negotiable_values = excluded.non_negotiable_values,
        prime_directive = excluded.prime_directive,
        mount_everest = excluded.mount_everest,
        inner_boardroom = excluded.inner_boardroom,
        default_state_map = excluded.default_state_map,
        skill_accelerator_mode = excluded.skill_accelerator_mode,
        auto_template_behavior = excluded.auto_template_behavior,
        onboarding_completed = excluded.onboarding_completed,
        updated_at = excluded.updated_at
    WHERE user_profiles.onboarding_completed = 0
"#;

/// Profile edit. A NULL parameter keeps the stored column; onboarding state
/// and defaults are never written here.
const EDIT_PROFILE: &str = r#"
    INSERT INTO user_profiles (
        id, user_id, user_name, role, industry, bio, tone, non_negotiable_values,
        prime_directive, mount_everest, inner_boardroom, created_at, updated_at
    )
    VALUES (
        ?1, ?2, COALESCE(?3, ''), COALESCE(?4, ''), COALESCE(?5, ''), COALESCE(?6, ''),
        COALESCE(?7, ''), COALESCE(?8, '[]'), COALESCE(?9, ''), COALESCE(?10, '{}'),
        COALESCE(?11, '{}'), ?12, ?12
    )
    ON CONFLICT(user_id) DO UPDATE SET
        user_name = COALESCE(?3, user_name),
        role = COALESCE(?4, role),
        industry = COALESCE(?5, industry),
        bio = COALESCE(?6, bio),
        tone = COALESCE(?7, tone),
        non_negotiable_values = COALESCE(?8, non_negotiable_values),
        prime_directive = COALESCE(?9, prime_directive),
        mount_everest = COALESCE(?10, mount_everest),
        inner_boardroom = COALESCE(?11, inner_boardroom),
        updated_at = ?12
"#;

/// Repository for user profiles.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserProfileRow>(
            r#"
            SELECT id, user_id, user_name, role, industry, bio, tone, non_negotiable_values,
                   prime_directive, mount_everest, inner_boardroom, default_state_map,
                   skill_accelerator_mode, auto_template_behavior, onboarding_completed,
                   created_at, updated_at
            FROM user_profiles
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user profile")?;

        Ok(row.map(UserProfile::from))
    }

    /// Write the fields present in `edit`, creating the profile if needed.
    /// Returns the stored profile.
    #[instrument(skip(self, edit))]
    pub async fn apply_edit(
        &self,
        user_id: &str,
        edit: &UpdateProfileRequest,
        now: &str,
    ) -> Result<UserProfile> {
        let values = edit
            .non_negotiable_values
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let mount_everest = edit.mount_everest.as_ref().map(serde_json::to_string).transpose()?;

        sqlx::query(EDIT_PROFILE)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(user_id)
            .bind(&edit.user_name)
            .bind(&edit.role)
            .bind(&edit.industry)
            .bind(&edit.bio)
            .bind(&edit.tone)
            .bind(values)
            .bind(&edit.prime_directive)
            .bind(mount_everest)
            .bind(edit.inner_boardroom.as_ref().map(|b| b.to_string()))
            .bind(now)
            .execute(&self.pool)
            .await
            .context("Failed to write profile edit")?;

        self.get(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Profile not found after edit"))
    }

    /// Write an onboarded profile and its starter project in one transaction.
    ///
    /// Returns `None` without writing anything when the user already
    /// completed onboarding.
    #[instrument(skip(self, profile, project), fields(user_id = %profile.user_id))]
    pub async fn complete_onboarding(
        &self,
        profile: &UserProfile,
        project: &CreateProjectRequest,
    ) -> Result<Option<String>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        if Self::upsert_onboarded(&mut *tx, profile).await? == 0 {
            tx.rollback().await.context("Failed to roll back onboarding")?;
            return Ok(None);
        }
        let project_id = ProjectRepository::insert(&mut *tx, &profile.user_id, project).await?;

        tx.commit().await.context("Failed to commit onboarding")?;
        Ok(Some(project_id))
    }

    /// Returns the number of rows written; 0 when already onboarded.
    async fn upsert_onboarded<'e, E>(executor: E, profile: &UserProfile) -> Result<u64>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(UPSERT_ONBOARDED_PROFILE)
            .bind(&profile.id)
            .bind(&profile.user_id)
            .bind(&profile.user_name)
            .bind(&profile.role)
            .bind(&profile.industry)
            .bind(&profile.bio)
            .bind(&profile.tone)
            .bind(serde_json::to_string(&profile.non_negotiable_values)?)
            .bind(&profile.prime_directive)
            .bind(serde_json::to_string(&profile.mount_everest)?)
            .bind(profile.inner_boardroom.to_string())
            .bind(profile.default_state_map.to_string())
            .bind(profile.skill_accelerator_mode)
            .bind(&profile.auto_template_behavior)
            .bind(profile.onboarding_completed)
            .bind(&profile.created_at)
            .bind(&profile.updated_at)
            .execute(executor)
            .await
            .context("Failed to upsert user profile")?;

        Ok(result.rows_affected())
    }
}
