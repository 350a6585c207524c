//! KPI metric repository.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::models::{
    DEFAULT_METRICS, KpiMetric, KpiMetricRow, UpdateKpiMetricRequest, WEEKLY, parse_metadata,
};
use super::week::WeekRange;

const METRIC_COLUMNS: &str = "id, user_id, project_id, metric_name, target_value, actual_value, \
     period_type, period_start, period_end, metadata, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct KpiRepository {
    pool: SqlitePool,
}

impl KpiRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the default metrics missing for the week.
    ///
    /// Existing rows are left alone, so concurrent loads cannot duplicate.
    /// Returns the number of rows created.
    #[instrument(skip(self))]
    pub async fn seed_defaults(&self, user_id: &str, week: &WeekRange) -> Result<u64> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let mut created = 0;

        for (name, icon) in DEFAULT_METRICS {
            let result = sqlx::query(
                r#"
                INSERT OR IGNORE INTO kpi_metrics
                    (id, user_id, metric_name, target_value, actual_value, period_type,
                     period_start, period_end, metadata, created_at, updated_at)
                VALUES (?, ?, ?, NULL, NULL, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(user_id)
            .bind(name)
            .bind(WEEKLY)
            .bind(week.start_key())
            .bind(week.end_key())
            .bind(json!({ "icon": icon, "notes": "" }).to_string())
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .context("Failed to seed KPI metric")?;
            created += result.rows_affected();
        }

        tx.commit().await.context("Failed to commit KPI seed")?;
        if created > 0 {
            debug!("Seeded {} KPI metrics for {}", created, user_id);
        }
        Ok(created)
    }

    /// Weekly metrics falling inside `week`, in creation order.
    #[instrument(skip(self))]
    pub async fn list_week(&self, user_id: &str, week: &WeekRange) -> Result<Vec<KpiMetric>> {
        let sql = format!(
            "SELECT {METRIC_COLUMNS} FROM kpi_metrics \
             WHERE user_id = ? AND period_type = ? AND period_start >= ? AND period_end <= ? \
             ORDER BY created_at ASC, rowid ASC"
        );
        let rows = sqlx::query_as::<_, KpiMetricRow>(&sql)
            .bind(user_id)
            .bind(WEEKLY)
            .bind(week.start_key())
            .bind(week.end_key())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list KPI metrics")?;

        Ok(rows.into_iter().map(KpiMetric::from).collect())
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<Option<KpiMetric>> {
        Ok(self.get_row(user_id, id).await?.map(KpiMetric::from))
    }

    /// Apply an update. Returns `None` when the user does not own the metric.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateKpiMetricRequest,
    ) -> Result<Option<KpiMetric>> {
        let Some(row) = self.get_row(user_id, id).await? else {
            return Ok(None);
        };

        let mut metadata = parse_metadata(row.metadata.as_deref());
        if let (Some(notes), Value::Object(map)) = (request.notes, &mut metadata) {
            map.insert("notes".to_string(), Value::String(notes));
        }
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        sqlx::query(
            r#"
            UPDATE kpi_metrics
            SET target_value = ?, actual_value = ?, metadata = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(request.target_value)
        .bind(request.actual_value)
        .bind(metadata.to_string())
        .bind(&now)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("Failed to update KPI metric")?;

        self.get(user_id, id).await
    }

    async fn get_row(&self, user_id: &str, id: &str) -> Result<Option<KpiMetricRow>> {
        let sql = format!("SELECT {METRIC_COLUMNS} FROM kpi_metrics WHERE id = ? AND user_id = ?");
        sqlx::query_as::<_, KpiMetricRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch KPI metric")
    }
}
