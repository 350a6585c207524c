//! Weekly KPI tracking.
//!
//! Each user tracks a fixed set of metrics per Sunday-to-Saturday week. The
//! set is seeded the first time a week is loaded.

mod models;
mod repository;
mod week;

pub use models::{
    DEFAULT_METRICS, KpiMetric, KpiWeek, KpiWeekQuery, UpdateKpiMetricRequest, WEEKLY, progress,
};
pub use repository::KpiRepository;
pub use week::WeekRange;

use anyhow::Result;
use chrono::NaiveDate;

/// Seed the week's defaults if needed and return its metrics.
pub async fn load_week(repo: &KpiRepository, user_id: &str, date: NaiveDate) -> Result<KpiWeek> {
    let week = WeekRange::containing(date);
    repo.seed_defaults(user_id, &week).await?;
    let metrics = repo.list_week(user_id, &week).await?;

    Ok(KpiWeek {
        label: week.label(),
        week,
        metrics,
    })
}
