//! KPI metric models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

use super::week::WeekRange;

/// Period type of the weekly metrics.
pub const WEEKLY: &str = "weekly";

/// Metrics every user tracks each week, as `(name, icon)`.
pub const DEFAULT_METRICS: [(&str, &str); 8] = [
    ("🔥 Revenue Generated", "🔥"),
    ("🧠 Masterclass Signups", "🧠"),
    ("🎥 Longform Videos Posted", "🎥"),
    ("🎞️ Shorts/Clips Distributed", "🎞️"),
    ("🧰 Lead Magnet GPTs Built", "🧰"),
    ("💬 Strategy Calls Booked", "💬"),
    ("📨 Newsletter Sent", "📨"),
    ("🧗 LifeOS Users/Opt-Ins", "🧗"),
];

#[derive(Debug, Clone, FromRow)]
pub(crate) struct KpiMetricRow {
    pub id: String,
    pub user_id: String,
    pub project_id: Option<String>,
    pub metric_name: String,
    pub target_value: Option<f64>,
    pub actual_value: Option<f64>,
    pub period_type: String,
    pub period_start: String,
    pub period_end: String,
    pub metadata: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A metric as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct KpiMetric {
    pub id: String,
    pub user_id: String,
    pub project_id: Option<String>,
    pub metric_name: String,
    pub target_value: Option<f64>,
    pub actual_value: Option<f64>,
    pub period_type: String,
    pub period_start: String,
    pub period_end: String,
    pub metadata: Value,
    /// Percent of target reached, 0 to 100.
    pub progress: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<KpiMetricRow> for KpiMetric {
    fn from(row: KpiMetricRow) -> Self {
        Self {
            progress: progress(row.actual_value, row.target_value),
            metadata: parse_metadata(row.metadata.as_deref()),
            id: row.id,
            user_id: row.user_id,
            project_id: row.project_id,
            metric_name: row.metric_name,
            target_value: row.target_value,
            actual_value: row.actual_value,
            period_type: row.period_type,
            period_start: row.period_start,
            period_end: row.period_end,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(crate) fn parse_metadata(text: Option<&str>) -> Value {
    match text.map(serde_json::from_str::<Value>) {
        Some(Ok(value @ Value::Object(_))) => value,
        _ => Value::Object(Map::new()),
    }
}

/// Percent of `target` reached by `actual`.
///
/// Missing or zero values count as no progress; overshooting caps at 100.
pub fn progress(actual: Option<f64>, target: Option<f64>) -> f64 {
    match (actual, target) {
        (Some(actual), Some(target)) if actual != 0.0 && target != 0.0 => {
            (actual / target * 100.0).min(100.0)
        }
        _ => 0.0,
    }
}

/// Metrics of one week.
#[derive(Debug, Clone, Serialize)]
pub struct KpiWeek {
    pub week: WeekRange,
    /// Display label such as `Oct 18 - Oct 24`.
    pub label: String,
    pub metrics: Vec<KpiMetric>,
}

/// Update of one metric.
///
/// Both values are replaced (null clears them); `notes` is merged into the
/// metadata when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateKpiMetricRequest {
    #[serde(default)]
    pub target_value: Option<f64>,
    #[serde(default)]
    pub actual_value: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Query parameters for loading a week.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KpiWeekQuery {
    /// Any date inside the wanted week, `YYYY-MM-DD`. Defaults to today (UTC).
    pub date: Option<String>,
}
