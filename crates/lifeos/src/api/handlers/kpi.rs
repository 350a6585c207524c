//! KPI handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{NaiveDate, Utc};
use tracing::instrument;

use super::super::error::{ApiError, ApiResult};
use super::super::state::AppState;
use crate::auth::CurrentUser;
use crate::kpi::{self, KpiMetric, KpiWeek, KpiWeekQuery, UpdateKpiMetricRequest};

fn reference_date(query: &KpiWeekQuery) -> ApiResult<NaiveDate> {
    match query.date.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            ApiError::bad_request(format!("Invalid date '{}', expected YYYY-MM-DD", raw))
        }),
        None => Ok(Utc::now().date_naive()),
    }
}

/// Metrics for the week containing `?date=` (default today, UTC).
#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn get_week_metrics(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<KpiWeekQuery>,
) -> ApiResult<Json<KpiWeek>> {
    let date = reference_date(&query)?;
    let week = kpi::load_week(&state.kpi, user.id(), date).await?;
    Ok(Json(week))
}

#[instrument(skip(state, user, request), fields(user_id = %user.id()))]
pub async fn update_metric(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateKpiMetricRequest>,
) -> ApiResult<Json<KpiMetric>> {
    state
        .kpi
        .update(user.id(), &id, request)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("KPI metric {}", id)))
}
