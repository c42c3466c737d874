//! Handlers for `/trends` endpoints.
//!
//! Every trend endpoint that takes a metric accepts
//! `?metric=impressions|calls|bookings|directions|website_clicks`
//! (default `impressions`).

use axum::{
  Json,
  extract::{Path, Query, State},
};
use pulse_core::{
  store::EntityStore,
  trend::{KpiMetric, LocationTrend, TrendDirection, WeekOverWeek, WeeklyTrend},
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct MetricParams {
  #[serde(default)]
  pub metric: KpiMetric,
  /// Truncate the result list (per-location trends only).
  pub limit:  Option<usize>,
}

/// A single aggregate change, as returned for global/city/category trends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTrend {
  pub group:     String,
  pub metric:    KpiMetric,
  pub change:    f64,
  pub direction: TrendDirection,
}

/// `GET /trends/weekly`: fleet totals per week, oldest first.
pub async fn weekly<S: EntityStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<WeeklyTrend>>, ApiError> {
  let snapshot = state.snapshot().await?;
  Ok(Json(state.engine.weekly_trends(&snapshot)))
}

/// `GET /trends/week-over-week`
pub async fn week_over_week<S: EntityStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<WeekOverWeek>, ApiError> {
  let snapshot = state.snapshot().await?;
  Ok(Json(state.engine.week_over_week(&snapshot)))
}

/// `GET /trends/locations[?metric=..][&limit=..]`: highest change first.
/// Reverse the list for "top declining".
pub async fn locations<S: EntityStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<MetricParams>,
) -> Result<Json<Vec<LocationTrend>>, ApiError> {
  let snapshot = state.snapshot().await?;
  let mut trends = state.engine.location_trends(&snapshot, params.metric);
  if let Some(limit) = params.limit {
    trends.truncate(limit);
  }
  Ok(Json(trends))
}

/// `GET /trends/global[?metric=..]`
pub async fn global<S: EntityStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<MetricParams>,
) -> Result<Json<GroupTrend>, ApiError> {
  let snapshot = state.snapshot().await?;
  let change = state.engine.global_trend(&snapshot, params.metric);
  Ok(Json(group_trend(&state, "all".into(), params.metric, change)))
}

/// `GET /trends/cities/{city}[?metric=..]`
///
/// An unknown city has no KPI records and reports zero change.
pub async fn city<S: EntityStore>(
  State(state): State<ApiState<S>>,
  Path(city): Path<String>,
  Query(params): Query<MetricParams>,
) -> Result<Json<GroupTrend>, ApiError> {
  let snapshot = state.snapshot().await?;
  let change = state.engine.city_trend(&snapshot, &city, params.metric);
  Ok(Json(group_trend(&state, city, params.metric, change)))
}

/// `GET /trends/categories/{category}[?metric=..]`
pub async fn category<S: EntityStore>(
  State(state): State<ApiState<S>>,
  Path(category): Path<String>,
  Query(params): Query<MetricParams>,
) -> Result<Json<GroupTrend>, ApiError> {
  let snapshot = state.snapshot().await?;
  let change = state.engine.category_trend(&snapshot, &category, params.metric);
  Ok(Json(group_trend(&state, category, params.metric, change)))
}

fn group_trend<S>(state: &ApiState<S>, group: String, metric: KpiMetric, change: f64) -> GroupTrend {
  GroupTrend {
    group,
    metric,
    change,
    direction: TrendDirection::from_change(change, state.engine.config().trend_flat_band),
  }
}
