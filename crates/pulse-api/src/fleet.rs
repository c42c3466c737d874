//! Fleet-wide and single-location handlers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/dashboard` | Headline totals |
//! | `GET`  | `/alerts` | Most severe first |
//! | `GET`  | `/locations` | Health entry per location |
//! | `GET`  | `/locations/{id}/insights` | 404 if not found |
//! | `GET`  | `/reviews/analytics` | Optional `?location_id=` |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use pulse_core::{
  alert::Alert,
  insight::{DashboardStats, LocationHealth, LocationInsights, ReviewAnalytics},
  store::{EntityStore, Snapshot},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

/// `GET /dashboard`
pub async fn dashboard<S: EntityStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<DashboardStats>, ApiError> {
  let snapshot = state.snapshot().await?;
  Ok(Json(state.engine.dashboard_stats(&snapshot)))
}

/// `GET /alerts`
pub async fn alerts<S: EntityStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Alert>>, ApiError> {
  let snapshot = state.snapshot().await?;
  Ok(Json(state.engine.alerts(&snapshot)))
}

/// `GET /locations`
pub async fn health<S: EntityStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<LocationHealth>>, ApiError> {
  let snapshot = state.snapshot().await?;
  Ok(Json(state.engine.location_health(&snapshot)))
}

/// `GET /locations/{id}/insights`
pub async fn insights<S: EntityStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<LocationInsights>, ApiError> {
  let not_found = || ApiError::NotFound(format!("location {id} not found"));

  let snapshot = Snapshot::fetch_for_location(state.store.as_ref(), &id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(not_found)?;
  let insights = state
    .engine
    .location_insights(&snapshot, &id)
    .ok_or_else(not_found)?;
  Ok(Json(insights))
}

// ─── Review analytics ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
  pub location_id: Option<String>,
}

/// `GET /reviews/analytics[?location_id=<id>]`
pub async fn review_analytics<S: EntityStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<AnalyticsParams>,
) -> Result<Json<ReviewAnalytics>, ApiError> {
  let snapshot = match params.location_id.as_deref() {
    Some(id) => Snapshot::fetch_for_location(state.store.as_ref(), id)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::NotFound(format!("location {id} not found")))?,
    None => state.snapshot().await?,
  };
  Ok(Json(state.engine.review_analytics(&snapshot)))
}
