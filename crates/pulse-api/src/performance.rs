//! Handlers for `/performance` rollups.

use axum::{Json, extract::State};
use pulse_core::{
  rollup::{CategoryPerformance, CityPerformance},
  store::EntityStore,
};

use crate::{ApiState, error::ApiError};

/// `GET /performance/cities`: best average rating first.
pub async fn cities<S: EntityStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<CityPerformance>>, ApiError> {
  let snapshot = state.snapshot().await?;
  Ok(Json(state.engine.city_performance(&snapshot)))
}

/// `GET /performance/categories`: best average rating first.
pub async fn categories<S: EntityStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<CategoryPerformance>>, ApiError> {
  let snapshot = state.snapshot().await?;
  Ok(Json(state.engine.category_performance(&snapshot)))
}
