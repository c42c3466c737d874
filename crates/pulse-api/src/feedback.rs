//! Handler for `POST /feedback/categorize`.
//!
//! Body: `{"text": "..."}`. Responds with the matched themes (never empty,
//! `General` when nothing else matches) and the sentiment keywords found.

use axum::{Json, extract::State};
use pulse_core::{
  feedback::{SentimentKeywords, Theme},
  store::EntityStore,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CategorizeBody {
  pub text: String,
}

#[derive(Debug, Serialize)]
pub struct Categorized {
  pub themes:    Vec<Theme>,
  pub sentiment: SentimentKeywords,
}

/// `POST /feedback/categorize`
pub async fn categorize<S: EntityStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<CategorizeBody>,
) -> Result<Json<Categorized>, ApiError> {
  if body.text.trim().is_empty() {
    return Err(ApiError::BadRequest("text must not be empty".into()));
  }
  Ok(Json(Categorized {
    themes:    state.engine.categorize(&body.text),
    sentiment: state.engine.sentiment_keywords(&body.text),
  }))
}
