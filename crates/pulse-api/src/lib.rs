//! JSON REST API for Pulse.
//!
//! Exposes an axum [`Router`] backed by any [`pulse_core::store::EntityStore`].
//! Every handler fetches one [`Snapshot`] and derives its answer from it, so
//! nothing computed is cached between requests. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", pulse_api::api_router(store.clone(), engine))
//! ```

pub mod error;
pub mod feedback;
pub mod fleet;
pub mod performance;
pub mod trends;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use pulse_core::{
  Engine,
  store::{EntityStore, Snapshot},
};

pub use error::ApiError;

/// Shared handler state: the store to read from and the configured engine.
pub struct ApiState<S> {
  pub store:  Arc<S>,
  pub engine: Arc<Engine>,
}

// Manual impl: `S` itself need not be `Clone`.
impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), engine: Arc::clone(&self.engine) }
  }
}

impl<S: EntityStore> ApiState<S> {
  /// Fetch the full snapshot every derivation runs over.
  async fn snapshot(&self) -> Result<Snapshot, ApiError> {
    Snapshot::fetch(self.store.as_ref()).await.map_err(ApiError::store)
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, engine: Engine) -> Router<()>
where
  S: EntityStore + 'static,
{
  let state = ApiState { store, engine: Arc::new(engine) };

  Router::new()
    // Fleet
    .route("/dashboard", get(fleet::dashboard::<S>))
    .route("/alerts", get(fleet::alerts::<S>))
    .route("/locations", get(fleet::health::<S>))
    .route("/locations/{id}/insights", get(fleet::insights::<S>))
    .route("/reviews/analytics", get(fleet::review_analytics::<S>))
    // Trends
    .route("/trends/weekly", get(trends::weekly::<S>))
    .route("/trends/week-over-week", get(trends::week_over_week::<S>))
    .route("/trends/global", get(trends::global::<S>))
    .route("/trends/locations", get(trends::locations::<S>))
    .route("/trends/cities/{city}", get(trends::city::<S>))
    .route("/trends/categories/{category}", get(trends::category::<S>))
    // Rollups
    .route("/performance/cities", get(performance::cities::<S>))
    .route("/performance/categories", get(performance::categories::<S>))
    // Feedback
    .route("/feedback/categorize", post(feedback::categorize::<S>))
    .with_state(state)
}
