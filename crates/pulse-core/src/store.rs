//! The `EntityStore` trait and the [`Snapshot`] every computation runs over.
//!
//! The trait is implemented by storage backends (e.g. `pulse-store-sqlite`).
//! The engine never talks to a store directly: callers fetch one consistent
//! [`Snapshot`] up front and hand it to [`crate::Engine`].

use std::{collections::HashMap, convert::Infallible, future::Future};

use serde::{Deserialize, Serialize};

use crate::entity::{Kpi, Location, Review};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Read-only accessor over the three raw entity collections.
///
/// Ordering contract:
/// - locations by `average_rating`, highest first;
/// - reviews by `review_date`, newest first;
/// - KPI records by `week_start`, oldest first.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait EntityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All locations.
  fn fetch_locations(
    &self,
  ) -> impl Future<Output = Result<Vec<Location>, Self::Error>> + Send + '_;

  /// A single location by id. Returns `None` if not found.
  fn fetch_location<'a>(
    &'a self,
    location_id: &'a str,
  ) -> impl Future<Output = Result<Option<Location>, Self::Error>> + Send + 'a;

  /// Reviews, optionally restricted to one location.
  fn fetch_reviews<'a>(
    &'a self,
    location_id: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + 'a;

  /// KPI records, optionally restricted to one location.
  fn fetch_kpis<'a>(
    &'a self,
    location_id: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<Kpi>, Self::Error>> + Send + 'a;
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// One immutable view of all three fact streams, fetched once per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
  #[serde(default)]
  pub locations: Vec<Location>,
  #[serde(default)]
  pub reviews:   Vec<Review>,
  #[serde(default)]
  pub kpis:      Vec<Kpi>,
}

impl Snapshot {
  pub fn new(locations: Vec<Location>, reviews: Vec<Review>, kpis: Vec<Kpi>) -> Self {
    Self { locations, reviews, kpis }.normalized()
  }

  /// Fetch the full fleet snapshot from `store`.
  pub async fn fetch<S: EntityStore>(store: &S) -> Result<Self, S::Error> {
    let locations = store.fetch_locations().await?;
    let reviews = store.fetch_reviews(None).await?;
    let kpis = store.fetch_kpis(None).await?;
    Ok(Self { locations, reviews, kpis }.normalized())
  }

  /// Fetch a snapshot scoped to a single location. Returns `None` if the
  /// location does not exist.
  pub async fn fetch_for_location<S: EntityStore>(
    store: &S,
    location_id: &str,
  ) -> Result<Option<Self>, S::Error> {
    let Some(location) = store.fetch_location(location_id).await? else {
      return Ok(None);
    };
    let reviews = store.fetch_reviews(Some(location_id)).await?;
    let kpis = store.fetch_kpis(Some(location_id)).await?;
    Ok(Some(Self { locations: vec![location], reviews, kpis }.normalized()))
  }

  /// Parse a snapshot from its JSON form (`{"locations":[..],"reviews":[..],
  /// "kpis":[..]}`).
  pub fn from_json(raw: &str) -> crate::Result<Self> {
    let snapshot: Self = serde_json::from_str(raw)?;
    Ok(snapshot.normalized())
  }

  /// Re-establish the time-axis ordering the engine relies on: reviews newest
  /// first, KPI records oldest first. Both sorts are stable.
  pub fn normalized(mut self) -> Self {
    self.reviews.sort_by(|a, b| b.review_date.cmp(&a.review_date));
    self.kpis.sort_by(|a, b| a.week_start.cmp(&b.week_start));
    self
  }

  pub fn location(&self, location_id: &str) -> Option<&Location> {
    self.locations.iter().find(|l| l.location_id == location_id)
  }

  /// Group reviews and KPI records by location id, preserving snapshot order
  /// within each group.
  pub fn index(&self) -> SnapshotIndex<'_> {
    let mut reviews: HashMap<&str, Vec<&Review>> = HashMap::new();
    for review in &self.reviews {
      reviews.entry(review.location_id.as_str()).or_default().push(review);
    }
    let mut kpis: HashMap<&str, Vec<&Kpi>> = HashMap::new();
    for kpi in &self.kpis {
      kpis.entry(kpi.location_id.as_str()).or_default().push(kpi);
    }
    SnapshotIndex { reviews, kpis }
  }
}

/// Per-location lookup tables borrowed from a [`Snapshot`].
#[derive(Debug)]
pub struct SnapshotIndex<'a> {
  reviews: HashMap<&'a str, Vec<&'a Review>>,
  kpis:    HashMap<&'a str, Vec<&'a Kpi>>,
}

impl<'a> SnapshotIndex<'a> {
  /// Reviews for a location, newest first.
  pub fn reviews(&self, location_id: &str) -> &[&'a Review] {
    self.reviews.get(location_id).map(Vec::as_slice).unwrap_or_default()
  }

  /// KPI records for a location, oldest first.
  pub fn kpis(&self, location_id: &str) -> &[&'a Kpi] {
    self.kpis.get(location_id).map(Vec::as_slice).unwrap_or_default()
  }
}

// ─── In-memory store ─────────────────────────────────────────────────────────

/// An [`EntityStore`] over data already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  snapshot: Snapshot,
}

impl MemoryStore {
  pub fn new(snapshot: Snapshot) -> Self { Self { snapshot } }
}

impl EntityStore for MemoryStore {
  type Error = Infallible;

  async fn fetch_locations(&self) -> Result<Vec<Location>, Infallible> {
    let mut locations = self.snapshot.locations.clone();
    locations.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
    Ok(locations)
  }

  async fn fetch_location(
    &self,
    location_id: &str,
  ) -> Result<Option<Location>, Infallible> {
    Ok(self.snapshot.location(location_id).cloned())
  }

  async fn fetch_reviews(
    &self,
    location_id: Option<&str>,
  ) -> Result<Vec<Review>, Infallible> {
    let mut reviews: Vec<Review> = self
      .snapshot
      .reviews
      .iter()
      .filter(|r| location_id.is_none_or(|id| r.location_id == id))
      .cloned()
      .collect();
    reviews.sort_by(|a, b| b.review_date.cmp(&a.review_date));
    Ok(reviews)
  }

  async fn fetch_kpis(
    &self,
    location_id: Option<&str>,
  ) -> Result<Vec<Kpi>, Infallible> {
    let mut kpis: Vec<Kpi> = self
      .snapshot
      .kpis
      .iter()
      .filter(|k| location_id.is_none_or(|id| k.location_id == id))
      .cloned()
      .collect();
    kpis.sort_by(|a, b| a.week_start.cmp(&b.week_start));
    Ok(kpis)
  }
}
