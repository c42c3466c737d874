//! Rule-based alert detection.
//!
//! Three independent rules run against every location:
//!
//! - **rating**: low `average_rating`;
//! - **response**: unanswered negative reviews among the most recent ones;
//! - **trend**: falling impressions over the trend window.
//!
//! Locations are evaluated in parallel. The combined list is then stably
//! sorted by severity, so consumers can show the worst alerts first while
//! keeping discovery order within a severity.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  entity::{Kpi, Location, Review},
  store::Snapshot,
  trend::{self, KpiMetric},
};

// ─── Alert types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
  Rating,
  Trend,
  Response,
}

/// Alert severity. Ordering is by urgency: `High < Medium < Low`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  High,
  Medium,
  Low,
}

/// A flag that a location needs operator attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
  pub location_id: String,
  pub store_code:  String,
  pub name:        String,
  pub city:        String,
  pub alert_type:  AlertType,
  pub severity:    Severity,
  pub message:     String,
}

impl Alert {
  fn new(location: &Location, alert_type: AlertType, severity: Severity, message: String) -> Self {
    Self {
      location_id: location.location_id.clone(),
      store_code: location.store_code.clone(),
      name: location.name.clone(),
      city: location.city.clone(),
      alert_type,
      severity,
      message,
    }
  }
}

// ─── Thresholds ──────────────────────────────────────────────────────────────

/// Rule thresholds. Rating and trend bounds are strict (`<`); response counts
/// are inclusive (`>=`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
  /// Ratings below this are `high`.
  pub rating_high:     f64,
  /// Ratings below this (and not `high`) are `medium`.
  pub rating_medium:   f64,
  /// How many of the most recent negative reviews the response rule looks at.
  pub response_window: usize,
  pub response_high:   usize,
  pub response_medium: usize,
  /// Impressions change (percent) below this is `high`.
  pub trend_high:      f64,
  pub trend_medium:    f64,
}

impl Default for AlertThresholds {
  fn default() -> Self {
    Self {
      rating_high:     3.0,
      rating_medium:   3.5,
      response_window: 5,
      response_high:   3,
      response_medium: 2,
      trend_high:      -30.0,
      trend_medium:    -20.0,
    }
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

fn rating_alert(location: &Location, t: &AlertThresholds) -> Option<Alert> {
  let rating = location.average_rating;
  let (severity, message) = if rating < t.rating_high {
    (Severity::High, format!("Critical rating: {rating} stars"))
  } else if rating < t.rating_medium {
    (Severity::Medium, format!("Low rating: {rating} stars"))
  } else {
    return None;
  };
  Some(Alert::new(location, AlertType::Rating, severity, message))
}

/// `reviews` must be newest first.
fn response_alert(
  location: &Location,
  reviews: &[&Review],
  t: &AlertThresholds,
) -> Option<Alert> {
  let unanswered = reviews
    .iter()
    .filter(|r| r.is_negative())
    .take(t.response_window)
    .filter(|r| !r.has_reply)
    .count();

  let severity = if unanswered >= t.response_high {
    Severity::High
  } else if unanswered >= t.response_medium {
    Severity::Medium
  } else {
    return None;
  };
  let message = format!("{unanswered} negative reviews without response");
  Some(Alert::new(location, AlertType::Response, severity, message))
}

fn trend_alert(
  location: &Location,
  kpis: &[&Kpi],
  window: usize,
  t: &AlertThresholds,
) -> Option<Alert> {
  if window == 0 || kpis.len() < window * 2 {
    return None;
  }
  let change = trend::location_change(kpis.iter().copied(), KpiMetric::Impressions, window);

  let severity = if change < t.trend_high {
    Severity::High
  } else if change < t.trend_medium {
    Severity::Medium
  } else {
    return None;
  };
  let message = format!("Visibility dropped {:.0}% in {window} weeks", change.abs());
  Some(Alert::new(location, AlertType::Trend, severity, message))
}

/// Every alert for one location, in rule order (rating, response, trend).
/// `reviews` must be newest first; `kpis` may be in any order.
pub fn evaluate_location(
  location: &Location,
  reviews: &[&Review],
  kpis: &[&Kpi],
  window: usize,
  thresholds: &AlertThresholds,
) -> Vec<Alert> {
  [
    rating_alert(location, thresholds),
    response_alert(location, reviews, thresholds),
    trend_alert(location, kpis, window, thresholds),
  ]
  .into_iter()
  .flatten()
  .collect()
}

/// Evaluate every location in the snapshot and return all alerts, most
/// severe first.
pub fn detect_alerts(
  snapshot: &Snapshot,
  window: usize,
  thresholds: &AlertThresholds,
) -> Vec<Alert> {
  let index = snapshot.index();

  let per_location: Vec<Vec<Alert>> = snapshot
    .locations
    .par_iter()
    .map(|l| {
      evaluate_location(
        l,
        index.reviews(&l.location_id),
        index.kpis(&l.location_id),
        window,
        thresholds,
      )
    })
    .collect();

  let mut alerts: Vec<Alert> = per_location.into_iter().flatten().collect();
  alerts.sort_by_key(|a| a.severity);

  debug!(
    locations = snapshot.locations.len(),
    alerts = alerts.len(),
    "alert detection complete"
  );
  alerts
}
