//! Raw entity types: the three fact streams supplied by the entity store.
//!
//! The engine treats every value here as read-only input. Entities are
//! created and updated exclusively by the external data source.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── Location ────────────────────────────────────────────────────────────────

/// A single business location (store, clinic, branch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub location_id:      String,
  pub store_code:       String,
  pub name:             String,
  /// Street address line.
  pub address:          String,
  pub city:             String,
  pub state:            String,
  pub postal_code:      String,
  pub latitude:         f64,
  pub longitude:        f64,
  /// Single category tag, e.g. "Dental Clinic".
  pub primary_category: String,
  pub phone:            String,
  pub website:          String,
  /// Aggregate star rating in `[1.0, 5.0]`.
  pub average_rating:   f64,
  pub total_reviews:    u32,
  pub is_verified:      bool,
}

// ─── Review ──────────────────────────────────────────────────────────────────

/// A customer review of one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
  pub review_id:     String,
  /// Not enforced as a foreign key; unknown locations are skipped by every
  /// location-scoped aggregate.
  pub location_id:   String,
  /// Star rating, 1 through 5.
  pub rating:        u8,
  pub review_text:   String,
  pub reviewer_name: String,
  pub review_date:   NaiveDate,
  /// Language tag, e.g. "en" or "hi".
  pub language:      String,
  pub has_reply:     bool,
  /// May be absent even when `has_reply` is set; use [`Review::reply`].
  #[serde(default)]
  pub reply_text:    Option<String>,
}

impl Review {
  /// Reply content, only ever present when the review is marked as replied.
  pub fn reply(&self) -> Option<&str> {
    if self.has_reply { self.reply_text.as_deref() } else { None }
  }

  /// Rated 1 or 2 stars.
  pub fn is_negative(&self) -> bool { self.rating <= 2 }

  /// Rated 4 or 5 stars.
  pub fn is_positive(&self) -> bool { self.rating >= 4 }
}

// ─── KPI ─────────────────────────────────────────────────────────────────────

/// One week of performance counters for one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpi {
  pub kpi_id:             String,
  pub location_id:        String,
  /// Start of the ISO week; the only time axis the engine uses.
  pub week_start:         NaiveDate,
  pub impressions_maps:   u64,
  pub impressions_search: u64,
  pub phone_calls:        u64,
  pub direction_requests: u64,
  pub website_clicks:     u64,
  pub bookings:           u64,
}

impl Kpi {
  /// Combined map and search impressions ("visibility"). Saturates at
  /// `u64::MAX`.
  pub fn impressions(&self) -> u64 {
    self.impressions_maps.saturating_add(self.impressions_search)
  }
}
