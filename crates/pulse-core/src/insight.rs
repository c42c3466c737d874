//! Composite read models: fleet dashboard, per-location health, review
//! analytics and the single-location insight bundle.
//!
//! Never stored, always derived from a [`Snapshot`].

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use serde::Serialize;

use crate::{
  config::EngineConfig,
  entity::{Kpi, Location, Review},
  feedback::{self, Theme},
  health::{self, HealthInputs},
  store::Snapshot,
  trend::{self, KpiMetric, TrendDirection, WeeklyTrend},
};

// ─── Shared helpers ──────────────────────────────────────────────────────────

/// Fraction of `reviews` with a reply, `0.0` when there are none.
pub fn response_rate(reviews: &[&Review]) -> f64 {
  if reviews.is_empty() {
    return 0.0;
  }
  let replied = reviews.iter().filter(|r| r.has_reply).count();
  replied as f64 / reviews.len() as f64
}

/// Sum of one counter over KPI records, saturating at `u64::MAX`.
fn total<'a, I>(kpis: I, field: impl Fn(&Kpi) -> u64) -> u64
where
  I: IntoIterator<Item = &'a Kpi>,
{
  kpis.into_iter().map(field).fold(0, u64::saturating_add)
}

/// The three signals behind a location's health score.
struct Vitals {
  score:         u8,
  response_rate: f64,
  kpi_trend:     f64,
}

fn vitals(
  location: &Location,
  reviews: &[&Review],
  kpis: &[&Kpi],
  config: &EngineConfig,
) -> Vitals {
  let response_rate = response_rate(reviews);
  let kpi_trend = trend::location_change(
    kpis.iter().copied(),
    KpiMetric::Impressions,
    config.trend_window,
  );
  let score = health::score(HealthInputs {
    rating: location.average_rating,
    rating_trend: 0.0,
    response_rate,
    kpi_trend,
  });
  Vitals { score, response_rate, kpi_trend }
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

/// Fleet totals and averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
  pub total_locations:             usize,
  pub average_rating:              f64,
  pub total_reviews:               usize,
  pub total_impressions:           u64,
  pub total_calls:                 u64,
  pub total_bookings:              u64,
  pub locations_needing_attention: usize,
  pub top_performers:              usize,
  /// Fleet-wide impressions trend, in percent.
  pub visibility_change:           f64,
}

pub fn dashboard_stats(snapshot: &Snapshot, config: &EngineConfig) -> DashboardStats {
  let locations = &snapshot.locations;
  let average_rating = if locations.is_empty() {
    0.0
  } else {
    locations.iter().map(|l| l.average_rating).sum::<f64>() / locations.len() as f64
  };

  DashboardStats {
    total_locations: locations.len(),
    average_rating,
    total_reviews: snapshot.reviews.len(),
    total_impressions: total(&snapshot.kpis, Kpi::impressions),
    total_calls: total(&snapshot.kpis, |k| k.phone_calls),
    total_bookings: total(&snapshot.kpis, |k| k.bookings),
    locations_needing_attention: locations
      .iter()
      .filter(|l| l.average_rating < config.attention_rating)
      .count(),
    top_performers: locations
      .iter()
      .filter(|l| l.average_rating >= config.top_performer_rating)
      .count(),
    visibility_change: trend::global_change(
      snapshot,
      KpiMetric::Impressions,
      config.trend_window,
    ),
  }
}

// ─── Per-location health ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationHealth {
  pub location_id:      String,
  pub store_code:       String,
  pub name:             String,
  pub city:             String,
  pub average_rating:   f64,
  pub health_score:     u8,
  /// Percentage of reviews with a reply.
  pub response_rate:    f64,
  /// Impressions trend, in percent.
  pub kpi_trend:        f64,
  pub direction:        TrendDirection,
  pub needs_attention:  bool,
  pub is_top_performer: bool,
  pub is_verified:      bool,
}

/// Health for every location, in snapshot order.
pub fn location_health(snapshot: &Snapshot, config: &EngineConfig) -> Vec<LocationHealth> {
  let index = snapshot.index();
  snapshot
    .locations
    .par_iter()
    .map(|l| {
      let v = vitals(l, index.reviews(&l.location_id), index.kpis(&l.location_id), config);
      LocationHealth {
        location_id:      l.location_id.clone(),
        store_code:       l.store_code.clone(),
        name:             l.name.clone(),
        city:             l.city.clone(),
        average_rating:   l.average_rating,
        health_score:     v.score,
        response_rate:    v.response_rate * 100.0,
        kpi_trend:        v.kpi_trend,
        direction:        TrendDirection::from_change(v.kpi_trend, config.trend_flat_band),
        needs_attention:  l.average_rating < config.attention_rating
          || v.score < config.attention_health,
        is_top_performer: l.average_rating >= config.top_performer_rating,
        is_verified:      l.is_verified,
      }
    })
    .collect()
}

// ─── Review analytics ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingCount {
  pub rating: u8,
  pub count:  usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageShare {
  pub language:   String,
  pub count:      usize,
  pub percentage: f64,
}

/// Review sentiment split for one feedback theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeBreakdown {
  pub theme:    Theme,
  pub positive: usize,
  pub negative: usize,
  pub neutral:  usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewAnalytics {
  pub total:               usize,
  /// Counts for ratings 1 through 5, in that order.
  pub rating_distribution: Vec<RatingCount>,
  /// Percentage of reviews with a reply.
  pub response_rate:       f64,
  /// Sorted by language tag.
  pub languages:           Vec<LanguageShare>,
  /// In theme order; only themes that occur.
  pub themes:              Vec<ThemeBreakdown>,
}

pub fn review_analytics(reviews: &[Review]) -> ReviewAnalytics {
  let total = reviews.len();
  let pct = |n: usize| if total == 0 { 0.0 } else { n as f64 / total as f64 * 100.0 };

  let mut distribution = [0usize; 5];
  let mut replied = 0;
  let mut languages: BTreeMap<&str, usize> = BTreeMap::new();
  let mut themes: BTreeMap<Theme, ThemeBreakdown> = BTreeMap::new();

  for review in reviews {
    // Ratings outside 1..=5 are not validated here; they just don't count.
    if let Some(slot) = (review.rating as usize)
      .checked_sub(1)
      .and_then(|i| distribution.get_mut(i))
    {
      *slot += 1;
    }
    if review.has_reply {
      replied += 1;
    }
    *languages.entry(review.language.as_str()).or_default() += 1;

    for theme in feedback::categorize(&review.review_text) {
      let entry = themes.entry(theme).or_insert(ThemeBreakdown {
        theme,
        positive: 0,
        negative: 0,
        neutral: 0,
      });
      if review.is_positive() {
        entry.positive += 1;
      } else if review.is_negative() {
        entry.negative += 1;
      } else {
        entry.neutral += 1;
      }
    }
  }

  ReviewAnalytics {
    total,
    rating_distribution: distribution
      .iter()
      .zip(1u8..)
      .map(|(&count, rating)| RatingCount { rating, count })
      .collect(),
    response_rate: pct(replied),
    languages: languages
      .into_iter()
      .map(|(language, count)| LanguageShare {
        language: language.to_owned(),
        count,
        percentage: pct(count),
      })
      .collect(),
    themes: themes.into_values().collect(),
  }
}

// ─── Location insights ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopIssue {
  pub theme: Theme,
  pub count: usize,
}

/// Rank feedback themes across negative reviews: most frequent first, ties
/// broken alphabetically by label.
pub fn top_issues(reviews: &[&Review], limit: usize) -> Vec<TopIssue> {
  let mut counts: HashMap<Theme, usize> = HashMap::new();
  for review in reviews.iter().filter(|r| r.is_negative()) {
    for theme in feedback::categorize(&review.review_text) {
      *counts.entry(theme).or_default() += 1;
    }
  }
  let mut issues: Vec<TopIssue> =
    counts.into_iter().map(|(theme, count)| TopIssue { theme, count }).collect();
  issues.sort_by(|a, b| {
    b.count
      .cmp(&a.count)
      .then_with(|| a.theme.label().cmp(b.theme.label()))
  });
  issues.truncate(limit);
  issues
}

/// Everything the single-location view needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationInsights {
  pub location:            Location,
  pub health_score:        u8,
  /// Impressions trend, in percent.
  pub kpi_trend:           f64,
  /// Percentage of reviews with a reply.
  pub response_rate:       f64,
  /// Newest first.
  pub recent_reviews:      Vec<Review>,
  pub unanswered_negative: usize,
  pub top_issues:          Vec<TopIssue>,
  pub weekly_kpis:         Vec<WeeklyTrend>,
  pub total_impressions:   u64,
  pub total_calls:         u64,
  pub total_bookings:      u64,
}

/// Insight bundle for `location_id`, or `None` if the snapshot has no such
/// location.
pub fn location_insights(
  snapshot: &Snapshot,
  location_id: &str,
  config: &EngineConfig,
) -> Option<LocationInsights> {
  let location = snapshot.location(location_id)?;
  let index = snapshot.index();
  let reviews = index.reviews(location_id);
  let kpis = index.kpis(location_id);
  let v = vitals(location, reviews, kpis, config);

  Some(LocationInsights {
    location:            location.clone(),
    health_score:        v.score,
    kpi_trend:           v.kpi_trend,
    response_rate:       v.response_rate * 100.0,
    recent_reviews:      reviews
      .iter()
      .take(config.recent_reviews)
      .map(|&r| r.clone())
      .collect(),
    unanswered_negative: reviews
      .iter()
      .filter(|r| r.is_negative() && !r.has_reply)
      .count(),
    top_issues:          top_issues(reviews, config.top_issues),
    weekly_kpis:         trend::weekly_trends(kpis.iter().copied()),
    total_impressions:   total(kpis.iter().copied(), Kpi::impressions),
    total_calls:         total(kpis.iter().copied(), |k| k.phone_calls),
    total_bookings:      total(kpis.iter().copied(), |k| k.bookings),
  })
}
