//! [`Engine`]: the configured entry point for every derived output.
//!
//! The engine holds configuration only. Each method takes the snapshot to
//! derive from, so nothing observed in one call can leak into the next.

use tracing::debug;

use crate::{
  Result,
  alert::{self, Alert},
  config::EngineConfig,
  feedback::{self, SentimentKeywords, Theme},
  insight::{self, DashboardStats, LocationHealth, LocationInsights, ReviewAnalytics},
  rollup::{self, CategoryPerformance, CityPerformance},
  store::Snapshot,
  trend::{self, KpiMetric, LocationTrend, WeekOverWeek, WeeklyTrend},
};

#[derive(Debug, Clone, Default)]
pub struct Engine {
  config: EngineConfig,
}

impl Engine {
  /// Build an engine after validating `config`.
  pub fn new(config: EngineConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self { config })
  }

  pub fn config(&self) -> &EngineConfig { &self.config }

  // ── Fleet ───────────────────────────────────────────────────────────────

  pub fn dashboard_stats(&self, snapshot: &Snapshot) -> DashboardStats {
    insight::dashboard_stats(snapshot, &self.config)
  }

  /// All alerts, most severe first.
  pub fn alerts(&self, snapshot: &Snapshot) -> Vec<Alert> {
    alert::detect_alerts(snapshot, self.config.trend_window, &self.config.alerts)
  }

  pub fn location_health(&self, snapshot: &Snapshot) -> Vec<LocationHealth> {
    insight::location_health(snapshot, &self.config)
  }

  pub fn review_analytics(&self, snapshot: &Snapshot) -> ReviewAnalytics {
    insight::review_analytics(&snapshot.reviews)
  }

  // ── Trends ──────────────────────────────────────────────────────────────

  pub fn weekly_trends(&self, snapshot: &Snapshot) -> Vec<WeeklyTrend> {
    trend::weekly_trends(&snapshot.kpis)
  }

  pub fn week_over_week(&self, snapshot: &Snapshot) -> WeekOverWeek {
    trend::week_over_week(&self.weekly_trends(snapshot))
  }

  pub fn global_trend(&self, snapshot: &Snapshot, metric: KpiMetric) -> f64 {
    trend::global_change(snapshot, metric, self.config.trend_window)
  }

  pub fn city_trend(&self, snapshot: &Snapshot, city: &str, metric: KpiMetric) -> f64 {
    trend::city_change(snapshot, city, metric, self.config.trend_window)
  }

  pub fn category_trend(&self, snapshot: &Snapshot, category: &str, metric: KpiMetric) -> f64 {
    trend::category_change(snapshot, category, metric, self.config.trend_window)
  }

  /// Per-location trends, highest change first.
  pub fn location_trends(&self, snapshot: &Snapshot, metric: KpiMetric) -> Vec<LocationTrend> {
    trend::location_trends(
      snapshot,
      metric,
      self.config.trend_window,
      self.config.trend_flat_band,
    )
  }

  // ── Rollups ─────────────────────────────────────────────────────────────

  pub fn city_performance(&self, snapshot: &Snapshot) -> Vec<CityPerformance> {
    rollup::rollup_by_city(&snapshot.locations, &snapshot.kpis)
  }

  pub fn category_performance(&self, snapshot: &Snapshot) -> Vec<CategoryPerformance> {
    rollup::rollup_by_category(&snapshot.locations, &snapshot.kpis)
  }

  // ── Single location ─────────────────────────────────────────────────────

  pub fn location_insights(
    &self,
    snapshot: &Snapshot,
    location_id: &str,
  ) -> Option<LocationInsights> {
    let insights = insight::location_insights(snapshot, location_id, &self.config);
    if insights.is_none() {
      debug!(location_id, "no such location in snapshot");
    }
    insights
  }

  // ── Feedback ────────────────────────────────────────────────────────────

  pub fn categorize(&self, text: &str) -> Vec<Theme> {
    feedback::categorize(text).into_iter().collect()
  }

  pub fn sentiment_keywords(&self, text: &str) -> SentimentKeywords {
    feedback::extract_sentiment_keywords(text)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    alert::Severity,
    testing::{four_weeks, location, review},
  };

  fn snapshot() -> Snapshot {
    let mut kpis = four_weeks("L1", [100, 100, 50, 40]);
    kpis.extend(four_weeks("L2", [200, 200, 220, 240]));
    Snapshot::new(
      vec![location("L1", "Pune", "Dental", 2.8), location("L2", "Delhi", "Eye", 4.7)],
      vec![
        review("r1", "L1", 1, "2024-01-20", false),
        review("r2", "L1", 2, "2024-01-19", false),
        review("r3", "L2", 5, "2024-01-18", true),
      ],
      kpis,
    )
  }

  #[test]
  fn rejects_invalid_config() {
    let cfg = EngineConfig { trend_window: 0, ..EngineConfig::default() };
    assert!(Engine::new(cfg).is_err());
  }

  #[test]
  fn end_to_end_outputs_agree() {
    let engine = Engine::default();
    let snap = snapshot();

    let alerts = engine.alerts(&snap);
    assert_eq!(alerts.len(), 3);
    assert_eq!(alerts[0].severity, Severity::High);
    assert!(alerts.iter().all(|a| a.location_id == "L1"));

    let stats = engine.dashboard_stats(&snap);
    assert_eq!(stats.total_locations, 2);
    assert_eq!(stats.total_impressions, 290 + 860);

    let weekly = engine.weekly_trends(&snap);
    assert_eq!(weekly.len(), 4);
    assert_eq!(weekly[3].impressions, 280);

    let cities = engine.city_performance(&snap);
    assert_eq!(cities[0].city, "Delhi");

    let trends = engine.location_trends(&snap, KpiMetric::Impressions);
    assert_eq!(trends[0].location_id, "L2");

    let health = engine.location_health(&snap);
    assert!(health[0].needs_attention);
    assert!(!health[1].needs_attention);

    assert!(engine.location_insights(&snap, "L2").is_some());
    assert!(engine.location_insights(&snap, "L9").is_none());
  }

  #[test]
  fn longer_window_changes_sensitivity() {
    let engine = Engine::new(EngineConfig { trend_window: 3, ..EngineConfig::default() }).unwrap();
    // Only four points per location: a window of 3 needs six.
    let alerts = engine.alerts(&snapshot());
    assert!(alerts.iter().all(|a| a.alert_type != crate::alert::AlertType::Trend));
  }

  #[test]
  fn categorize_returns_theme_order() {
    let themes = Engine::default().categorize("Doctor was rude and the wait was too long");
    assert_eq!(themes, [Theme::WaitTime, Theme::StaffBehavior, Theme::MedicalCare]);
  }
}
