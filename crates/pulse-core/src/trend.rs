//! Period-over-period trend analysis over weekly KPI series.
//!
//! A trend compares the mean of the most recent `window` weekly points with
//! the mean of the `window` points immediately before them. The two windows
//! are fixed-size, adjacent and non-overlapping. With the default window of
//! 2 this is `series[-4..-2]` against `series[-2..]`.
//!
//! Fleet-wide and group trends sum the weekly totals first and apply the
//! window once to the summed series; they are never averages of per-location
//! trends.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  entity::{Kpi, Location},
  store::Snapshot,
};

/// Points per window unless configured otherwise.
pub const DEFAULT_WINDOW: usize = 2;

// ─── Metric selection ────────────────────────────────────────────────────────

/// Which KPI counter a trend is computed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiMetric {
  #[default]
  Impressions,
  Calls,
  Bookings,
  Directions,
  WebsiteClicks,
}

impl KpiMetric {
  pub fn of(self, kpi: &Kpi) -> u64 {
    match self {
      Self::Impressions => kpi.impressions(),
      Self::Calls => kpi.phone_calls,
      Self::Bookings => kpi.bookings,
      Self::Directions => kpi.direction_requests,
      Self::WebsiteClicks => kpi.website_clicks,
    }
  }
}

// ─── Core computation ────────────────────────────────────────────────────────

/// Percentage change between the last `window` values and the `window` values
/// before them.
///
/// Returns exactly `0.0` when there are fewer than `2 * window` points, when
/// `window` is zero, or when the older window averages to zero (no baseline).
pub fn period_change(values: &[f64], window: usize) -> f64 {
  let n = values.len();
  if window == 0 || n < window * 2 {
    return 0.0;
  }
  let recent = mean(&values[n - window..]);
  let older = mean(&values[n - 2 * window..n - window]);
  if older > 0.0 { (recent - older) / older * 100.0 } else { 0.0 }
}

fn mean(values: &[f64]) -> f64 {
  values.iter().sum::<f64>() / values.len() as f64
}

/// Chronological values of `metric` for a set of KPI records. Sorted here
/// (stably, by `week_start`) rather than trusting the caller's order.
pub fn metric_series<'a, I>(kpis: I, metric: KpiMetric) -> Vec<f64>
where
  I: IntoIterator<Item = &'a Kpi>,
{
  let mut points: Vec<(NaiveDate, u64)> =
    kpis.into_iter().map(|k| (k.week_start, metric.of(k))).collect();
  points.sort_by_key(|(week, _)| *week);
  points.into_iter().map(|(_, v)| v as f64).collect()
}

/// Trend for one location's KPI records.
pub fn location_change<'a, I>(kpis: I, metric: KpiMetric, window: usize) -> f64
where
  I: IntoIterator<Item = &'a Kpi>,
{
  period_change(&metric_series(kpis, metric), window)
}

// ─── Weekly totals ───────────────────────────────────────────────────────────

/// KPI counters summed across every record sharing a `week_start`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTrend {
  pub week:           NaiveDate,
  pub impressions:    u64,
  pub calls:          u64,
  pub bookings:       u64,
  pub directions:     u64,
  pub website_clicks: u64,
}

impl WeeklyTrend {
  pub fn get(&self, metric: KpiMetric) -> u64 {
    match metric {
      KpiMetric::Impressions => self.impressions,
      KpiMetric::Calls => self.calls,
      KpiMetric::Bookings => self.bookings,
      KpiMetric::Directions => self.directions,
      KpiMetric::WebsiteClicks => self.website_clicks,
    }
  }
}

/// Sum KPI records per week, oldest week first.
pub fn weekly_trends<'a, I>(kpis: I) -> Vec<WeeklyTrend>
where
  I: IntoIterator<Item = &'a Kpi>,
{
  let mut weeks: BTreeMap<NaiveDate, WeeklyTrend> = BTreeMap::new();
  for kpi in kpis {
    let week = weeks.entry(kpi.week_start).or_insert_with(|| WeeklyTrend {
      week: kpi.week_start,
      ..WeeklyTrend::default()
    });
    week.impressions = week.impressions.saturating_add(kpi.impressions());
    week.calls = week.calls.saturating_add(kpi.phone_calls);
    week.bookings = week.bookings.saturating_add(kpi.bookings);
    week.directions = week.directions.saturating_add(kpi.direction_requests);
    week.website_clicks = week.website_clicks.saturating_add(kpi.website_clicks);
  }
  weeks.into_values().collect()
}

/// Trend over an already-summed weekly series.
pub fn aggregate_change(weekly: &[WeeklyTrend], metric: KpiMetric, window: usize) -> f64 {
  let values: Vec<f64> = weekly.iter().map(|w| w.get(metric) as f64).collect();
  period_change(&values, window)
}

/// Fleet-wide trend: one window over the global weekly totals.
pub fn global_change(snapshot: &Snapshot, metric: KpiMetric, window: usize) -> f64 {
  aggregate_change(&weekly_trends(&snapshot.kpis), metric, window)
}

/// Trend over the summed weekly totals of every location matching `member`.
/// KPI records whose location is not in the snapshot are ignored.
pub fn group_change<F>(
  snapshot: &Snapshot,
  member: F,
  metric: KpiMetric,
  window: usize,
) -> f64
where
  F: Fn(&Location) -> bool,
{
  let ids: HashSet<&str> = snapshot
    .locations
    .iter()
    .filter(|l| member(*l))
    .map(|l| l.location_id.as_str())
    .collect();
  let kpis = snapshot.kpis.iter().filter(|k| ids.contains(k.location_id.as_str()));
  aggregate_change(&weekly_trends(kpis), metric, window)
}

pub fn city_change(snapshot: &Snapshot, city: &str, metric: KpiMetric, window: usize) -> f64 {
  group_change(snapshot, |l| l.city == city, metric, window)
}

pub fn category_change(
  snapshot: &Snapshot,
  category: &str,
  metric: KpiMetric,
  window: usize,
) -> f64 {
  group_change(snapshot, |l| l.primary_category == category, metric, window)
}

// ─── Week over week ──────────────────────────────────────────────────────────

/// Latest week against the week before it, per counter, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeekOverWeek {
  pub impressions:    f64,
  pub calls:          f64,
  pub bookings:       f64,
  pub directions:     f64,
  pub website_clicks: f64,
}

/// Compare the last two weekly totals. All zeros with fewer than two weeks;
/// a counter whose previous week is zero reports zero change.
pub fn week_over_week(weekly: &[WeeklyTrend]) -> WeekOverWeek {
  let [.., previous, latest] = weekly else {
    return WeekOverWeek::default();
  };
  let change = |metric: KpiMetric| {
    let prev = previous.get(metric) as f64;
    let cur = latest.get(metric) as f64;
    if prev > 0.0 { (cur - prev) / prev * 100.0 } else { 0.0 }
  };
  WeekOverWeek {
    impressions:    change(KpiMetric::Impressions),
    calls:          change(KpiMetric::Calls),
    bookings:       change(KpiMetric::Bookings),
    directions:     change(KpiMetric::Directions),
    website_clicks: change(KpiMetric::WebsiteClicks),
  }
}

// ─── Direction ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
  Up,
  Down,
  Stable,
}

impl TrendDirection {
  /// Classify a percentage change; anything within `±band` is stable.
  pub fn from_change(change: f64, band: f64) -> Self {
    if change > band {
      Self::Up
    } else if change < -band {
      Self::Down
    } else {
      Self::Stable
    }
  }
}

// ─── Per-location ranking ────────────────────────────────────────────────────

/// A location's trend for ranking "top growing" and "top declining".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationTrend {
  pub location_id: String,
  pub store_code:  String,
  pub name:        String,
  pub city:        String,
  pub change:      f64,
  pub direction:   TrendDirection,
}

/// Every location's trend, highest change first (stable for ties).
pub fn location_trends(
  snapshot: &Snapshot,
  metric: KpiMetric,
  window: usize,
  band: f64,
) -> Vec<LocationTrend> {
  let index = snapshot.index();
  let mut trends: Vec<LocationTrend> = snapshot
    .locations
    .iter()
    .map(|l| {
      let change = location_change(index.kpis(&l.location_id).iter().copied(), metric, window);
      LocationTrend {
        location_id: l.location_id.clone(),
        store_code:  l.store_code.clone(),
        name:        l.name.clone(),
        city:        l.city.clone(),
        change,
        direction:   TrendDirection::from_change(change, band),
      }
    })
    .collect();
  trends.sort_by(|a, b| b.change.total_cmp(&a.change));
  trends
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{four_weeks, kpi, location};

  #[test]
  fn fewer_than_four_points_is_zero() {
    assert_eq!(period_change(&[], 2), 0.0);
    assert_eq!(period_change(&[100.0, 50.0, 10.0], 2), 0.0);
  }

  #[test]
  fn zero_baseline_is_zero() {
    assert_eq!(period_change(&[0.0, 0.0, 40.0, 90.0], 2), 0.0);
  }

  #[test]
  fn two_by_two_window() {
    // older = (100+100)/2, recent = (50+40)/2 -> -55%
    let change = period_change(&[100.0, 100.0, 50.0, 40.0], 2);
    assert!((change - -55.0).abs() < 1e-9);
  }

  #[test]
  fn only_last_four_points_count() {
    let change = period_change(&[9_999.0, 10.0, 10.0, 20.0, 20.0], 2);
    assert!((change - 100.0).abs() < 1e-9);
  }

  #[test]
  fn window_is_configurable() {
    let values = [10.0, 10.0, 10.0, 30.0, 30.0, 30.0];
    assert!((period_change(&values, 3) - 200.0).abs() < 1e-9);
    assert_eq!(period_change(&values, 0), 0.0);
    assert_eq!(period_change(&values[..5], 3), 0.0);
  }

  #[test]
  fn series_resorted_by_week() {
    let mut kpis = four_weeks("L1", [100, 100, 50, 40]);
    kpis.reverse();
    let change = location_change(&kpis, KpiMetric::Impressions, 2);
    assert!((change - -55.0).abs() < 1e-9);
  }

  #[test]
  fn weekly_totals_sum_across_locations() {
    let kpis = vec![
      kpi("L1", "2024-01-08", 100),
      kpi("L2", "2024-01-01", 300),
      kpi("L1", "2024-01-01", 200),
    ];
    let weekly = weekly_trends(&kpis);
    assert_eq!(weekly.len(), 2);
    assert_eq!(weekly[0].impressions, 500);
    assert_eq!(weekly[0].calls, 50);
    assert_eq!(weekly[1].impressions, 100);
  }

  #[test]
  fn global_trend_uses_summed_series() {
    // L1 halves; L2 is flat but ten times larger. The global trend follows
    // the summed totals, not the mean of per-location trends.
    let mut kpis = four_weeks("L1", [100, 100, 50, 50]);
    kpis.extend(four_weeks("L2", [1000, 1000, 1000, 1000]));
    let snapshot = Snapshot::new(
      vec![location("L1", "Pune", "Clinic", 4.0), location("L2", "Pune", "Clinic", 4.0)],
      vec![],
      kpis,
    );
    let change = global_change(&snapshot, KpiMetric::Impressions, 2);
    let expected = (1050.0 - 1100.0) / 1100.0 * 100.0;
    assert!((change - expected).abs() < 1e-9);
  }

  #[test]
  fn group_trend_ignores_other_groups_and_orphans() {
    let mut kpis = four_weeks("L1", [100, 100, 200, 200]);
    kpis.extend(four_weeks("L2", [100, 100, 10, 10]));
    kpis.extend(four_weeks("ghost", [1, 1, 1_000, 1_000]));
    let snapshot = Snapshot::new(
      vec![location("L1", "Pune", "Dental", 4.0), location("L2", "Delhi", "Eye", 4.0)],
      vec![],
      kpis,
    );
    assert!((city_change(&snapshot, "Pune", KpiMetric::Impressions, 2) - 100.0).abs() < 1e-9);
    assert!((category_change(&snapshot, "Eye", KpiMetric::Impressions, 2) - -90.0).abs() < 1e-9);
    assert_eq!(city_change(&snapshot, "Nowhere", KpiMetric::Impressions, 2), 0.0);
  }

  #[test]
  fn weekly_totals_saturate() {
    let mut kpis = vec![kpi("L1", "2024-01-01", u64::MAX), kpi("L2", "2024-01-01", u64::MAX)];
    kpis[0].impressions_search = u64::MAX;
    let weekly = weekly_trends(&kpis);
    assert_eq!(weekly[0].impressions, u64::MAX);
    assert_eq!(weekly[0].calls, u64::MAX / 10 * 2);
  }

  #[test]
  fn week_over_week_needs_two_weeks() {
    assert_eq!(week_over_week(&[]), WeekOverWeek::default());
    let weekly = weekly_trends(&[kpi("L1", "2024-01-01", 100)]);
    assert_eq!(week_over_week(&weekly), WeekOverWeek::default());
  }

  #[test]
  fn week_over_week_compares_last_two() {
    let kpis = four_weeks("L1", [10, 10, 100, 150]);
    let wow = week_over_week(&weekly_trends(&kpis));
    assert!((wow.impressions - 50.0).abs() < 1e-9);
    assert!((wow.calls - 50.0).abs() < 1e-9);
    // bookings go 1 -> 1
    assert_eq!(wow.bookings, 0.0);
    // website clicks go 2 -> 3
    assert!((wow.website_clicks - 50.0).abs() < 1e-9);
  }

  #[test]
  fn direction_band() {
    assert_eq!(TrendDirection::from_change(5.1, 5.0), TrendDirection::Up);
    assert_eq!(TrendDirection::from_change(5.0, 5.0), TrendDirection::Stable);
    assert_eq!(TrendDirection::from_change(-5.0, 5.0), TrendDirection::Stable);
    assert_eq!(TrendDirection::from_change(-7.0, 5.0), TrendDirection::Down);
  }

  #[test]
  fn location_trends_sorted_descending() {
    let mut kpis = four_weeks("L1", [100, 100, 50, 50]);
    kpis.extend(four_weeks("L2", [100, 100, 150, 150]));
    let snapshot = Snapshot::new(
      vec![
        location("L1", "Pune", "Clinic", 4.0),
        location("L2", "Pune", "Clinic", 4.0),
        location("L3", "Pune", "Clinic", 4.0),
      ],
      vec![],
      kpis,
    );
    let trends = location_trends(&snapshot, KpiMetric::Impressions, 2, 5.0);
    let order: Vec<&str> = trends.iter().map(|t| t.location_id.as_str()).collect();
    assert_eq!(order, ["L2", "L3", "L1"]);
    assert_eq!(trends[0].direction, TrendDirection::Up);
    assert_eq!(trends[1].direction, TrendDirection::Stable);
    assert_eq!(trends[2].direction, TrendDirection::Down);
  }
}
