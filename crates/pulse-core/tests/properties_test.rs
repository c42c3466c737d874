use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use pulse_core::{
  EngineConfig,
  alert::{self, AlertThresholds},
  entity::{Kpi, Location, Review},
  feedback,
  health::{self, HealthInputs},
  rollup,
  store::Snapshot,
  trend,
};

const CITIES: [&str; 3] = ["Pune", "Delhi", "Chennai"];
const CATEGORIES: [&str; 3] = ["Dental Clinic", "Eye Clinic", "Pharmacy"];

fn base_week() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() }

fn location(i: usize, city: usize, category: usize, rating: f64) -> Location {
  Location {
    location_id:      format!("L{i}"),
    store_code:       format!("ST{i:03}"),
    name:             format!("Store {i}"),
    address:          "1 Main Road".into(),
    city:             CITIES[city].into(),
    state:            "KA".into(),
    postal_code:      "560001".into(),
    latitude:         12.97,
    longitude:        77.59,
    primary_category: CATEGORIES[category].into(),
    phone:            String::new(),
    website:          String::new(),
    average_rating:   rating,
    total_reviews:    0,
    is_verified:      false,
  }
}

fn kpi(location: usize, week: u64, impressions: u64) -> Kpi {
  Kpi {
    kpi_id:             format!("K{location}-{week}"),
    location_id:        format!("L{location}"),
    week_start:         base_week() + Days::new(week * 7),
    impressions_maps:   impressions,
    impressions_search: impressions / 2,
    phone_calls:        impressions / 10,
    direction_requests: impressions / 20,
    website_clicks:     0,
    bookings:           impressions / 100,
  }
}

fn review(n: usize, location: usize, rating: u8, has_reply: bool, day: u64) -> Review {
  Review {
    review_id:     format!("R{n}"),
    location_id:   format!("L{location}"),
    rating,
    review_text:   String::new(),
    reviewer_name: "Guest".into(),
    review_date:   base_week() + Days::new(day),
    language:      "en".into(),
    has_reply,
    reply_text:    None,
  }
}

prop_compose! {
  fn arb_snapshot()(
    locs in prop::collection::vec((0..3usize, 0..3usize, 1.0..=5.0f64), 1..12),
    series in prop::collection::vec(prop::collection::vec(0..5_000u64, 0..8), 12),
    raw_reviews in prop::collection::vec((0..12usize, 1..=5u8, any::<bool>(), 0..90u64), 0..60),
  ) -> Snapshot {
    let locations: Vec<Location> = locs
      .iter()
      .enumerate()
      .map(|(i, &(city, cat, rating))| location(i, city, cat, rating))
      .collect();
    let kpis = series
      .iter()
      .take(locations.len())
      .enumerate()
      .flat_map(|(i, values)| {
        values.iter().enumerate().map(move |(w, &v)| kpi(i, w as u64, v))
      })
      .collect();
    let reviews = raw_reviews
      .into_iter()
      .enumerate()
      .map(|(n, (loc, rating, replied, day))| review(n, loc, rating, replied, day))
      .collect();
    Snapshot::new(locations, reviews, kpis)
  }
}

// ── Health score ────────────────────────────────────────────────────────────

proptest! {
  #[test]
  fn health_score_is_bounded(
    rating in 1.0..=5.0f64,
    rating_trend in -3.0..3.0f64,
    response_rate in 0.0..=1.0f64,
    kpi_trend in -500.0..500.0f64,
  ) {
    let s = health::score(HealthInputs { rating, rating_trend, response_rate, kpi_trend });
    prop_assert!(s <= 100);
  }

  #[test]
  fn health_score_increases_with_rating(
    rating in 1.0..=4.5f64,
    response_rate in 0.0..=1.0f64,
    kpi_trend in -100.0..100.0f64,
  ) {
    let lo = health::score(HealthInputs { rating, rating_trend: 0.0, response_rate, kpi_trend });
    let hi = health::score(HealthInputs {
      rating: rating + 0.5,
      rating_trend: 0.0,
      response_rate,
      kpi_trend,
    });
    prop_assert!(hi > lo, "{hi} <= {lo}");
  }
}

// ── Trends ──────────────────────────────────────────────────────────────────

proptest! {
  #[test]
  fn short_series_have_zero_trend(values in prop::collection::vec(0.0..1e6f64, 0..4)) {
    prop_assert_eq!(trend::period_change(&values, trend::DEFAULT_WINDOW), 0.0);
  }

  #[test]
  fn zero_baseline_has_zero_trend(recent in prop::collection::vec(0.0..1e6f64, 2)) {
    let values = [0.0, 0.0, recent[0], recent[1]];
    prop_assert_eq!(trend::period_change(&values, trend::DEFAULT_WINDOW), 0.0);
  }
}

// ── Feedback ────────────────────────────────────────────────────────────────

proptest! {
  #[test]
  fn categorize_is_never_empty(text in ".{0,80}") {
    prop_assert!(!feedback::categorize(&text).is_empty());
  }
}

// ── Alerts and rollups ──────────────────────────────────────────────────────

proptest! {
  #[test]
  fn alerts_are_sorted_worst_first(snapshot in arb_snapshot()) {
    let alerts = alert::detect_alerts(
      &snapshot,
      trend::DEFAULT_WINDOW,
      &AlertThresholds::default(),
    );
    for pair in alerts.windows(2) {
      prop_assert!(pair[0].severity <= pair[1].severity);
    }
  }

  #[test]
  fn city_rollup_partitions_the_fleet(snapshot in arb_snapshot()) {
    let cities = rollup::rollup_by_city(&snapshot.locations, &snapshot.kpis);

    let locations: usize = cities.iter().map(|c| c.locations).sum();
    prop_assert_eq!(locations, snapshot.locations.len());

    let impressions: u64 = cities.iter().map(|c| c.total_impressions).sum();
    let calls: u64 = cities.iter().map(|c| c.total_calls).sum();
    let bookings: u64 = cities.iter().map(|c| c.total_bookings).sum();
    prop_assert_eq!(impressions, snapshot.kpis.iter().map(Kpi::impressions).sum::<u64>());
    prop_assert_eq!(calls, snapshot.kpis.iter().map(|k| k.phone_calls).sum::<u64>());
    prop_assert_eq!(bookings, snapshot.kpis.iter().map(|k| k.bookings).sum::<u64>());

    for pair in cities.windows(2) {
      prop_assert!(pair[0].avg_rating >= pair[1].avg_rating);
    }
  }

  #[test]
  fn category_rollup_partitions_the_fleet(snapshot in arb_snapshot()) {
    let categories = rollup::rollup_by_category(&snapshot.locations, &snapshot.kpis);

    let locations: usize = categories.iter().map(|c| c.locations).sum();
    prop_assert_eq!(locations, snapshot.locations.len());

    let impressions: u64 = categories.iter().map(|c| c.total_impressions).sum();
    prop_assert_eq!(impressions, snapshot.kpis.iter().map(Kpi::impressions).sum::<u64>());

    for c in &categories {
      prop_assert!(c.locations > 0);
      prop_assert!((c.avg_impressions * c.locations as f64 - c.total_impressions as f64).abs() < 1e-6);
    }
    for pair in categories.windows(2) {
      prop_assert!(pair[0].avg_rating >= pair[1].avg_rating);
    }
  }

  #[test]
  fn dashboard_and_health_never_panic(snapshot in arb_snapshot()) {
    let engine = pulse_core::Engine::new(EngineConfig::default()).unwrap();
    let stats = engine.dashboard_stats(&snapshot);
    prop_assert_eq!(stats.total_locations, snapshot.locations.len());
    for h in engine.location_health(&snapshot) {
      prop_assert!(h.health_score <= 100);
      prop_assert!((0.0..=100.0).contains(&h.response_rate));
    }
  }
}
